//! models/json_value.rs
//! Reglas de conversión para valores JSON que llegan del cliente o del
//! archivo de opciones. El cliente manda números como número o como texto
//! indistintamente, así que aquí se replican las reglas de "truthy" y de
//! parseFloat que el protocolo espera.

use serde_json::Value;

/// `null`, `false`, `0`, `NaN` y `""` son falsos; todo lo demás es verdadero.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Como `Option<&Value>`, pero descartando los valores falsos.
pub fn truthy(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| is_truthy(v))
}

/// Conversión numérica "suelta" usada para comparar contra cero.
/// Ausente o `null` devuelve `None`; texto vacío vale 0; texto no numérico es NaN.
pub fn loose_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                Some(trimmed.parse::<f64>().unwrap_or(f64::NAN))
            }
        }
        Value::Array(_) | Value::Object(_) => Some(f64::NAN),
    }
}

/// `true` salvo que el valor sea ausente o numéricamente cero.
pub fn is_non_zero(value: Option<&Value>) -> bool {
    match loose_number(value) {
        Some(n) => n != 0.0,
        None => false,
    }
}

/// parseFloat: toma el prefijo numérico más largo de un texto
/// ("4.5in" -> 4.5). Lo que no empiece por número da NaN.
pub fn parse_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float_prefix(s),
        _ => f64::NAN,
    }
}

fn parse_float_prefix(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }

    // Exponente solo si trae al menos un dígito ("1e" se queda en "1")
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}
