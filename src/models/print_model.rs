//! models/print_model.rs
//! Estructuras de datos del pipeline de impresión.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const PRINT_SUCCESSFUL: &str = "Print Successful";
pub const CHECK_CONFIGURATION: &str = "Please check all the page configuration";

/// Payload de `printer-command`. Los campos numéricos pueden venir como
/// número o como texto, por eso se guardan como `Value`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest {
    /// HTML que vamos a renderizar. Cualquier valor que no sea texto se
    /// convierte a texto (`null` -> "null").
    #[serde(default, deserialize_with = "lenient_text")]
    pub content: String,

    /// Clave lógica de la impresora (no el nombre del sistema operativo).
    /// Una clave numérica (`1`) se busca como `"1"`.
    #[serde(default, alias = "printerKey", deserialize_with = "lenient_key")]
    pub printer: Option<String>,

    pub page_height: Option<Value>,
    pub page_width: Option<Value>,
    pub margin_top: Option<Value>,
    pub margin_right: Option<Value>,
    pub margin_left: Option<Value>,
    pub margin_bottom: Option<Value>,
    pub orientation: Option<Value>,
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

fn lenient_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        other => Some(value_to_text(other)),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PagePreset {
    A4,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PageSize {
    Preset(PagePreset),
    Custom { width: f64, height: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Margins {
    /// Márgenes por defecto del renderizador.
    #[serde(rename_all = "camelCase")]
    Default { margin_type: u8 },
    Custom {
        top: f64,
        right: f64,
        bottom: f64,
        left: f64,
    },
}

impl Margins {
    pub const DEFAULT: Margins = Margins::Default { margin_type: 0 };
}

/// Parámetros finales de un trabajo: request + opciones persistidas.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPrintJob {
    /// Nombre de la impresora en el sistema operativo.
    pub printer_name: String,
    pub page_size: PageSize,
    pub margins: Margins,
    pub print_background: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
}

/// Impresora enumerada por el sistema. El núcleo no la interpreta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterDescriptor {
    pub name: String,
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Resultado de un trabajo, solo para el aviso al usuario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub succeeded: bool,
    pub message: String,
}

impl JobOutcome {
    pub fn success() -> Self {
        JobOutcome {
            succeeded: true,
            message: PRINT_SUCCESSFUL.to_string(),
        }
    }

    pub fn check_configuration() -> Self {
        JobOutcome {
            succeeded: false,
            message: CHECK_CONFIGURATION.to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        JobOutcome {
            succeeded: false,
            message: message.into(),
        }
    }
}
