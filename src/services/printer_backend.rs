//! services/printer_backend.rs
//! Envío del PDF al spooler del sistema. Una implementación por familia de
//! plataforma; se elige una sola vez al arrancar.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;

use crate::config::bridge_config::BridgeConfig;
use crate::models::print_model::{PrinterDescriptor, ResolvedPrintJob};

#[async_trait]
pub trait PrintBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn list_printers(&self) -> Result<Vec<PrinterDescriptor>>;

    /// Envía el archivo a la impresora `job.printer_name`.
    async fn print_file(&self, artifact: &Path, job: &ResolvedPrintJob) -> Result<()>;
}

pub fn platform_backend(config: &BridgeConfig) -> Arc<dyn PrintBackend> {
    if cfg!(windows) {
        Arc::new(WindowsPrintBackend::new(config.sumatra_path.clone()))
    } else {
        Arc::new(CupsPrintBackend)
    }
}

// --------------------------------------------------------------------------------
// macOS / Linux: CUPS (lp, lpstat)
// --------------------------------------------------------------------------------
pub struct CupsPrintBackend;

#[async_trait]
impl PrintBackend for CupsPrintBackend {
    fn name(&self) -> &'static str {
        "cups"
    }

    async fn list_printers(&self) -> Result<Vec<PrinterDescriptor>> {
        let printers = lpstat(&["-p"]).await?;
        let default = lpstat(&["-d"]).await?;

        let default_name = default.as_deref().and_then(parse_lpstat_default);
        Ok(printers
            .map(|out| parse_lpstat_printers(&out, default_name.as_deref()))
            .unwrap_or_default())
    }

    /// Sin orientación ni opciones avanzadas. El resultado de `lp` solo se
    /// registra en el log: se asume éxito.
    async fn print_file(&self, artifact: &Path, job: &ResolvedPrintJob) -> Result<()> {
        let output = Command::new("lp")
            .arg("-d")
            .arg(&job.printer_name)
            .arg(artifact)
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => log::info!(
                "lp aceptó el trabajo para '{}': {}",
                job.printer_name,
                String::from_utf8_lossy(&out.stdout).trim()
            ),
            Ok(out) => log::warn!(
                "lp terminó con {} para '{}': {}",
                out.status,
                job.printer_name,
                String::from_utf8_lossy(&out.stderr).trim()
            ),
            Err(e) => log::warn!("No se pudo lanzar lp: {}", e),
        }
        Ok(())
    }
}

/// `None` si lpstat sale con error (p.ej. "No destinations added").
async fn lpstat(args: &[&str]) -> Result<Option<String>> {
    let out = Command::new("lpstat")
        .args(args)
        .env("LC_ALL", "C")
        .output()
        .await
        .context("No se pudo lanzar lpstat")?;

    if !out.status.success() {
        log::warn!(
            "lpstat {:?} terminó con {}: {}",
            args,
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        );
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&out.stdout).into_owned()))
}

/// Interpreta la salida de `lpstat -p`:
/// `printer Zebra is idle.  enabled since ...`
pub fn parse_lpstat_printers(output: &str, default_name: Option<&str>) -> Vec<PrinterDescriptor> {
    output
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            if tokens.next()? != "printer" {
                return None;
            }
            let name = tokens.next()?.to_string();
            let status = if line.contains("disabled") {
                Some("STOPPED")
            } else if line.contains("now printing") {
                Some("PRINTING")
            } else if line.contains("is idle") {
                Some("IDLE")
            } else {
                None
            };
            Some(PrinterDescriptor {
                is_default: default_name == Some(name.as_str()),
                name,
                status: status.map(str::to_string),
            })
        })
        .collect()
}

/// `system default destination: Zebra` -> `Zebra`
pub fn parse_lpstat_default(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        line.strip_prefix("system default destination:")
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    })
}

// --------------------------------------------------------------------------------
// Windows: SumatraPDF en modo silencioso
// --------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowsOrientation {
    Portrait,
    Landscape,
}

/// Opciones pasadas a la utilidad de impresión de Windows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowsPrintOptions {
    pub printer: String,
    pub fit_to_page: bool,
    pub silent: bool,
    /// Sin "noscale" intenta escalar para ajustar, mal para etiquetas
    pub scale: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<WindowsOrientation>,
}

impl WindowsPrintOptions {
    /// Solo "Portrait" o "Landscape" exactos añaden orientación;
    /// "Automatic" o cualquier otro valor la omiten.
    pub fn from_job(job: &ResolvedPrintJob) -> Self {
        let orientation = match job.orientation.as_deref() {
            Some("Portrait") => Some(WindowsOrientation::Portrait),
            Some("Landscape") => Some(WindowsOrientation::Landscape),
            _ => None,
        };

        WindowsPrintOptions {
            printer: job.printer_name.clone(),
            fit_to_page: true,
            silent: true,
            scale: "noscale",
            orientation,
        }
    }

    /// Argumentos de línea de comandos de SumatraPDF (sin el archivo).
    pub fn to_args(&self) -> Vec<String> {
        let mut settings: Vec<&str> = Vec::new();
        if self.fit_to_page {
            settings.push("fit");
        }
        settings.push(self.scale);
        match self.orientation {
            Some(WindowsOrientation::Portrait) => settings.push("portrait"),
            Some(WindowsOrientation::Landscape) => settings.push("landscape"),
            None => {}
        }

        let mut args = vec!["-print-to".to_string(), self.printer.clone()];
        if self.silent {
            args.push("-silent".to_string());
        }
        args.push("-print-settings".to_string());
        args.push(settings.join(","));
        args
    }
}

pub struct WindowsPrintBackend {
    sumatra_path: Option<PathBuf>,
}

impl WindowsPrintBackend {
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        let sumatra_path = explicit_path.or_else(|| which::which("SumatraPDF").ok());
        if sumatra_path.is_none() {
            log::warn!("No se encontró SumatraPDF; la impresión fallará hasta configurarlo");
        }
        Self { sumatra_path }
    }
}

#[async_trait]
impl PrintBackend for WindowsPrintBackend {
    fn name(&self) -> &'static str {
        "windows"
    }

    async fn list_printers(&self) -> Result<Vec<PrinterDescriptor>> {
        let out = Command::new("powershell")
            .args([
                "-NoProfile",
                "-NonInteractive",
                "-Command",
                "Get-CimInstance -ClassName Win32_Printer | \
                 Select-Object Name,Default,PrinterStatus | ConvertTo-Json -Compress",
            ])
            .output()
            .await
            .context("No se pudo lanzar powershell")?;

        if !out.status.success() {
            return Err(anyhow!(
                "Get-CimInstance falló: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            ));
        }
        parse_windows_printers(&String::from_utf8_lossy(&out.stdout))
    }

    async fn print_file(&self, artifact: &Path, job: &ResolvedPrintJob) -> Result<()> {
        let binary = match self.sumatra_path.as_ref() {
            Some(path) => path,
            None => {
                log::error!("SumatraPDF no está disponible");
                return Err(anyhow!("SumatraPDF executable not found"));
            }
        };

        let options = WindowsPrintOptions::from_job(job);
        log::debug!(
            "Opciones de impresión: {}",
            serde_json::to_string(&options).unwrap_or_default()
        );

        let out = Command::new(binary)
            .args(options.to_args())
            .arg(artifact)
            .output()
            .await
            .map_err(|e| {
                log::error!("No se pudo lanzar SumatraPDF: {}", e);
                anyhow::Error::new(e)
            })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            return Err(if stderr.is_empty() {
                anyhow!("SumatraPDF exited with {}", out.status)
            } else {
                anyhow!(stderr)
            });
        }
        Ok(())
    }
}

/// `ConvertTo-Json` devuelve un objeto si hay una sola impresora y un
/// array si hay varias.
pub fn parse_windows_printers(output: &str) -> Result<Vec<PrinterDescriptor>> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let parsed: Value =
        serde_json::from_str(trimmed).context("Salida de Win32_Printer no es JSON")?;
    let entries = match parsed {
        Value::Array(items) => items,
        other => vec![other],
    };

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("Name")?.as_str()?.to_string();
            let status = entry
                .get("PrinterStatus")
                .and_then(Value::as_u64)
                .and_then(windows_status_label);
            Some(PrinterDescriptor {
                name,
                is_default: entry.get("Default").and_then(Value::as_bool).unwrap_or(false),
                status: status.map(str::to_string),
            })
        })
        .collect())
}

fn windows_status_label(code: u64) -> Option<&'static str> {
    match code {
        3 => Some("IDLE"),
        4 => Some("PRINTING"),
        5 => Some("WARMUP"),
        6 => Some("STOPPED"),
        7 => Some("OFFLINE"),
        _ => None,
    }
}
