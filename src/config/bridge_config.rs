//! config/bridge_config.rs
//! Configuración del proceso (puerto, rutas, binarios externos).
//! Se carga una sola vez al arrancar, desde el entorno (y .env vía dotenv).

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9696;
pub const DEFAULT_APP_NAME: &str = "Olorin Companion";
pub const ARTIFACT_FILE_NAME: &str = "printer.pdf";
/// 16 MiB: suficiente para HTML grande en un solo mensaje.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Variable que fuerza la ruta exacta del archivo de opciones.
pub const OPTIONS_OVERRIDE_VAR: &str = "OLORIN_OPTIONS_PATH";

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub host: String,
    pub port: u16,
    /// Si existe, es el único candidato para el archivo de opciones.
    pub options_override: Option<PathBuf>,
    /// Nombre del directorio de datos de usuario (userData).
    pub app_name: String,
    /// Ruta fija del PDF generado; se sobrescribe en cada trabajo.
    pub artifact_path: PathBuf,
    pub wkhtmltopdf_path: Option<PathBuf>,
    pub sumatra_path: Option<PathBuf>,
    pub max_frame_bytes: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            options_override: None,
            app_name: DEFAULT_APP_NAME.to_string(),
            artifact_path: default_artifact_path(),
            wkhtmltopdf_path: None,
            sumatra_path: None,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl BridgeConfig {
    /// Lee la configuración desde variables de entorno.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Igual que `from_env`, pero con una función de búsqueda inyectable (tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = BridgeConfig::default();

        let port = match get("BRIDGE_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("BRIDGE_PORT inválido: {:?}", raw))?,
            None => defaults.port,
        };

        let max_frame_bytes = match get("BRIDGE_MAX_FRAME_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("BRIDGE_MAX_FRAME_BYTES inválido: {:?}", raw))?,
            None => defaults.max_frame_bytes,
        };

        Ok(BridgeConfig {
            host: get("BRIDGE_HOST").unwrap_or(defaults.host),
            port,
            options_override: get(OPTIONS_OVERRIDE_VAR).map(PathBuf::from),
            app_name: get("BRIDGE_APP_NAME").unwrap_or(defaults.app_name),
            artifact_path: get("BRIDGE_ARTIFACT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.artifact_path),
            wkhtmltopdf_path: get("WKHTMLTOPDF_PATH").map(PathBuf::from),
            sumatra_path: get("SUMATRA_PDF_PATH").map(PathBuf::from),
            max_frame_bytes,
        })
    }
}

/// `printer.pdf` junto al ejecutable; si no se puede saber dónde está,
/// queda relativo al directorio actual.
fn default_artifact_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(ARTIFACT_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(ARTIFACT_FILE_NAME))
}
