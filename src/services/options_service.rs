//! services/options_service.rs
//! Archivo de opciones persistido (JSON plano, clave -> valor).
//!
//! La ruta se resuelve en cada operación: no hay caché en memoria. Tampoco hay
//! bloqueo entre lecturas y escrituras concurrentes; un `set-options` puede
//! pisar a otro (última escritura gana).

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::bridge_config::BridgeConfig;

pub const OPTIONS_FILE_NAME: &str = "olorin_options.json";

/// Lista ordenada de ubicaciones posibles del archivo de opciones.
#[derive(Debug, Clone)]
pub struct OptionsLocator {
    override_path: Option<PathBuf>,
    candidates: Vec<PathBuf>,
}

impl OptionsLocator {
    pub fn from_config(config: &BridgeConfig) -> Self {
        match &config.options_override {
            Some(path) => Self::with_override(path.clone()),
            None => Self::with_candidates(default_candidates(&config.app_name)),
        }
    }

    /// La ruta indicada es la única ubicación posible, exista o no.
    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        OptionsLocator {
            override_path: Some(path.into()),
            candidates: Vec::new(),
        }
    }

    pub fn with_candidates(candidates: Vec<PathBuf>) -> Self {
        OptionsLocator {
            override_path: None,
            candidates,
        }
    }

    /// Recorre los candidatos en orden y se queda con el ÚLTIMO que exista.
    /// Si no existe ninguno, devuelve el nombre de archivo a secas.
    pub async fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.override_path {
            log::debug!("Usando archivo de opciones forzado: {:?}", path);
            return path.clone();
        }

        let mut chosen: Option<&PathBuf> = None;
        for candidate in &self.candidates {
            log::debug!("Revisando ruta de opciones {:?}", candidate);
            if path_exists(candidate).await {
                chosen = Some(candidate);
            }
        }

        let resolved = chosen
            .cloned()
            .unwrap_or_else(|| PathBuf::from(OPTIONS_FILE_NAME));
        log::debug!("Archivo de opciones resuelto: {:?}", resolved);
        resolved
    }
}

/// Directorio actual, home, AppData, userData, sessionData y raíz.
pub fn default_candidates(app_name: &str) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(OPTIONS_FILE_NAME)];

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(OPTIONS_FILE_NAME));
    }
    if let Some(app_data) = dirs::config_dir() {
        paths.push(app_data.join(OPTIONS_FILE_NAME));
        let user_data = app_data.join(app_name);
        paths.push(user_data.join(OPTIONS_FILE_NAME));
        // sessionData vive en el mismo directorio que userData
        paths.push(user_data.join(OPTIONS_FILE_NAME));
    }
    paths.push(filesystem_root().join(OPTIONS_FILE_NAME));

    paths
}

fn filesystem_root() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("C:\\")
    } else {
        PathBuf::from("/")
    }
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct OptionsService {
    locator: Arc<OptionsLocator>,
}

impl OptionsService {
    pub fn new(locator: OptionsLocator) -> Self {
        OptionsService {
            locator: Arc::new(locator),
        }
    }

    pub async fn resolved_path(&self) -> PathBuf {
        self.locator.resolve().await
    }

    /// Documento completo, o `{}` si el archivo no existe.
    /// Un error de lectura o un JSON corrupto se propagan.
    pub async fn get(&self) -> Result<Value> {
        let path = self.resolved_path().await;
        if !path_exists(&path).await {
            return Ok(Value::Object(Default::default()));
        }

        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Error leyendo opciones en {:?}", path))?;
        let options = serde_json::from_str(&raw)
            .with_context(|| format!("JSON inválido en archivo de opciones {:?}", path))?;
        Ok(options)
    }

    /// Reemplaza el documento entero; no hay merge con lo anterior.
    pub async fn set(&self, options: &Value) -> Result<()> {
        let path = self.resolved_path().await;
        let raw = serde_json::to_string(options).context("No se pudo serializar las opciones")?;

        tokio::fs::write(&path, raw)
            .await
            .with_context(|| format!("Error escribiendo opciones en {:?}", path))?;

        log::info!("Opciones guardadas en {:?}", path);
        Ok(())
    }
}
