//! logger.rs
//! Configuración del logger usando env_logger.

use env_logger;

/// Nivel por defecto si no hay RUST_LOG en el entorno.
const DEFAULT_FILTER: &str = "info";

pub fn init_logger() {
    let log_env = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_env))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}
