use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use dotenv::dotenv;

use crate::app::AppContext;
use crate::config::bridge_config::BridgeConfig;
use crate::logger::init_logger;

mod app;
mod config;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = BridgeConfig::from_env().context("Configuración inválida")?;
    let context = AppContext::from_config(&config);

    // Un solo worker: todo el despacho corre en un hilo con I/O asíncrona
    log::info!(
        "Servidor WebSocket escuchando en {}:{}",
        config.host,
        config.port
    );
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(context.clone()))
            .configure(app::init_app)
    })
    .workers(1)
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("No se pudo abrir {}:{}", config.host, config.port))?
    .run()
    .await
    .context("El servidor terminó con error")?;

    Ok(())
}
