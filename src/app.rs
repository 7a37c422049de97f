//! app.rs
//! Contexto de la aplicación y rutas.

use actix_web::web;
use std::sync::Arc;

use crate::config::bridge_config::BridgeConfig;
use crate::handlers::ws_handler;
use crate::services::notification_service::{NotificationService, Notifier};
use crate::services::options_service::{OptionsLocator, OptionsService};
use crate::services::pdf_service::{HtmlRenderer, PdfService};
use crate::services::print_service::PrintService;
use crate::services::printer_backend::{platform_backend, PrintBackend};

/// Todo lo que comparten las conexiones. Se crea una vez al arrancar.
#[derive(Clone)]
pub struct AppContext {
    pub options: OptionsService,
    pub printing: PrintService,
    pub backend: Arc<dyn PrintBackend>,
    pub max_frame_bytes: usize,
}

impl AppContext {
    pub fn new(
        options: OptionsService,
        printing: PrintService,
        backend: Arc<dyn PrintBackend>,
        max_frame_bytes: usize,
    ) -> Self {
        Self {
            options,
            printing,
            backend,
            max_frame_bytes,
        }
    }

    /// Servicios reales de la plataforma actual.
    pub fn from_config(config: &BridgeConfig) -> Self {
        let options = OptionsService::new(OptionsLocator::from_config(config));
        let backend = platform_backend(config);
        let renderer: Arc<dyn HtmlRenderer> =
            Arc::new(PdfService::new(config.wkhtmltopdf_path.clone()));
        let notifier: Arc<dyn Notifier> = Arc::new(NotificationService::for_current_platform());

        log::info!(
            "Backend de impresión: {}, PDF de salida en {:?}",
            backend.name(),
            config.artifact_path
        );

        let printing = PrintService::new(
            options.clone(),
            renderer,
            backend.clone(),
            notifier,
            config.artifact_path.clone(),
        );

        Self::new(options, printing, backend, config.max_frame_bytes)
    }
}

pub fn init_app(cfg: &mut web::ServiceConfig) {
    // El cliente se conecta a ws://localhost:<puerto>, con o sin ruta
    cfg.service(
        web::resource("/{tail:.*}").route(web::get().to(ws_handler::bridge_socket)),
    );
}
