//! services/print_service.rs
//! Pipeline de impresión: opciones + request -> trabajo resuelto -> PDF ->
//! archivo fijo -> spooler. El resultado solo se comunica por aviso.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::{
    path::PathBuf,
    sync::Arc,
    time::Instant,
};
use tokio::sync::{Semaphore, SemaphorePermit};
use uuid::Uuid;

use crate::models::json_value::{is_non_zero, parse_float, truthy};
use crate::models::print_model::{
    JobOutcome, Margins, PagePreset, PageSize, PrintRequest, ResolvedPrintJob,
};
use crate::services::notification_service::Notifier;
use crate::services::options_service::OptionsService;
use crate::services::pdf_service::HtmlRenderer;
use crate::services::printer_backend::PrintBackend;

/// Atributos por impresora: `<clave>_<atributo>` en el archivo de opciones.
pub const ATTR_HEIGHT: &str = "height";
pub const ATTR_WIDTH: &str = "width";
pub const ATTR_MARGIN_TOP: &str = "margin_top";
pub const ATTR_MARGIN_RIGHT: &str = "margin_right";
pub const ATTR_MARGIN_LEFT: &str = "margin_left";
pub const ATTR_MARGIN_BOTTOM: &str = "margin_bottom";
pub const ATTR_ORIENTATION: &str = "orientation";

/// Valores finales tras combinar opciones persistidas y request.
#[derive(Debug, Clone, Default)]
struct MergedAttributes {
    height: Option<Value>,
    width: Option<Value>,
    margin_top: Option<Value>,
    margin_right: Option<Value>,
    margin_left: Option<Value>,
    margin_bottom: Option<Value>,
    orientation: Option<Value>,
}

/// Combina request y opciones y calcula la geometría de página.
///
/// Para cada atributo gana la entrada `<clave>_<atributo>` de las opciones si
/// es truthy; si no, el valor del request. El nombre de impresora del sistema
/// sale siempre de `opciones[<clave>]`.
pub fn resolve_job(req: &PrintRequest, options: &Value) -> Result<ResolvedPrintJob> {
    let key = req
        .printer
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| anyhow!("El trabajo no indica impresora"))?;

    let printer_name = options
        .get(key)
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow!("La impresora '{}' no está configurada", key))?
        .to_string();

    let pick = |attr: &str, inline: &Option<Value>| -> Option<Value> {
        let stored = options.get(format!("{}_{}", key, attr).as_str());
        truthy(stored).or(inline.as_ref()).cloned()
    };
    let merged = MergedAttributes {
        height: pick(ATTR_HEIGHT, &req.page_height),
        width: pick(ATTR_WIDTH, &req.page_width),
        margin_top: pick(ATTR_MARGIN_TOP, &req.margin_top),
        margin_right: pick(ATTR_MARGIN_RIGHT, &req.margin_right),
        margin_left: pick(ATTR_MARGIN_LEFT, &req.margin_left),
        margin_bottom: pick(ATTR_MARGIN_BOTTOM, &req.margin_bottom),
        orientation: pick(ATTR_ORIENTATION, &req.orientation),
    };

    Ok(ResolvedPrintJob {
        printer_name,
        page_size: page_size(&merged)?,
        margins: margins(&merged)?,
        print_background: true,
        orientation: merged
            .orientation
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Alto y ancho distintos de cero -> tamaño propio; si no, A4.
fn page_size(merged: &MergedAttributes) -> Result<PageSize> {
    match (&merged.width, &merged.height) {
        (Some(width), Some(height))
            if is_non_zero(Some(width)) && is_non_zero(Some(height)) =>
        {
            Ok(PageSize::Custom {
                width: finite(width, "pageWidth")?,
                height: finite(height, "pageHeight")?,
            })
        }
        _ => Ok(PageSize::Preset(PagePreset::A4)),
    }
}

/// Los cuatro márgenes presentes -> márgenes propios; si no, los del
/// renderizador. El margen derecho toma el valor del inferior: los clientes
/// existentes dependen de ello.
fn margins(merged: &MergedAttributes) -> Result<Margins> {
    let all = (
        truthy(merged.margin_top.as_ref()),
        truthy(merged.margin_right.as_ref()),
        truthy(merged.margin_left.as_ref()),
        truthy(merged.margin_bottom.as_ref()),
    );
    match all {
        (Some(top), Some(_right), Some(left), Some(bottom)) => Ok(Margins::Custom {
            top: finite(top, "marginTop")?,
            right: finite(bottom, "marginBottom")?,
            bottom: finite(bottom, "marginBottom")?,
            left: finite(left, "marginLeft")?,
        }),
        _ => Ok(Margins::DEFAULT),
    }
}

fn finite(value: &Value, field: &str) -> Result<f64> {
    let parsed = parse_float(value);
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(anyhow!("Valor inválido para {}: {}", field, value))
    }
}

#[derive(Clone)]
pub struct PrintService {
    options: OptionsService,
    renderer: Arc<dyn HtmlRenderer>,
    backend: Arc<dyn PrintBackend>,
    notifier: Arc<dyn Notifier>,
    artifact_path: Arc<PathBuf>,
    /// Un solo trabajo a la vez escribe y despacha el archivo fijo
    artifact_lock: Arc<Semaphore>,
}

impl PrintService {
    pub fn new(
        options: OptionsService,
        renderer: Arc<dyn HtmlRenderer>,
        backend: Arc<dyn PrintBackend>,
        notifier: Arc<dyn Notifier>,
        artifact_path: PathBuf,
    ) -> Self {
        Self {
            options,
            renderer,
            backend,
            notifier,
            artifact_path: Arc::new(artifact_path),
            artifact_lock: Arc::new(Semaphore::new(1)),
        }
    }

    /// Lanza el trabajo en segundo plano; no hay respuesta por el socket.
    pub fn spawn(&self, req: PrintRequest) -> tokio::task::JoinHandle<()> {
        let service = self.clone();
        actix_web::rt::spawn(async move { service.run(req).await })
    }

    /// Ejecuta el trabajo completo y avisa del resultado.
    pub async fn run(&self, req: PrintRequest) {
        let job_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        log::info!(
            "(job {}) Nuevo trabajo para '{}', HTML de {} chars",
            job_id,
            req.printer.as_deref().unwrap_or_default(),
            req.content.len()
        );

        if let Some(outcome) = self.execute(&job_id, &req).await {
            self.notifier.notify(&outcome).await;
        }

        log::info!(
            "(job {}) Terminado en {:.2}s",
            job_id,
            start.elapsed().as_secs_f32()
        );
    }

    /// `None` cuando el trabajo se aborta sin aviso (fallo al guardar el PDF).
    async fn execute(&self, job_id: &str, req: &PrintRequest) -> Option<JobOutcome> {
        // 1) Opciones frescas de disco
        let options = match self.options.get().await {
            Ok(options) => options,
            Err(e) => {
                log::error!("(job {}) No se pudieron leer las opciones: {:?}", job_id, e);
                return Some(JobOutcome::check_configuration());
            }
        };

        // 2) Merge + geometría
        let job = match resolve_job(req, &options) {
            Ok(job) => job,
            Err(e) => {
                log::error!("(job {}) Configuración de página inválida: {:?}", job_id, e);
                return Some(JobOutcome::check_configuration());
            }
        };
        log::info!(
            "(job {}) Trabajo resuelto: {}",
            job_id,
            serde_json::to_string(&job).unwrap_or_default()
        );

        // 3) Render
        let pdf = match self.renderer.render(&req.content, &job).await {
            Ok(pdf) => pdf,
            Err(e) => {
                log::error!("(job {}) Error generando PDF: {:?}", job_id, e);
                return Some(JobOutcome::check_configuration());
            }
        };

        // 4) Guardar en la ruta fija y despachar, un trabajo a la vez
        let _permit = match self.acquire_permit().await {
            Ok(permit) => permit,
            Err(e) => {
                log::error!("(job {}) {:?}", job_id, e);
                return None;
            }
        };

        if let Err(e) = tokio::fs::write(&*self.artifact_path, &pdf)
            .await
            .with_context(|| format!("No se pudo guardar PDF en {:?}", self.artifact_path))
        {
            log::error!("(job {}) {:?}", job_id, e);
            return None;
        }

        // 5) Spooler
        log::info!(
            "(job {}) Enviando a '{}' vía {}",
            job_id,
            job.printer_name,
            self.backend.name()
        );
        match self.backend.print_file(&self.artifact_path, &job).await {
            Ok(()) => Some(JobOutcome::success()),
            Err(e) => {
                log::error!("(job {}) Error de impresión: {:?}", job_id, e);
                // El aviso lleva el texto del backend con toda su cadena
                Some(JobOutcome::failed(format!("{:#}", e)))
            }
        }
    }

    async fn acquire_permit(&self) -> Result<SemaphorePermit<'_>> {
        self.artifact_lock
            .acquire()
            .await
            .map_err(|_| anyhow!("No se pudo adquirir el semaphore del archivo de salida"))
    }
}
