//! tests/mod.rs
//! Dobles de prueba compartidos: renderizador, backend de impresión y
//! notificador falsos, más un arnés con opciones en un directorio temporal.

mod backend_tests;
mod config_tests;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::app::AppContext;
use crate::models::print_model::{JobOutcome, PrinterDescriptor, ResolvedPrintJob};
use crate::services::notification_service::Notifier;
use crate::services::options_service::{OptionsLocator, OptionsService, OPTIONS_FILE_NAME};
use crate::services::pdf_service::HtmlRenderer;
use crate::services::print_service::PrintService;
use crate::services::printer_backend::PrintBackend;

pub fn fake_pdf(html: &str) -> Vec<u8> {
    format!("%PDF-1.4 fake {}", html).into_bytes()
}

#[derive(Default)]
pub struct FakeRenderer {
    pub fail: bool,
    pub rendered: Mutex<Vec<(String, ResolvedPrintJob)>>,
}

impl FakeRenderer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl HtmlRenderer for FakeRenderer {
    async fn render(&self, html: &str, job: &ResolvedPrintJob) -> Result<Vec<u8>> {
        self.rendered
            .lock()
            .unwrap()
            .push((html.to_string(), job.clone()));
        if self.fail {
            return Err(anyhow!("render failed"));
        }
        // Cede el hilo para que trabajos simultáneos se intercalen
        tokio::task::yield_now().await;
        Ok(fake_pdf(html))
    }
}

#[derive(Default)]
pub struct FakeBackend {
    pub printers: Vec<PrinterDescriptor>,
    pub dispatch_error: Option<String>,
    /// Contexto añadido encima de `dispatch_error`
    pub dispatch_context: Option<String>,
    /// (trabajo, bytes del archivo en el momento del envío)
    pub dispatched: Mutex<Vec<(ResolvedPrintJob, Vec<u8>)>>,
}

impl FakeBackend {
    pub fn with_printers(printers: Vec<PrinterDescriptor>) -> Self {
        Self {
            printers,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            dispatch_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_with_context(message: &str, context: &str) -> Self {
        Self {
            dispatch_error: Some(message.to_string()),
            dispatch_context: Some(context.to_string()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PrintBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn list_printers(&self) -> Result<Vec<PrinterDescriptor>> {
        Ok(self.printers.clone())
    }

    async fn print_file(&self, artifact: &Path, job: &ResolvedPrintJob) -> Result<()> {
        tokio::task::yield_now().await;
        let bytes = tokio::fs::read(artifact).await?;
        self.dispatched.lock().unwrap().push((job.clone(), bytes));
        match (&self.dispatch_error, &self.dispatch_context) {
            (Some(message), Some(context)) => Err(anyhow!(message.clone()).context(context.clone())),
            (Some(message), None) => Err(anyhow!(message.clone())),
            (None, _) => Ok(()),
        }
    }
}

pub struct RecordingNotifier {
    tx: UnboundedSender<JobOutcome>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, outcome: &JobOutcome) {
        let _ = self.tx.send(outcome.clone());
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub ctx: AppContext,
    pub renderer: Arc<FakeRenderer>,
    pub backend: Arc<FakeBackend>,
    pub outcomes: UnboundedReceiver<JobOutcome>,
    pub artifact_path: PathBuf,
}

impl Harness {
    pub fn new(renderer: FakeRenderer, backend: FakeBackend) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let artifact_path = dir.path().join("printer.pdf");
        Self::with_artifact(dir, artifact_path, renderer, backend)
    }

    pub fn with_artifact(
        dir: TempDir,
        artifact_path: PathBuf,
        renderer: FakeRenderer,
        backend: FakeBackend,
    ) -> Self {
        let options = OptionsService::new(OptionsLocator::with_override(
            dir.path().join(OPTIONS_FILE_NAME),
        ));
        let renderer = Arc::new(renderer);
        let backend = Arc::new(backend);
        let (tx, outcomes) = unbounded_channel();

        let printing = PrintService::new(
            options.clone(),
            renderer.clone(),
            backend.clone(),
            Arc::new(RecordingNotifier { tx }),
            artifact_path.clone(),
        );
        let ctx = AppContext::new(options, printing, backend.clone(), 1024 * 1024);

        Self {
            dir,
            ctx,
            renderer,
            backend,
            outcomes,
            artifact_path,
        }
    }

    pub fn options_path(&self) -> PathBuf {
        self.dir.path().join(OPTIONS_FILE_NAME)
    }

    pub fn write_options(&self, options: &Value) {
        std::fs::write(self.options_path(), options.to_string()).expect("write options");
    }

    pub async fn next_outcome(&mut self) -> JobOutcome {
        tokio::time::timeout(Duration::from_secs(5), self.outcomes.recv())
            .await
            .expect("sin aviso a tiempo")
            .expect("canal cerrado")
    }
}
