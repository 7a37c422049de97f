//! services/pdf_service.rs
//! Render de HTML a PDF con wkhtmltopdf (proceso externo, fuera de pantalla).

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::{
    path::PathBuf,
    sync::Arc,
    time::Instant,
};
use tempfile::TempDir;
use tokio::process::Command;

use crate::models::print_model::{Margins, PageSize, PagePreset, ResolvedPrintJob};

/// Prefijo del directorio temporal de cada trabajo
const SCRATCH_DIR_PREFIX: &str = "print_bridge_";

/// Convierte HTML en un documento paginado.
#[async_trait]
pub trait HtmlRenderer: Send + Sync {
    async fn render(&self, html: &str, job: &ResolvedPrintJob) -> Result<Vec<u8>>;
}

#[derive(Clone)]
pub struct PdfService {
    wkhtmltopdf_path: Option<Arc<PathBuf>>,
}

impl PdfService {
    /// Usa la ruta indicada o busca wkhtmltopdf en PATH. Si no aparece, el
    /// servicio arranca igual y cada render falla (las opciones siguen
    /// funcionando sin renderizador).
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        let wkhtmltopdf_path = match explicit_path {
            Some(path) => Some(path),
            None => match which::which("wkhtmltopdf") {
                Ok(path) => Some(path),
                Err(e) => {
                    log::warn!("No se encontró wkhtmltopdf en el sistema: {}", e);
                    None
                }
            },
        };

        Self {
            wkhtmltopdf_path: wkhtmltopdf_path.map(Arc::new),
        }
    }

    fn binary(&self) -> Result<&PathBuf> {
        self.wkhtmltopdf_path
            .as_deref()
            .ok_or_else(|| anyhow!("wkhtmltopdf no está disponible"))
    }
}

#[async_trait]
impl HtmlRenderer for PdfService {
    async fn render(&self, html: &str, job: &ResolvedPrintJob) -> Result<Vec<u8>> {
        let start = Instant::now();
        let binary = self.binary()?;

        // Cada trabajo tiene su propio directorio; se borra al salir de scope
        let scratch = RenderScratch::create()?;

        tokio::fs::write(&scratch.html_path, html)
            .await
            .with_context(|| format!("Error escribiendo HTML temporal en {:?}", scratch.html_path))?;

        let mut cmd = Command::new(binary);
        cmd.args(wkhtmltopdf_args(job));
        cmd.arg(&scratch.html_path);
        cmd.arg(&scratch.pdf_path);
        cmd.stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());

        let output = cmd.output().await.context("No se pudo lanzar wkhtmltopdf")?;

        if !output.status.success() {
            let stderr_msg = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("wkhtmltopdf falló: {}", stderr_msg.trim()));
        }

        let pdf_bytes = tokio::fs::read(&scratch.pdf_path)
            .await
            .with_context(|| format!("Error leyendo PDF final en {:?}", scratch.pdf_path))?;

        log::info!(
            "PDF generado en {:.2}s ({} bytes)",
            start.elapsed().as_secs_f32(),
            pdf_bytes.len()
        );
        Ok(pdf_bytes)
    }
}

/// Argumentos de página para wkhtmltopdf. Las medidas vienen en pulgadas.
pub fn wkhtmltopdf_args(job: &ResolvedPrintJob) -> Vec<String> {
    let mut args: Vec<String> = vec!["--quiet".into(), "--encoding".into(), "utf-8".into()];

    // ===== TAMAÑO DE PÁGINA =====
    match &job.page_size {
        PageSize::Preset(PagePreset::A4) => {
            args.push("--page-size".into());
            args.push("A4".into());
        }
        PageSize::Custom { width, height } => {
            args.push("--page-width".into());
            args.push(format!("{}in", width));
            args.push("--page-height".into());
            args.push(format!("{}in", height));
        }
    }

    // ===== MÁRGENES =====
    // Con márgenes por defecto no se pasa nada: wkhtmltopdf usa los suyos
    if let Margins::Custom {
        top,
        right,
        bottom,
        left,
    } = &job.margins
    {
        args.push("--margin-top".into());
        args.push(format!("{}in", top));
        args.push("--margin-right".into());
        args.push(format!("{}in", right));
        args.push("--margin-bottom".into());
        args.push(format!("{}in", bottom));
        args.push("--margin-left".into());
        args.push(format!("{}in", left));
    }

    // ===== FONDOS =====
    if job.print_background {
        args.push("--background".into());
    } else {
        args.push("--no-background".into());
    }

    // Sin --enable-local-file-access: el HTML del cliente no puede leer
    // archivos locales del host
    args.push("--print-media-type".into());
    args
}

// --------------------------------------------------------------------------------
// Directorio temporal por trabajo
// --------------------------------------------------------------------------------
struct RenderScratch {
    _dir: TempDir,
    html_path: PathBuf,
    pdf_path: PathBuf,
}

impl RenderScratch {
    fn create() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_DIR_PREFIX)
            .tempdir()
            .context("No se pudo crear el directorio temporal del render")?;
        let html_path = dir.path().join("document.html");
        let pdf_path = dir.path().join("document.pdf");
        Ok(Self {
            _dir: dir,
            html_path,
            pdf_path,
        })
    }
}
