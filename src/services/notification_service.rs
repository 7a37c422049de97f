//! services/notification_service.rs
//! Aviso al usuario del resultado de un trabajo de impresión, fuera del
//! WebSocket. Nunca falla: si la herramienta de escritorio no está o
//! devuelve error, solo queda el log.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

use crate::models::print_model::JobOutcome;

pub const NOTIFICATION_TITLE: &str = "Olorin Alert";

const TITLE_ENV: &str = "BRIDGE_NOTIFY_TITLE";
const BODY_ENV: &str = "BRIDGE_NOTIFY_BODY";

/// AppUserModelID de PowerShell; los toasts necesitan uno registrado.
const POWERSHELL_APP_ID: &str =
    "{1AC14E77-02E7-4E5D-B744-2EB1AE5198B7}\\WindowsPowerShell\\v1.0\\powershell.exe";

const OSASCRIPT_NOTIFY: &str = "display notification (system attribute \"BRIDGE_NOTIFY_BODY\") \
     with title (system attribute \"BRIDGE_NOTIFY_TITLE\")";

const POWERSHELL_TOAST: &str = r#"
$ErrorActionPreference = 'Stop'
[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] | Out-Null
$xml = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02)
$texts = $xml.GetElementsByTagName('text')
$texts.Item(0).AppendChild($xml.CreateTextNode($env:BRIDGE_NOTIFY_TITLE)) | Out-Null
$texts.Item(1).AppendChild($xml.CreateTextNode($env:BRIDGE_NOTIFY_BODY)) | Out-Null
$toast = [Windows.UI.Notifications.ToastNotification]::new($xml)
[Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier($env:BRIDGE_NOTIFY_APP_ID).Show($toast)
"#;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, outcome: &JobOutcome);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotifyTool {
    NotifySend,
    OsaScript,
    PowerShellToast,
    LogOnly,
}

#[derive(Debug, Clone)]
pub struct NotificationService {
    title: String,
    tool: NotifyTool,
    tool_path: Option<PathBuf>,
}

impl NotificationService {
    /// Elige la herramienta de escritorio según la plataforma.
    pub fn for_current_platform() -> Self {
        let (tool, binary) = if cfg!(windows) {
            (NotifyTool::PowerShellToast, "powershell")
        } else if cfg!(target_os = "macos") {
            (NotifyTool::OsaScript, "osascript")
        } else {
            (NotifyTool::NotifySend, "notify-send")
        };

        match which::which(binary) {
            Ok(path) => Self {
                title: NOTIFICATION_TITLE.to_string(),
                tool,
                tool_path: Some(path),
            },
            Err(_) => {
                log::warn!("No se encontró {}; los avisos solo irán al log", binary);
                Self::log_only()
            }
        }
    }

    pub fn log_only() -> Self {
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            tool: NotifyTool::LogOnly,
            tool_path: None,
        }
    }

    fn command(&self, body: &str) -> Option<Command> {
        let path = self.tool_path.as_ref()?;
        let mut cmd = Command::new(path);

        match self.tool {
            NotifyTool::NotifySend => {
                cmd.arg("--app-name").arg(&self.title).arg(&self.title).arg(body);
            }
            NotifyTool::OsaScript => {
                cmd.arg("-e").arg(OSASCRIPT_NOTIFY);
            }
            NotifyTool::PowerShellToast => {
                cmd.args(["-NoProfile", "-NonInteractive", "-Command", POWERSHELL_TOAST])
                    .env("BRIDGE_NOTIFY_APP_ID", POWERSHELL_APP_ID);
            }
            NotifyTool::LogOnly => return None,
        }

        cmd.env(TITLE_ENV, &self.title).env(BODY_ENV, body);
        Some(cmd)
    }
}

#[async_trait]
impl Notifier for NotificationService {
    async fn notify(&self, outcome: &JobOutcome) {
        if outcome.succeeded {
            log::info!("[{}] {}", self.title, outcome.message);
        } else {
            log::warn!("[{}] {}", self.title, outcome.message);
        }

        let Some(mut cmd) = self.command(&outcome.message) else {
            return;
        };

        match cmd.output().await {
            Ok(out) if !out.status.success() => log::warn!(
                "El aviso de escritorio falló ({}): {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            ),
            Err(e) => log::warn!("No se pudo mostrar el aviso de escritorio: {}", e),
            Ok(_) => {}
        }
    }
}
