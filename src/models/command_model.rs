//! models/command_model.rs
//! Mensajes del protocolo: un objeto JSON por frame de texto.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::models::json_value::is_truthy;
use crate::models::print_model::PrinterDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    ListPrinter,
    PrinterCommand,
    GetOptions,
    SetOptions,
}

impl CommandKind {
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "list-printer" => Some(CommandKind::ListPrinter),
            "printer-command" => Some(CommandKind::PrinterCommand),
            "get-options" => Some(CommandKind::GetOptions),
            "set-options" => Some(CommandKind::SetOptions),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::ListPrinter => "list-printer",
            CommandKind::PrinterCommand => "printer-command",
            CommandKind::GetOptions => "get-options",
            CommandKind::SetOptions => "set-options",
        }
    }
}

/// Comando ya validado; `frame` conserva el objeto completo como payload.
#[derive(Debug, Clone)]
pub struct Command {
    pub kind: CommandKind,
    pub frame: Value,
}

/// Motivos por los que un frame se descarta sin respuesta.
#[derive(Debug)]
pub enum DroppedFrame {
    Malformed(serde_json::Error),
    MissingId,
    UnknownCommand(Option<String>),
}

impl fmt::Display for DroppedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DroppedFrame::Malformed(e) => write!(f, "JSON inválido: {}", e),
            DroppedFrame::MissingId => write!(f, "mensaje sin id"),
            DroppedFrame::UnknownCommand(Some(text)) => write!(f, "comando desconocido: {}", text),
            DroppedFrame::UnknownCommand(None) => write!(f, "mensaje sin text"),
        }
    }
}

impl Command {
    pub fn parse(raw: &str) -> Result<Command, DroppedFrame> {
        let frame: Value = serde_json::from_str(raw).map_err(DroppedFrame::Malformed)?;

        if !frame.get("id").map(is_truthy).unwrap_or(false) {
            return Err(DroppedFrame::MissingId);
        }

        let text = frame.get("text").and_then(Value::as_str);
        match text.and_then(CommandKind::from_text) {
            Some(kind) => Ok(Command { kind, frame }),
            None => Err(DroppedFrame::UnknownCommand(text.map(str::to_string))),
        }
    }

    /// Payload de `set-options`; si falta se guarda un objeto vacío.
    pub fn options_payload(&self) -> Value {
        match self.frame.get("options") {
            Some(value) => value.clone(),
            None => Value::Object(Default::default()),
        }
    }
}

/// Respuesta de `list-printer`.
#[derive(Debug, Clone, Serialize)]
pub struct PrinterListResponse {
    pub id: &'static str,
    pub printer: Vec<PrinterDescriptor>,
}

impl PrinterListResponse {
    pub fn new(printer: Vec<PrinterDescriptor>) -> Self {
        PrinterListResponse {
            id: "printerList",
            printer,
        }
    }
}

/// Respuesta de `set-options`.
#[derive(Debug, Clone, Serialize)]
pub struct SetOptionsResponse {
    pub success: bool,
}
