//! handlers/command_handler.rs
//! Despacho de comandos del protocolo. Independiente del transporte: recibe
//! el texto de un frame y devuelve la respuesta (si la hay).

use anyhow::{Context, Result};
use serde_json::Value;

use crate::app::AppContext;
use crate::models::command_model::{
    Command, CommandKind, PrinterListResponse, SetOptionsResponse,
};
use crate::models::print_model::PrintRequest;

/// Procesa un frame de texto. `None` significa "no se responde nada":
/// frame inválido, sin id, comando desconocido, `printer-command` o error.
pub async fn handle_frame(ctx: &AppContext, raw: &str) -> Option<Value> {
    let command = match Command::parse(raw) {
        Ok(command) => command,
        Err(reason) => {
            log::debug!("Frame descartado: {}", reason);
            return None;
        }
    };

    let kind = command.kind;
    log::debug!("Comando recibido: {}", kind.as_str());

    match dispatch(ctx, command).await {
        Ok(reply) => reply,
        Err(e) => {
            log::error!("Error procesando '{}': {:?}", kind.as_str(), e);
            None
        }
    }
}

async fn dispatch(ctx: &AppContext, command: Command) -> Result<Option<Value>> {
    match command.kind {
        CommandKind::ListPrinter => {
            let printers = ctx
                .backend
                .list_printers()
                .await
                .context("No se pudieron listar las impresoras")?;
            Ok(Some(serde_json::to_value(PrinterListResponse::new(printers))?))
        }
        CommandKind::PrinterCommand => {
            let req: PrintRequest = serde_json::from_value(command.frame)
                .context("Payload de printer-command inválido")?;
            // El resultado llega solo por aviso, nunca por el socket
            ctx.printing.spawn(req);
            Ok(None)
        }
        CommandKind::GetOptions => Ok(Some(ctx.options.get().await?)),
        CommandKind::SetOptions => {
            log::info!("Guardando opciones");
            ctx.options.set(&command.options_payload()).await?;
            Ok(Some(serde_json::to_value(SetOptionsResponse { success: true })?))
        }
    }
}
