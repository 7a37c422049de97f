//! handlers/ws_handler.rs
//! Endpoint WebSocket: un objeto JSON por frame de texto.

use actix_web::{web, HttpRequest, HttpResponse};
use actix_ws::{AggregatedMessage, AggregatedMessageStream, Session};
use std::sync::Arc;

use crate::app::AppContext;
use crate::handlers::command_handler::handle_frame;

/// GET / (upgrade a WebSocket)
pub async fn bridge_socket(
    ctx: web::Data<AppContext>,
    req: HttpRequest,
    body: web::Payload,
) -> actix_web::Result<HttpResponse> {
    let (response, session, msg_stream) = actix_ws::handle(&req, body)?;

    let peer = req
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "desconocido".to_string());
    log::info!("Cliente WebSocket conectado ({})", peer);

    // HTML grande puede llegar en un solo frame o fragmentado
    let max_bytes = ctx.max_frame_bytes;
    let stream = msg_stream
        .max_frame_size(max_bytes)
        .aggregate_continuations()
        .max_continuation_size(max_bytes);

    actix_web::rt::spawn(run_session(ctx.into_inner(), session, stream, peer));
    Ok(response)
}

/// Cada conexión se atiende por separado; los mensajes de una misma
/// conexión se procesan en orden.
async fn run_session(
    ctx: Arc<AppContext>,
    mut session: Session,
    mut stream: AggregatedMessageStream,
    peer: String,
) {
    while let Some(msg) = stream.recv().await {
        match msg {
            Ok(AggregatedMessage::Text(text)) => {
                if let Some(reply) = handle_frame(&ctx, &text).await {
                    if session.text(reply.to_string()).await.is_err() {
                        break;
                    }
                }
            }
            Ok(AggregatedMessage::Ping(bytes)) => {
                if session.pong(&bytes).await.is_err() {
                    break;
                }
            }
            Ok(AggregatedMessage::Close(reason)) => {
                log::info!("Cliente WebSocket desconectado ({}): {:?}", peer, reason);
                let _ = session.close(reason).await;
                return;
            }
            Ok(AggregatedMessage::Binary(_)) => log::debug!("Frame binario ignorado ({})", peer),
            Ok(AggregatedMessage::Pong(_)) => {}
            Err(e) => {
                log::warn!("Error de protocolo WebSocket ({}): {}", peer, e);
                break;
            }
        }
    }

    let _ = session.close(None).await;
    log::info!("Cliente WebSocket desconectado ({})", peer);
}
