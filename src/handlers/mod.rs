//! handlers/mod.rs
//! Transporte (WebSocket) y despacho de comandos.

pub mod command_handler;
pub mod ws_handler;
