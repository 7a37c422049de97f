//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod notification_service;
pub mod options_service;
pub mod pdf_service;
pub mod print_service;
pub mod printer_backend;
