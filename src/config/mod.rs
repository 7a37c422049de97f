//! config/mod.rs
//! Configuración del proceso.

pub mod bridge_config;
