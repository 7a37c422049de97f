//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod command_model;
pub mod json_value;
pub mod print_model;
