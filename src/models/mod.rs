//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod config_model;
pub mod message_model;
