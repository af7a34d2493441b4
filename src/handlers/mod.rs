//! handlers/mod.rs
//! Handlers del endpoint administrativo.
pub mod config_handler;
pub mod message_handler;
