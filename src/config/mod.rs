//! config/mod.rs
//! Configuración del proceso (variables de entorno).

pub mod worker_config;
