//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod auth_service;
pub mod browser_session;
pub mod config_service;
pub mod dispatch_service;
pub mod heartbeat_service;
pub mod message_service;
pub mod screenshot_service;
pub mod telegram_service;
