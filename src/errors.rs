//! errors.rs
//! Errores tipados del worker.

use serde_json::json;
use thiserror::Error;

use crate::models::config_model::ConfigType;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("falta la configuración '{0}'")]
    ConfigurationMissing(ConfigType),

    #[error("captura de gráfico fallida: {0}")]
    Screenshot(String),

    #[error("envío fallido: {0}")]
    Dispatch(String),

    #[error("login fallido: {0}")]
    Authentication(String),

    #[error("error de base de datos: {0}")]
    Database(#[from] sqlx::Error),
}

impl WorkerError {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerError::ConfigurationMissing(_) => "ConfigurationMissing",
            WorkerError::Screenshot(_) => "ScreenshotError",
            WorkerError::Dispatch(_) => "DispatchError",
            WorkerError::Authentication(_) => "AuthenticationFailure",
            WorkerError::Database(_) => "DatabaseError",
        }
    }

    /// Forma serializada que se guarda en la columna `log` de `messages`
    pub fn to_log(&self) -> String {
        json!({ "error": self.kind(), "message": self.to_string() }).to_string()
    }
}
