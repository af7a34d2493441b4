//! services/heartbeat_service.rs
//! Marca de vida del worker: una fila `worker` en `configs` con un timestamp ISO.

use anyhow::Result;
use chrono::{SecondsFormat, Utc};

use crate::models::config_model::ConfigType;
use crate::services::config_service::ConfigService;

#[derive(Clone, Debug)]
pub struct HeartbeatService {
    config_service: ConfigService,
}

impl HeartbeatService {
    pub fn new(config_service: ConfigService) -> Self {
        Self { config_service }
    }

    /// Crea la fila `worker` si no existe. Idempotente.
    pub async fn init(&self) -> Result<()> {
        let now = now_iso();
        let rec = self
            .config_service
            .find_or_create(ConfigType::Worker, &now)
            .await?;
        log::info!("(heartbeat_init) Heartbeat listo, último valor={}", rec.data);
        Ok(())
    }

    /// Pisa el timestamp. Sin fila `worker` no actualiza nada y no es error.
    pub async fn touch(&self) -> Result<()> {
        let now = now_iso();
        let affected = self
            .config_service
            .update_data(ConfigType::Worker, &now)
            .await?;
        if affected == 0 {
            log::debug!("(heartbeat_touch) No existe fila 'worker', nada que actualizar");
        }
        Ok(())
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
