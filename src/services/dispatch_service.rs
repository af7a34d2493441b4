use anyhow::Result;
use std::sync::Arc;

use crate::{
    config::worker_config::StatusMode,
    models::{
        config_model::{ConfigRecord, ConfigType},
        message_model::{ChartRequest, MessageStatus, QueueMessage},
    },
    services::{
        config_service::ConfigService, heartbeat_service::HeartbeatService,
        message_service::MessageService, screenshot_service::ChartCapture,
        telegram_service::Messenger,
    },
};

#[derive(Clone)]
pub struct DispatchService {
    config_service: ConfigService,
    message_service: MessageService,
    heartbeat: HeartbeatService,
    capture: Arc<dyn ChartCapture>,
    messenger: Arc<dyn Messenger>,
    placeholder_image_url: String,
    status_mode: StatusMode,
}

impl DispatchService {
    pub fn new(
        config_service: ConfigService,
        message_service: MessageService,
        heartbeat: HeartbeatService,
        capture: Arc<dyn ChartCapture>,
        messenger: Arc<dyn Messenger>,
        placeholder_image_url: String,
        status_mode: StatusMode,
    ) -> Self {
        Self {
            config_service,
            message_service,
            heartbeat,
            capture,
            messenger,
            placeholder_image_url,
            status_mode,
        }
    }

    /// Una pasada por la cola. Solo la falta de config (`ConfigurationMissing`)
    /// y la lectura de pendientes cortan el ciclo; el resto se queda en el canal.
    pub async fn process_queue(&self) -> Result<()> {
        // 1) Heartbeat
        self.beat("process_queue").await;

        // 2) Config vigente
        let bot = self.config_service.require(ConfigType::TelegramBot).await?;
        let screenshot = self
            .config_service
            .require(ConfigType::TradingViewScreenshot)
            .await?;

        if !bot.enabled {
            log::debug!("(process_queue) Bot deshabilitado, no se procesa la cola");
            return Ok(());
        }

        // 3) Pendientes
        let messages = self
            .message_service
            .find_by_status(MessageStatus::Pending)
            .await?;
        if messages.is_empty() {
            return Ok(());
        }
        log::info!("(process_queue) {} mensajes pendientes", messages.len());

        // 4) Cada mensaje, en orden de la cola
        for message in &messages {
            self.process_message(message, &bot.data, &screenshot).await;
        }

        Ok(())
    }

    async fn process_message(
        &self,
        message: &QueueMessage,
        token: &str,
        screenshot: &ConfigRecord,
    ) {
        let chart = ChartRequest {
            symbol: message.symbol().to_string(),
            timeframe: message.timeframe_or(&screenshot.data).to_string(),
        };
        let channels = message.channel_list();
        log::info!(
            "(process_message) Mensaje id={} symbol='{}' canales={:?}",
            message.id,
            chart.symbol,
            channels
        );

        let mut any_failed = false;
        for channel in &channels {
            let result = if screenshot.enabled {
                self.beat("process_message").await;
                let image_url = match self.capture.acquire(&chart).await {
                    Ok(url) => url,
                    Err(e) => {
                        log::error!(
                            "(process_message) Captura fallida para id={}: {}. Uso placeholder",
                            message.id,
                            e
                        );
                        if let Err(db_err) = self
                            .message_service
                            .update_log(message.id, &e.to_log())
                            .await
                        {
                            log::warn!(
                                "(process_message) No se guardó el log de captura id={}: {:#}",
                                message.id,
                                db_err
                            );
                        }
                        self.placeholder_image_url.clone()
                    }
                };
                self.beat("process_message").await;

                self.messenger
                    .send_photo(token, channel, &image_url, message.caption())
                    .await
            } else {
                self.messenger
                    .send_message(token, channel, &message.data)
                    .await
            };

            let (outcome, log_payload) = match result {
                Ok(response) => {
                    log::info!(
                        "(process_message) id={} enviado a '{}' con éxito",
                        message.id,
                        channel
                    );
                    (MessageStatus::Success, response.to_string())
                }
                Err(e) => {
                    log::error!(
                        "(process_message) id={} falló en '{}': {}",
                        message.id,
                        channel,
                        e
                    );
                    any_failed = true;
                    (MessageStatus::Failed, e.to_log())
                }
            };

            let status = match self.status_mode {
                StatusMode::Last => outcome,
                StatusMode::Aggregate if any_failed => MessageStatus::Failed,
                StatusMode::Aggregate => outcome,
            };
            if let Err(e) = self
                .message_service
                .update_status(message.id, status, &log_payload)
                .await
            {
                log::warn!(
                    "(process_message) No se guardó el estado id={} canal='{}': {:#}",
                    message.id,
                    channel,
                    e
                );
            }
            self.beat("process_message").await;
        }
    }

    /// El heartbeat es solo señal de vida: si falla se avisa y se sigue.
    async fn beat(&self, origin: &str) {
        if let Err(e) = self.heartbeat.touch().await {
            log::warn!("({}) Heartbeat no actualizado: {:#}", origin, e);
        }
    }
}
