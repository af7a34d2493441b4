//! tests/support.rs
//! Helpers compartidos por los tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use crate::config::worker_config::StatusMode;
use crate::errors::WorkerError;
use crate::models::message_model::{ChartRequest, EnqueueMessageRequest, QueueMessage};
use crate::services::browser_session::WebSession;
use crate::services::config_service::ConfigService;
use crate::services::dispatch_service::DispatchService;
use crate::services::heartbeat_service::HeartbeatService;
use crate::services::message_service::MessageService;
use crate::services::screenshot_service::ChartCapture;
use crate::services::telegram_service::Messenger;

pub const PLACEHOLDER: &str = "https://example.com/placeholder.png";
pub const CAPTURED: &str = "https://www.tradingview.com/x/abc123/";

// Una sola conexión: cada conexión a :memory: es una base distinta
pub async fn test_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("No se pudo abrir SQLite en memoria");
    ConfigService::new(pool.clone())
        .run_migrations()
        .await
        .expect("Fallo en migraciones");
    pool
}

/// Base con migraciones, configs por defecto y heartbeat
pub async fn seeded_services() -> (ConfigService, MessageService, HeartbeatService) {
    let pool = test_pool().await;
    let config_service = ConfigService::new(pool.clone());
    config_service.seed_defaults().await.expect("seed");
    let heartbeat = HeartbeatService::new(config_service.clone());
    heartbeat.init().await.expect("heartbeat");
    (config_service, MessageService::new(pool), heartbeat)
}

pub fn dispatcher(
    config_service: &ConfigService,
    message_service: &MessageService,
    heartbeat: &HeartbeatService,
    capture: Arc<FakeCapture>,
    messenger: Arc<FakeMessenger>,
    mode: StatusMode,
) -> DispatchService {
    DispatchService::new(
        config_service.clone(),
        message_service.clone(),
        heartbeat.clone(),
        capture,
        messenger,
        PLACEHOLDER.to_string(),
        mode,
    )
}

pub async fn enqueue(
    message_service: &MessageService,
    data: &str,
    timeframe: Option<&str>,
    channels: &str,
) -> QueueMessage {
    message_service
        .enqueue(EnqueueMessageRequest {
            data: data.to_string(),
            timeframe: timeframe.map(|t| t.to_string()),
            channels: channels.to_string(),
        })
        .await
        .expect("enqueue")
}

// ---------------------------------------------------------------------------
// Capturador falso
// ---------------------------------------------------------------------------
#[derive(Default)]
pub struct FakeCapture {
    pub fail: bool,
    pub requests: Mutex<Vec<ChartRequest>>,
}

impl FakeCapture {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<ChartRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChartCapture for FakeCapture {
    async fn acquire(&self, req: &ChartRequest) -> Result<String, WorkerError> {
        self.requests.lock().unwrap().push(req.clone());
        if self.fail {
            Err(WorkerError::Screenshot("timeout esperando el chart".to_string()))
        } else {
            Ok(CAPTURED.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Mensajería falsa
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Photo {
        channel: String,
        image_url: String,
        caption: String,
    },
    Text {
        channel: String,
        text: String,
    },
}

#[derive(Default)]
pub struct FakeMessenger {
    pub failing_channels: Vec<String>,
    pub sent: Mutex<Vec<Sent>>,
}

impl FakeMessenger {
    pub fn failing_on(channels: &[&str]) -> Self {
        Self {
            failing_channels: channels.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn reply(&self, channel: &str) -> Result<Value, WorkerError> {
        if self.failing_channels.iter().any(|c| c == channel) {
            return Err(WorkerError::Dispatch(format!("chat not found: {}", channel)));
        }
        let n = self.sent.lock().unwrap().len();
        Ok(json!({ "message_id": n, "chat": { "id": channel } }))
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn send_photo(
        &self,
        _token: &str,
        channel: &str,
        image_url: &str,
        caption: &str,
    ) -> Result<Value, WorkerError> {
        self.sent.lock().unwrap().push(Sent::Photo {
            channel: channel.to_string(),
            image_url: image_url.to_string(),
            caption: caption.to_string(),
        });
        self.reply(channel)
    }

    async fn send_message(
        &self,
        _token: &str,
        channel: &str,
        text: &str,
    ) -> Result<Value, WorkerError> {
        self.sent.lock().unwrap().push(Sent::Text {
            channel: channel.to_string(),
            text: text.to_string(),
        });
        self.reply(channel)
    }
}

// ---------------------------------------------------------------------------
// Sesión de navegador guionizada
// ---------------------------------------------------------------------------
/// Todo selector existe salvo los que contengan algún texto de `absent`;
/// esos agotan el timeout y fallan. La URL actual sigue al último `goto`,
/// o a `redirect_on_submit` tras un click en un botón submit.
#[derive(Default)]
pub struct ScriptedSession {
    pub absent: Vec<String>,
    pub option_texts: Vec<String>,
    pub chart_href: Option<String>,
    pub snapshot_value: Option<String>,
    pub redirect_on_submit: Option<String>,
    pub location: Mutex<String>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedSession {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn is_absent(&self, selector: &str) -> bool {
        self.absent.iter().any(|a| selector.contains(a.as_str()))
    }
}

#[async_trait]
impl WebSession for ScriptedSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.record(format!("goto:{}", url));
        *self.location.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.record(format!("wait:{}", selector));
        if self.is_absent(selector) {
            tokio::time::sleep(timeout).await;
            return Err(anyhow!("Timeout esperando selector '{}'", selector));
        }
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.record(format!("click:{}", selector));
        if selector.contains(r#"type="submit""#) {
            if let Some(target) = &self.redirect_on_submit {
                *self.location.lock().unwrap() = target.clone();
            }
        }
        Ok(())
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<()> {
        self.record(format!("click_nth:{}:{}", selector, index));
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        self.record(format!("type:{}:{}", selector, text));
        Ok(())
    }

    async fn texts(&self, _selector: &str) -> Result<Vec<String>> {
        Ok(self.option_texts.clone())
    }

    async fn attribute(&self, _selector: &str, _name: &str) -> Result<Option<String>> {
        Ok(self.chart_href.clone())
    }

    async fn value(&self, _selector: &str) -> Result<Option<String>> {
        Ok(self.snapshot_value.clone())
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        self.record(format!("eval:{}", script));
        Ok(Value::String(self.location.lock().unwrap().clone()))
    }
}
