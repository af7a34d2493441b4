use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::errors::WorkerError;

/// Proveedor de mensajería. Devuelve la respuesta del proveedor tal cual.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_photo(
        &self,
        token: &str,
        channel: &str,
        image_url: &str,
        caption: &str,
    ) -> Result<Value, WorkerError>;

    async fn send_message(&self, token: &str, channel: &str, text: &str)
        -> Result<Value, WorkerError>;
}

/// Cliente de la Bot API de Telegram
#[derive(Clone)]
pub struct TelegramService {
    http_client: Client,
    api_url: String,
}

impl TelegramService {
    pub fn new(api_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    async fn call(&self, token: &str, method: &str, payload: Value) -> Result<Value, WorkerError> {
        let url = format!("{}/bot{}/{}", self.api_url, token, method);

        let resp = self
            .http_client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| WorkerError::Dispatch(format!("{} sin respuesta: {}", method, e)))?;

        let status = resp.status();
        let body: Value = resp.json().await.map_err(|e| {
            WorkerError::Dispatch(format!(
                "{} respuesta ilegible ({}): {}",
                method, status, e
            ))
        })?;

        let ok = body.get("ok").and_then(|v| v.as_bool()).unwrap_or(false);
        if !status.is_success() || !ok {
            let description = body
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or("sin descripción");
            log::error!("({}) Telegram respondió {}: {}", method, status, description);
            return Err(WorkerError::Dispatch(format!(
                "{} ({}): {}",
                method, status, description
            )));
        }

        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl Messenger for TelegramService {
    async fn send_photo(
        &self,
        token: &str,
        channel: &str,
        image_url: &str,
        caption: &str,
    ) -> Result<Value, WorkerError> {
        log::info!("(send_photo) -> chat_id='{}', photo='{}'", channel, image_url);
        let payload = json!({
            "chat_id": channel,
            "photo": image_url,
            "caption": caption
        });
        self.call(token, "sendPhoto", payload).await
    }

    async fn send_message(
        &self,
        token: &str,
        channel: &str,
        text: &str,
    ) -> Result<Value, WorkerError> {
        log::info!("(send_message) -> chat_id='{}'", channel);
        let payload = json!({
            "chat_id": channel,
            "text": text
        });
        self.call(token, "sendMessage", payload).await
    }
}
