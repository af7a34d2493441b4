use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Success,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Success => "success",
            MessageStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fila de la tabla `messages`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QueueMessage {
    pub id: i64,
    pub data: String,
    pub timeframe: Option<String>,
    pub channels: String,
    pub status: String, // "pending", "success", "failed"
    pub log: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl QueueMessage {
    /// Primer token del payload: `EXCHANGE:TICKER` o ticker suelto
    pub fn symbol(&self) -> &str {
        self.data.split_whitespace().next().unwrap_or("")
    }

    /// Resto del payload, usado como caption de la imagen
    pub fn caption(&self) -> &str {
        let trimmed = self.data.trim_start();
        match trimmed.find(char::is_whitespace) {
            Some(idx) => trimmed[idx..].trim(),
            None => "",
        }
    }

    /// Canales en el orden guardado; no se filtran vacíos ni duplicados.
    pub fn channel_list(&self) -> Vec<String> {
        self.channels.split(',').map(|c| c.to_string()).collect()
    }

    /// Timeframe propio del mensaje; ausente o vacío cae en `default`.
    pub fn timeframe_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.timeframe
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(default)
    }
}

/// Body de POST /api/messages
#[derive(Debug, Clone, Deserialize)]
pub struct EnqueueMessageRequest {
    pub data: String,
    pub timeframe: Option<String>,
    pub channels: String,
}

/// Query de GET /api/messages
#[derive(Debug, Clone, Deserialize)]
pub struct MessageListQuery {
    pub status: Option<MessageStatus>,
}

/// Lo que se le pide al capturador de gráficos
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub symbol: String,
    pub timeframe: String,
}

impl ChartRequest {
    /// Separa `EXCHANGE:TICKER`; sin ':' no hay exchange.
    pub fn exchange_and_ticker(&self) -> (Option<&str>, &str) {
        match self.symbol.split_once(':') {
            Some((exchange, ticker)) => (Some(exchange), ticker),
            None => (None, self.symbol.as_str()),
        }
    }
}
