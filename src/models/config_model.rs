use std::fmt;

use serde::{Deserialize, Serialize};

/// Claves conocidas de la tabla `configs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigType {
    Worker,
    TelegramBot,
    TradingViewScreenshot,
    TradingViewCredentials,
}

impl ConfigType {
    pub const ALL: [ConfigType; 4] = [
        ConfigType::Worker,
        ConfigType::TelegramBot,
        ConfigType::TradingViewScreenshot,
        ConfigType::TradingViewCredentials,
    ];

    /// Inverso de `as_str`; claves desconocidas dan `None`.
    pub fn from_key(key: &str) -> Option<ConfigType> {
        Self::ALL.into_iter().find(|t| t.as_str() == key)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigType::Worker => "worker",
            ConfigType::TelegramBot => "telegram:bot",
            ConfigType::TradingViewScreenshot => "tradingview:screenshot",
            ConfigType::TradingViewCredentials => "tradingview:credentials",
        }
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fila de `configs`. `config_type` es texto libre: el endpoint admin no valida.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConfigRecord {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub config_type: String,
    pub data: String,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Body de POST /api/configs
#[derive(Debug, Clone, Deserialize)]
pub struct CreateConfigRequest {
    #[serde(rename = "type")]
    pub config_type: String,
    pub data: String,
    pub enabled: Option<bool>,
}

/// Body de PUT /api/configs/{type}/enabled
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleConfigRequest {
    pub enabled: bool,
}

/// Usuario y contraseña del sitio de gráficos (`email:password`).
#[derive(Clone, PartialEq, Eq)]
pub struct SiteCredentials {
    pub email: String,
    pub password: String,
}

impl SiteCredentials {
    /// Separa por ':' y toma solo los dos primeros trozos; una contraseña
    /// con ':' queda truncada.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(':');
        let email = parts.next()?.trim();
        let password = parts.next()?;
        if email.is_empty() || password.is_empty() {
            return None;
        }
        Some(SiteCredentials {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for SiteCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}
