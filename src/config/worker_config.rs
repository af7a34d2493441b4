//! config/worker_config.rs
//! Configuración global del worker, con valores por defecto.
//! Se lee de variables de entorno (o de un .env cargado por dotenv).

use std::{env, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

/// Imagen que se envía cuando la captura del gráfico falla
pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str =
    "https://s3.tradingview.com/userpics/6171439-Hlns_big.png";

/// Cómo se calcula el `status` final de un mensaje con varios canales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusMode {
    /// Solo cuenta el resultado del último canal procesado
    Last,
    /// `failed` si cualquier canal del mensaje falló
    Aggregate,
}

impl FromStr for StatusMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last" => Ok(StatusMode::Last),
            "aggregate" => Ok(StatusMode::Aggregate),
            other => Err(format!("STATUS_MODE desconocido: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub database_path: String,
    pub admin_bind: String,
    pub poll_interval_ms: u64,
    pub browser_headless: bool,
    pub chrome_path: Option<String>,
    pub wait_timeout_secs: u64,
    pub placeholder_image_url: String,
    pub telegram_api_url: String,
    pub status_mode: StatusMode,
    pub chart_base_url: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            database_path: "./data/notifier.db".to_string(),
            admin_bind: "0.0.0.0:5022".to_string(),
            poll_interval_ms: 1000,
            browser_headless: true,
            chrome_path: None,
            wait_timeout_secs: 30,
            placeholder_image_url: DEFAULT_PLACEHOLDER_IMAGE_URL.to_string(),
            telegram_api_url: "https://api.telegram.org".to_string(),
            status_mode: StatusMode::Last,
            chart_base_url: "https://www.tradingview.com".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Construye la configuración desde el entorno; lo que falte o no se
    /// pueda parsear queda con el valor por defecto.
    pub fn from_env() -> Self {
        let defaults = WorkerConfig::default();
        WorkerConfig {
            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            admin_bind: env::var("ADMIN_BIND").unwrap_or(defaults.admin_bind),
            poll_interval_ms: parse_var("POLL_INTERVAL_MS", defaults.poll_interval_ms),
            browser_headless: parse_var("BROWSER_HEADLESS", defaults.browser_headless),
            chrome_path: env::var("CHROME_PATH").ok().filter(|p| !p.is_empty()),
            wait_timeout_secs: parse_var("WAIT_TIMEOUT_SECS", defaults.wait_timeout_secs),
            placeholder_image_url: env::var("PLACEHOLDER_IMAGE_URL")
                .unwrap_or(defaults.placeholder_image_url),
            telegram_api_url: env::var("TELEGRAM_API_URL").unwrap_or(defaults.telegram_api_url),
            status_mode: parse_var("STATUS_MODE", defaults.status_mode),
            chart_base_url: env::var("CHART_BASE_URL").unwrap_or(defaults.chart_base_url),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                log::warn!("(WorkerConfig) Valor inválido para {}='{}', usando default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}
