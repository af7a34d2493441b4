//! services/auth_service.rs
//! Login opcional en el sitio de charts al arrancar. Nunca propaga errores:
//! si falla, el worker sigue sin sesión iniciada.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;

use crate::errors::WorkerError;
use crate::models::config_model::SiteCredentials;
use crate::services::browser_session::WebSession;

const SIGNIN_PATH: &str = "/accounts/signin/";
const EMAIL_TAB: &str = r#"button[name="Email"]"#;
const USERNAME_INPUT: &str = r#"input[name="id_username"]"#;
const PASSWORD_INPUT: &str = r#"input[name="id_password"]"#;
const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;
const ERROR_INDICATOR: &str = r#"[class*="error-"], .tv-form-error"#;
const LOCATION_SCRIPT: &str = "window.location.href";
const POLL_EVERY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub success: bool,
}

#[derive(Clone)]
pub struct AuthService {
    session: Arc<dyn WebSession>,
    base_url: String,
    wait_timeout: Duration,
}

impl AuthService {
    pub fn new(session: Arc<dyn WebSession>, base_url: &str, wait_timeout: Duration) -> Self {
        Self {
            session,
            base_url: base_url.trim_end_matches('/').to_string(),
            wait_timeout,
        }
    }

    /// `raw_credentials` es el `data` de la config (`email:password`).
    pub async fn authenticate(&self, raw_credentials: &str) -> AuthOutcome {
        match self.login(raw_credentials).await {
            Ok(()) => {
                log::info!("(authenticate) Sesión iniciada en el sitio de charts");
                AuthOutcome { success: true }
            }
            Err(e) => {
                log::error!("(authenticate) {}; se continúa sin login", e);
                AuthOutcome { success: false }
            }
        }
    }

    async fn login(&self, raw_credentials: &str) -> Result<(), WorkerError> {
        let creds = SiteCredentials::parse(raw_credentials).ok_or_else(|| {
            WorkerError::Authentication("credenciales mal formadas (email:password)".to_string())
        })?;
        log::info!("(authenticate) Iniciando login como {}", creds.email);

        self.fill_form(&creds)
            .await
            .map_err(|e| WorkerError::Authentication(format!("{:#}", e)))?;

        // Lo que llegue primero decide: salir del login o error en el form
        tokio::select! {
            left = self.wait_left_signin() => {
                left.map_err(|e| WorkerError::Authentication(format!("{:#}", e)))
            }
            err = self.session.wait_for(ERROR_INDICATOR, self.wait_timeout) => match err {
                Ok(()) => Err(WorkerError::Authentication(
                    "el sitio rechazó las credenciales".to_string(),
                )),
                Err(e) => Err(WorkerError::Authentication(format!("{:#}", e))),
            },
        }
    }

    async fn fill_form(&self, creds: &SiteCredentials) -> anyhow::Result<()> {
        let session = &self.session;
        session
            .goto(&format!("{}{}", self.base_url, SIGNIN_PATH))
            .await?;
        session.wait_for(EMAIL_TAB, self.wait_timeout).await?;
        session.click(EMAIL_TAB).await?;
        session.wait_for(USERNAME_INPUT, self.wait_timeout).await?;
        session.type_text(USERNAME_INPUT, &creds.email).await?;
        session.type_text(PASSWORD_INPUT, &creds.password).await?;
        session.click(SUBMIT_BUTTON).await?;
        Ok(())
    }

    /// El form envía por XHR: la página de login ya está cargada, así que
    /// solo cuenta como éxito que la URL deje de ser la de login.
    async fn wait_left_signin(&self) -> anyhow::Result<()> {
        let start = Instant::now();
        loop {
            let location = self.session.evaluate(LOCATION_SCRIPT).await?;
            if let Some(url) = location.as_str() {
                if !url.contains(SIGNIN_PATH) {
                    log::debug!("(authenticate) Redirigido a {}", url);
                    return Ok(());
                }
            }
            if start.elapsed() >= self.wait_timeout {
                return Err(anyhow!(
                    "Timeout ({:?}) esperando salir de {}",
                    self.wait_timeout,
                    SIGNIN_PATH
                ));
            }
            tokio::time::sleep(POLL_EVERY).await;
        }
    }
}
