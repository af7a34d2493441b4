//! services/browser_session.rs
//! Sesión de navegador automatizado. El capturador y el login trabajan contra
//! el trait `WebSession`; `ChromeSession` es la implementación real sobre
//! chromiumoxide.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::Page;
use futures_util::StreamExt;
use std::{
    fs,
    path::PathBuf,
    time::{Duration, Instant},
};
use tokio::{task::JoinHandle, time::sleep};
use uuid::Uuid;

/// Cada cuánto se vuelve a consultar el DOM mientras se espera un selector
const POLL_EVERY: Duration = Duration::from_millis(250);
/// Prefijo del perfil temporal de Chrome
const PROFILE_DIR_PREFIX: &str = "chart_notifier_chrome";
/// Binarios que se buscan en PATH si no se indica CHROME_PATH
const CHROME_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

#[async_trait]
pub trait WebSession: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    /// Espera a que exista `selector`; error si pasa `timeout`
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Click sobre el elemento número `index` de los que casan con `selector`
    async fn click_nth(&self, selector: &str, index: usize) -> Result<()>;

    async fn type_text(&self, selector: &str, text: &str) -> Result<()>;

    /// Texto visible de todos los elementos que casan con `selector`
    async fn texts(&self, selector: &str) -> Result<Vec<String>>;

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>>;

    /// Propiedad `value` de un input
    async fn value(&self, selector: &str) -> Result<Option<String>>;

    /// Evalúa `script` en la página y devuelve su valor como JSON
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;
}

pub struct ChromeOptions {
    pub headless: bool,
    pub chrome_path: Option<String>,
}

pub struct ChromeSession {
    _browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    dialog_task: JoinHandle<()>,
    profile_dir: PathBuf,
}

impl ChromeSession {
    /// Lanza Chrome con modo stealth y acepta automáticamente cualquier diálogo
    /// nativo (confirm, "salir de la página", etc.).
    pub async fn launch(opts: ChromeOptions) -> Result<Self> {
        let profile_dir =
            std::env::temp_dir().join(format!("{}_{}", PROFILE_DIR_PREFIX, Uuid::new_v4()));
        fs::create_dir_all(&profile_dir)
            .with_context(|| format!("No se pudo crear perfil de Chrome en {:?}", profile_dir))?;

        let chrome_path = match opts.chrome_path {
            Some(p) => PathBuf::from(p),
            None => find_chrome()?,
        };
        log::info!("(ChromeSession::launch) Usando Chrome en {:?}", chrome_path);

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .user_data_dir(&profile_dir)
            .window_size(1440, 900)
            .args(vec![
                "--no-sandbox",
                "--disable-setuid-sandbox",
                "--disable-gpu",
                "--disable-dev-shm-usage",
                "--no-first-run",
                "--no-default-browser-check",
                "--disable-blink-features=AutomationControlled",
                "--disable-popup-blocking",
                "--disable-translate",
            ]);
        if !opts.headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| anyhow!("BrowserConfig inválido: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("No se pudo lanzar Chrome")?;

        // Los eventos CDP se procesan en su propia tarea
        let handler_task = tokio::spawn(async move {
            while let Some(evt) = handler.next().await {
                if evt.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("No se pudo abrir la pestaña")?;
        page.enable_stealth_mode()
            .await
            .context("No se pudo activar stealth mode")?;

        let mut dialogs = page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .context("No se pudo escuchar diálogos")?;
        let dialog_page = page.clone();
        let dialog_task = tokio::spawn(async move {
            while let Some(evt) = dialogs.next().await {
                log::debug!("(ChromeSession) Aceptando diálogo: {}", evt.message);
                if let Err(e) = dialog_page
                    .execute(HandleJavaScriptDialogParams::new(true))
                    .await
                {
                    log::warn!("(ChromeSession) No se pudo aceptar el diálogo: {:?}", e);
                }
            }
        });

        Ok(Self {
            _browser: browser,
            page,
            handler_task,
            dialog_task,
            profile_dir,
        })
    }
}

fn find_chrome() -> Result<PathBuf> {
    CHROME_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| anyhow!("No se encontró Chrome/Chromium en el sistema"))
}

#[async_trait]
impl WebSession for ChromeSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("Fallo navegando a {}", url))?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(anyhow!(
                    "Timeout ({:?}) esperando selector '{}'",
                    timeout,
                    selector
                ));
            }
            sleep(POLL_EVERY).await;
        }
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .with_context(|| format!("No existe '{}'", selector))?
            .click()
            .await
            .with_context(|| format!("Fallo el click en '{}'", selector))?;
        Ok(())
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<()> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .with_context(|| format!("No existe '{}'", selector))?;
        let element = elements
            .get(index)
            .ok_or_else(|| anyhow!("'{}' no tiene elemento #{}", selector, index))?;
        element
            .click()
            .await
            .with_context(|| format!("Fallo el click en '{}'[{}]", selector, index))?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .with_context(|| format!("No existe '{}'", selector))?
            .click()
            .await?
            .type_str(text)
            .await
            .with_context(|| format!("Fallo escribiendo en '{}'", selector))?;
        Ok(())
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>> {
        let elements = self.page.find_elements(selector).await.unwrap_or_default();
        let mut out = Vec::with_capacity(elements.len());
        for el in elements {
            out.push(el.inner_text().await?.unwrap_or_default().trim().to_string());
        }
        Ok(out)
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let el = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("No existe '{}'", selector))?;
        Ok(el.attribute(name).await?)
    }

    async fn value(&self, selector: &str) -> Result<Option<String>> {
        let el = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("No existe '{}'", selector))?;
        let value = el.property("value").await?;
        Ok(value.and_then(|v| v.as_str().map(|s| s.to_string())))
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("Fallo evaluando script")?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }
}

/// Corta las tareas de eventos y borra el perfil temporal al salir de scope
impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.dialog_task.abort();
        self.handler_task.abort();
        let _ = fs::remove_dir_all(&self.profile_dir);
    }
}
