//! services/screenshot_service.rs
//! Captura de gráficos en el sitio de charts: página del símbolo -> chart ->
//! timeframe -> snapshot -> URL pública de la imagen.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::errors::WorkerError;
use crate::models::message_model::ChartRequest;
use crate::services::browser_session::WebSession;

/// Lo que el dispatcher necesita del capturador
#[async_trait]
pub trait ChartCapture: Send + Sync {
    async fn acquire(&self, req: &ChartRequest) -> Result<String, WorkerError>;
}

/// Selectores del sitio de charts
#[derive(Debug, Clone)]
pub struct ChartSelectors {
    pub chart_link: &'static str,
    pub timeframe_menu: &'static str,
    pub timeframe_options: &'static str,
    pub loading_indicator: &'static str,
    pub snapshot_button: &'static str,
    pub snapshot_url_input: &'static str,
}

impl Default for ChartSelectors {
    fn default() -> Self {
        ChartSelectors {
            chart_link: r#"a[href*="/chart/?symbol="]"#,
            timeframe_menu: r#"#header-toolbar-intervals button"#,
            timeframe_options: r#"[data-role="menuitem"] [class*="label"]"#,
            loading_indicator: r#".chart-loading-screen"#,
            snapshot_button: r#"#header-toolbar-screenshot"#,
            snapshot_url_input: r#"input[value*="/x/"]"#,
        }
    }
}

#[derive(Clone)]
pub struct ScreenshotService {
    session: Arc<dyn WebSession>,
    base_url: String,
    selectors: ChartSelectors,
    wait_timeout: Duration,
}

impl ScreenshotService {
    pub fn new(session: Arc<dyn WebSession>, base_url: &str, wait_timeout: Duration) -> Self {
        Self {
            session,
            base_url: base_url.trim_end_matches('/').to_string(),
            selectors: ChartSelectors::default(),
            wait_timeout,
        }
    }

    /// URL de la página del símbolo. Con exchange va como query param.
    pub fn symbol_page_url(&self, req: &ChartRequest) -> String {
        match req.exchange_and_ticker() {
            (Some(exchange), ticker) => format!(
                "{}/symbols/{}/?exchange={}",
                self.base_url,
                urlencoding::encode(ticker),
                urlencoding::encode(exchange)
            ),
            (None, ticker) => format!("{}/symbols/{}/", self.base_url, urlencoding::encode(ticker)),
        }
    }

    async fn capture(&self, req: &ChartRequest) -> anyhow::Result<String> {
        let sel = &self.selectors;
        let session = &self.session;

        // 1) Página del símbolo -> link al chart
        let page_url = self.symbol_page_url(req);
        log::debug!("(acquire_screenshot) Navegando a {}", page_url);
        session.goto(&page_url).await?;
        session.wait_for(sel.chart_link, self.wait_timeout).await?;
        let href = session
            .attribute(sel.chart_link, "href")
            .await?
            .ok_or_else(|| anyhow::anyhow!("El link al chart no tiene href"))?;
        let chart_url = self.absolute(&href);

        // 2) Chart -> menú de timeframes
        log::debug!("(acquire_screenshot) Abriendo chart {}", chart_url);
        session.goto(&chart_url).await?;
        session.wait_for(sel.timeframe_menu, self.wait_timeout).await?;
        session.click(sel.timeframe_menu).await?;
        session
            .wait_for(sel.timeframe_options, self.wait_timeout)
            .await?;

        // Si ninguna opción coincide exactamente no se hace click
        let options = session.texts(sel.timeframe_options).await?;
        match options.iter().position(|o| o == &req.timeframe) {
            Some(idx) => session.click_nth(sel.timeframe_options, idx).await?,
            None => log::warn!(
                "(acquire_screenshot) Timeframe '{}' no está entre {:?}; se deja el actual",
                req.timeframe,
                options
            ),
        }

        // 3) Render + snapshot
        session
            .wait_for(sel.loading_indicator, self.wait_timeout)
            .await?;
        session.click(sel.snapshot_button).await?;
        session
            .wait_for(sel.snapshot_url_input, self.wait_timeout)
            .await?;
        let image_url = session
            .value(sel.snapshot_url_input)
            .await?
            .filter(|v| v.starts_with("http"))
            .ok_or_else(|| anyhow::anyhow!("El snapshot no devolvió una URL"))?;

        Ok(image_url)
    }

    fn absolute(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else {
            format!("{}/{}", self.base_url, href.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl ChartCapture for ScreenshotService {
    /// Todo o nada: cualquier fallo de navegación o espera es `ScreenshotError`.
    /// Siempre arranca desde la página del símbolo, no reutiliza estado del chart.
    async fn acquire(&self, req: &ChartRequest) -> Result<String, WorkerError> {
        let start = Instant::now();
        let url = self
            .capture(req)
            .await
            .map_err(|e| WorkerError::Screenshot(format!("{:#}", e)))?;

        log::info!(
            "(acquire_screenshot) {} [{}] capturado en {:.2}s -> {}",
            req.symbol,
            req.timeframe,
            start.elapsed().as_secs_f32(),
            url
        );
        Ok(url)
    }
}
