use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tokio_util::sync::CancellationToken;

use crate::config::worker_config::WorkerConfig;
use crate::logger::init_logger;
use crate::models::config_model::ConfigType;
use crate::services::auth_service::AuthService;
use crate::services::browser_session::{ChromeOptions, ChromeSession, WebSession};
use crate::services::config_service::ConfigService;
use crate::services::dispatch_service::DispatchService;
use crate::services::heartbeat_service::HeartbeatService;
use crate::services::message_service::MessageService;
use crate::services::screenshot_service::ScreenshotService;
use crate::services::telegram_service::TelegramService;

mod app;
mod config;
mod errors;
mod handlers;
mod logger;
mod models;
mod services;
mod worker;

#[cfg(test)]
mod tests;

async fn setup_database(db_path: &str) -> Pool<Sqlite> {
    // Crear carpeta del archivo si no existe
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        std::fs::create_dir_all(parent).expect("No se pudo crear el directorio de la base");
    }

    log::info!("Conectando a SQLite en {}", db_path);

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("No se pudo conectar a la base de datos SQLite.")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let cfg = WorkerConfig::from_env();
    log::info!("Configuración: {:?}", cfg);

    let db_pool = setup_database(&cfg.database_path).await;

    // Esquema + configs por defecto
    let config_service = ConfigService::new(db_pool.clone());
    if let Err(e) = config_service.run_migrations().await {
        panic!("Fallo en migraciones: {:?}", e);
    }
    if let Err(e) = config_service.seed_defaults().await {
        panic!("Fallo creando configs por defecto: {:?}", e);
    }
    let message_service = MessageService::new(db_pool.clone());

    let heartbeat = HeartbeatService::new(config_service.clone());
    if let Err(e) = heartbeat.init().await {
        panic!("No se pudo inicializar el heartbeat: {:?}", e);
    }

    // Navegador
    let session: Arc<dyn WebSession> = Arc::new(
        ChromeSession::launch(ChromeOptions {
            headless: cfg.browser_headless,
            chrome_path: cfg.chrome_path.clone(),
        })
        .await
        .expect("No se pudo iniciar el navegador"),
    );

    // Login opcional; nunca corta el arranque
    let auth = AuthService::new(session.clone(), &cfg.chart_base_url, cfg.wait_timeout());
    match config_service.get(ConfigType::TradingViewCredentials).await {
        Ok(Some(creds)) if creds.enabled => {
            let outcome = auth.authenticate(&creds.data).await;
            log::info!("Login en el sitio de charts: success={}", outcome.success);
        }
        Ok(_) => log::info!("Login deshabilitado, se sigue sin sesión"),
        Err(e) => log::error!("No se pudieron leer credenciales: {:?}", e),
    }

    let dispatcher = DispatchService::new(
        config_service.clone(),
        message_service.clone(),
        heartbeat,
        Arc::new(ScreenshotService::new(
            session.clone(),
            &cfg.chart_base_url,
            cfg.wait_timeout(),
        )),
        Arc::new(TelegramService::new(&cfg.telegram_api_url)),
        cfg.placeholder_image_url.clone(),
        cfg.status_mode,
    );

    let shutdown = CancellationToken::new();
    let worker_handle = tokio::spawn(worker::run_worker(
        dispatcher,
        cfg.poll_interval(),
        shutdown.clone(),
    ));

    // Endpoint administrativo
    log::info!("Levantando servidor admin en {}", cfg.admin_bind);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config_service.clone()))
            .app_data(web::Data::new(message_service.clone()))
            .configure(app::init_app)
    })
    .workers(1)
    .bind(&cfg.admin_bind)?
    .run()
    .await;

    // El servidor terminó (Ctrl+C): parar el worker
    shutdown.cancel();
    let _ = worker_handle.await;
    server
}
