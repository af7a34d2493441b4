//! handlers/config_handler.rs
use actix_web::{web, HttpResponse};

use crate::models::config_model::{ConfigType, CreateConfigRequest, ToggleConfigRequest};
use crate::services::config_service::ConfigService;

fn internal_error(e: anyhow::Error) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": "Internal server error",
        "details": format!("{:?}", e)
    }))
}

/// GET /api/configs
pub async fn list_configs_endpoint(config_service: web::Data<ConfigService>) -> HttpResponse {
    match config_service.list().await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => internal_error(e),
    }
}

/// POST /api/configs
/// Crea la fila y devuelve la lista completa
pub async fn create_config_endpoint(
    config_service: web::Data<ConfigService>,
    body: web::Json<CreateConfigRequest>,
) -> HttpResponse {
    if let Err(e) = config_service.create(body.into_inner()).await {
        return internal_error(e);
    }
    match config_service.list().await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => internal_error(e),
    }
}

/// PUT /api/configs/{type}/enabled
/// Activa o desactiva una config conocida (p. ej. pausar el bot)
pub async fn toggle_config_endpoint(
    config_service: web::Data<ConfigService>,
    path: web::Path<String>,
    body: web::Json<ToggleConfigRequest>,
) -> HttpResponse {
    let key = path.into_inner();
    let Some(config_type) = ConfigType::from_key(&key) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Tipo de config desconocido: {}", key)
        }));
    };

    match config_service.set_enabled(config_type, body.enabled).await {
        Ok(0) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("No existe la config '{}'", config_type)
        })),
        Ok(_) => {
            log::info!(
                "(toggle_config_endpoint) '{}' enabled={}",
                config_type,
                body.enabled
            );
            match config_service.get(config_type).await {
                Ok(Some(record)) => HttpResponse::Ok().json(record),
                Ok(None) => HttpResponse::NotFound().finish(),
                Err(e) => internal_error(e),
            }
        }
        Err(e) => internal_error(e),
    }
}
