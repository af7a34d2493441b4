//! handlers/message_handler.rs
use actix_web::{web, HttpResponse};

use crate::models::message_model::{EnqueueMessageRequest, MessageListQuery};
use crate::services::message_service::MessageService;

/// GET /api/messages?status=pending
pub async fn list_messages_endpoint(
    message_service: web::Data<MessageService>,
    query: web::Query<MessageListQuery>,
) -> HttpResponse {
    match message_service.list(query.status).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "Internal server error",
            "details": format!("{:?}", e)
        })),
    }
}

/// POST /api/messages
pub async fn enqueue_message_endpoint(
    message_service: web::Data<MessageService>,
    body: web::Json<EnqueueMessageRequest>,
) -> HttpResponse {
    match message_service.enqueue(body.into_inner()).await {
        Ok(msg) => HttpResponse::Ok().json(msg),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "Internal server error",
            "details": format!("{:?}", e)
        })),
    }
}
