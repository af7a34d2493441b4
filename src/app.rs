//! app.rs
use crate::handlers::{config_handler, message_handler};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/configs")
                    .route("", web::get().to(config_handler::list_configs_endpoint))
                    .route("", web::post().to(config_handler::create_config_endpoint))
                    .route(
                        "/{config_type}/enabled",
                        web::put().to(config_handler::toggle_config_endpoint),
                    ),
            )
            .service(
                web::scope("/messages")
                    .route("", web::get().to(message_handler::list_messages_endpoint))
                    .route(
                        "",
                        web::post().to(message_handler::enqueue_message_endpoint),
                    ),
            ),
    );
}
