// src/api/routes.rs
use actix_web::web;
use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handlers::json_error_handler))
        .route("/", web::get().to(handlers::home))
        .route("/health", web::get().to(handlers::health_check))
        .route("/compile", web::post().to(handlers::compile));
}
