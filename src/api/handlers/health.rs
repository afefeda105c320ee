// src/api/handlers/health.rs
use actix_web::{web, HttpResponse, Result};
use serde_json::json;
use crate::api::AppState;

pub const LIVENESS_MESSAGE: &str = "Mukku Compiler Backend is running.";

pub async fn home() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain; charset=utf-8").body(LIVENESS_MESSAGE)
}

pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let status = if state.toolchain.is_ready() { "healthy" } else { "degraded" };

    Ok(HttpResponse::Ok().json(json!({
        "status": status,
        "service": "mukku-compile-api",
        "version": env!("CARGO_PKG_VERSION"),
        "started_at": state.started_at.to_rfc3339(),
        "toolchain": state.toolchain.as_ref(),
    })))
}
