// src/api/handlers/compile.rs
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use crate::api::AppState;
use crate::classifier::classify;
use crate::compiler;
use crate::errors::ServiceError;
use crate::models::{ClassifiedResponse, CompileRequest};
use crate::toolchain::ToolchainStatus;

pub async fn compile(
    state: web::Data<AppState>,
    req: web::Json<CompileRequest>,
) -> Result<HttpResponse> {
    let request = req.into_inner();
    let response = compiler::compile_source(&state, &request.code).await;
    Ok(respond(&response))
}

/// Turns an unreadable request body into the same JSON shape as every other
/// failure instead of actix's plain-text default.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::warn!("Rejected compile body: {}", err);

    let outcome = Err(ServiceError::InvalidRequest(err.to_string()));
    let response = match req.app_data::<web::Data<AppState>>() {
        Some(state) => classify(&outcome, &state.toolchain),
        None => classify(&outcome, &ToolchainStatus::Present),
    };

    InternalError::from_response(err, respond(&response)).into()
}

fn respond(response: &ClassifiedResponse) -> HttpResponse {
    let status = StatusCode::from_u16(response.http_status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(response)
}
