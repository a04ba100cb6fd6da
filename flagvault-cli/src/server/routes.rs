use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flagvault_lib::{CreateFlagRequest, ErrorClass, FlagError, UpdateFlagValueRequest};

use super::state::AppState;

// ── Error mapping ────────────────────────────────────────────

fn status_for(class: ErrorClass) -> StatusCode {
    match class {
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::Conflict => StatusCode::CONFLICT,
        ErrorClass::BadRequest => StatusCode::BAD_REQUEST,
        ErrorClass::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({"error": message}))).into_response()
}

fn error_response(err: FlagError) -> Response {
    let status = status_for(err.class());
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    error_body(status, err.to_string())
}

fn bad_json(rejection: JsonRejection) -> Response {
    error_body(StatusCode::BAD_REQUEST, rejection.body_text())
}

// ── POST /v1/flags ───────────────────────────────────────────

pub async fn handle_create_flag(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateFlagRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(req) => req,
        Err(rejection) => return bad_json(rejection),
    };
    let ctx = state.request_context();
    match state.service.create_flag(&ctx, req).await {
        Ok(flag) => (StatusCode::CREATED, Json(flag)).into_response(),
        Err(e) => error_response(e),
    }
}

// ── GET /v1/flags/{name} ─────────────────────────────────────

pub async fn handle_get_flag(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    let ctx = state.request_context();
    match state.service.get_flag(&ctx, &name).await {
        Ok(flag) => Json(flag).into_response(),
        Err(e) => error_response(e),
    }
}

// ── GET /v1/flags/{name}/value ───────────────────────────────

pub async fn handle_get_flag_value(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    let ctx = state.request_context();
    match state.service.get_flag_value(&ctx, &name).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => error_response(e),
    }
}

// ── PUT /v1/flags/{name}/value ───────────────────────────────

pub async fn handle_update_flag_value(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Result<Json<UpdateFlagValueRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(req) => req,
        Err(rejection) => return bad_json(rejection),
    };
    let ctx = state.request_context();
    match state.service.update_flag_value(&ctx, &name, req).await {
        Ok(flag) => Json(flag).into_response(),
        Err(e) => error_response(e),
    }
}
