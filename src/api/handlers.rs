//! HTTP request handlers

use super::types::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse};
use super::AppState;
use crate::resolver::resolve;
use crate::transport::CHAT_PATH;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;

const INVALID_REQUEST: &str = "Invalid request format";
const INTERNAL_ERROR: &str = "Internal server error";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Canned reply for the last message of a transcript
        .route(CHAT_PATH, post(chat))
        .route("/api/health", get(health))
        .route("/version", get(get_version))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

// ============================================================
// Chat
// ============================================================

/// Resolve the last message after the configured delay.
///
/// The body is parsed by hand so every malformed payload gets the same
/// `{ "error": ... }` shape instead of axum's plain-text rejections.
async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Json<ChatResponse>, AppError> {
    let request: ChatRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected malformed chat request");
        AppError::BadRequest(INVALID_REQUEST.to_string())
    })?;

    // Applied regardless of match outcome
    tokio::time::sleep(state.reply_delay).await;

    let response = resolve(request.utterance(), &state.knowledge_base, &state.fallback);
    tracing::debug!(messages = request.messages.len(), "Resolved chat request");

    Ok(Json(ChatResponse { response }))
}

// ============================================================
// Health & Version
// ============================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        entries: state.knowledge_base.len(),
    })
}

async fn get_version() -> &'static str {
    concat!("support-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[allow(clippy::needless_pass_by_value)] // signature required by CatchPanicLayer
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(error = %detail, "Handler panicked");
    AppError::Internal(INTERNAL_ERROR.to_string()).into_response()
}

enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
