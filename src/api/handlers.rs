//! HTTP request handlers

use super::assets::serve_static;
use super::types::{ChatRequest, ChatResponse, ErrorResponse};
use super::AppState;
use crate::dispatch::DispatchError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::Instrument;
use uuid::Uuid;

const GENERIC_FAILURE: &str = "An error occurred while processing your request.";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/version", get(get_version))
        // Everything else is a static asset
        .fallback(serve_static)
        .with_state(state)
}

// ============================================================
// Chat
// ============================================================

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let turn = req
        .into_turn()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let span = tracing::info_span!(
        "chat",
        request_id = %Uuid::new_v4(),
        history_len = turn.prior.len() + 1,
    );

    let result = state
        .dispatcher
        .run(turn.prior, turn.user_text)
        .instrument(span.clone())
        .await;

    match result {
        Ok(message) => Ok(Json(ChatResponse { message })),
        Err(e) => {
            span.in_scope(|| tracing::error!(error = %e, "Error in /chat endpoint"));
            Err(e.into())
        }
    }
}

async fn get_version() -> &'static str {
    concat!("chat-relay ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Internal(String),
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::UnknownTool(_) => AppError::Internal(e.to_string()),
            // Provider details stay in the logs
            DispatchError::Provider(_) => AppError::Internal(GENERIC_FAILURE.to_string()),
        }
    }
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
