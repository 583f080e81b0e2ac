//! HTTP request handlers

use super::types::{ChatRequest, ChatResponse, ErrorResponse, PredictRequest, StatusResponse};
use super::AppState;
use crate::advisory::{AdvisoryError, AdvisoryResult, FarmInput};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/predict", post(predict))
        .route("/chat", post(chat))
        .route("/version", get(get_version))
        .with_state(state)
}

async fn home() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "AgroSmart Intelligence API is active.",
    })
}

async fn get_version() -> &'static str {
    concat!("agrosmart ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Crop Advisory
// ============================================================

async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<AdvisoryResult>, AppError> {
    let input: FarmInput = req.into();
    let result = state.advisory.advise(&input).await?;
    Ok(Json(result))
}

// ============================================================
// Chat
// ============================================================

async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Json<ChatResponse> {
    let outcome = state.chat.handle_message(&req.user_id, &req.message).await;
    tracing::debug!(user_id = %req.user_id, state = ?outcome.state, "Chat reply sent");
    Json(ChatResponse {
        reply: outcome.reply,
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    WeatherUnavailable,
    Internal,
}

impl From<AdvisoryError> for AppError {
    fn from(e: AdvisoryError) -> Self {
        match e {
            AdvisoryError::WeatherUnavailable { ref city, ref source } => {
                tracing::warn!(city = %city, error = %source, "Weather unavailable");
                AppError::WeatherUnavailable
            }
            AdvisoryError::Classifier(ref source) => {
                tracing::error!(error = %source, "Advisory pipeline internal error");
                AppError::Internal
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::WeatherUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "Weather data unavailable.")
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error."),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
