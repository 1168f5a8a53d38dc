//! API route handlers

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use crate::domain::{DrugCategory, ForecastResult, ModelInfo};
use crate::error::AppError;
use crate::forecast::ForecastRequest;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.is_validation() {
            tracing::warn!(error = %self, "rejected request");
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %self, kind = ?self.kind(), "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            status,
            Json(ErrorResponse {
                error: self.message().to_string(),
            }),
        )
            .into_response()
    }
}

pub async fn drug_types(State(state): State<AppState>) -> Json<Vec<DrugCategory>> {
    Json(state.service.drug_types().to_vec())
}

pub async fn model_info(State(state): State<AppState>) -> Result<Json<ModelInfo>, AppError> {
    state.service.model_info().map(Json)
}

/// The body is taken raw so malformed JSON gets the same `{error}` shape as
/// every other client error.
pub async fn forecast(State(state): State<AppState>, body: Bytes) -> Result<Json<ForecastResult>, AppError> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|_| AppError::validation("Request body must be a JSON object"))?;
    tracing::info!(body = %value, "received prediction request");

    let req = ForecastRequest::from_json(&value)?;
    state.service.forecast(&req).map(Json)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
