//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    infrastructure::dto::http::{HealthDto, MessageDto},
    ui::state::AppState,
    usecase::FetchHistoryUseCase,
};

/// Root endpoint, doubles as a health check
pub async fn root() -> Json<HealthDto> {
    tracing::debug!("Health check endpoint called");
    Json(HealthDto {
        status: "ok".to_string(),
        message: Some("Hiroba API is running".to_string()),
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
        message: None,
    })
}

/// Get message history, oldest first
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MessageDto>>, StatusCode> {
    let usecase = FetchHistoryUseCase::new(state.repository.clone());

    match usecase.execute().await {
        Ok(messages) => Ok(Json(messages.iter().map(MessageDto::from).collect())),
        Err(e) => {
            tracing::error!("Failed to fetch message history: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
