//! Estimation history endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::estimation::{summarize, EstimationRecord, HistorySummary};
use crate::http::error::{ApiError, ApiResult};
use crate::http::server::AppState;

pub const CLEARED_MESSAGE: &str = "All estimation records cleared successfully";

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
    pub removed: usize,
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<EstimationRecord>> {
    Json(state.history.list())
}

pub async fn summary(State(state): State<AppState>) -> Json<HistorySummary> {
    Json(summarize(&state.history.list()))
}

fn find(state: &AppState, id: &str) -> ApiResult<Json<EstimationRecord>> {
    state
        .history
        .get(id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Estimation with ID {} not found", id)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EstimationRecord>> {
    find(&state, &id)
}

/// `GET /history/clear` is a lookup of the record id `clear`.
pub async fn get_clear(State(state): State<AppState>) -> ApiResult<Json<EstimationRecord>> {
    find(&state, "clear")
}

pub async fn clear(State(state): State<AppState>) -> ApiResult<Json<ClearResponse>> {
    let removed = state.history.clear().await?;
    Ok(Json(ClearResponse {
        success: true,
        message: CLEARED_MESSAGE.to_string(),
        removed,
    }))
}
