//! Vehicle catalogue pass-through.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::http::error::ApiResult;
use crate::http::server::AppState;

pub async fn list_makes(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let makes = state.provider.vehicle_makes().await?;
    Ok(Json(makes))
}

pub async fn list_models(
    State(state): State<AppState>,
    Path(make_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let models = state.provider.vehicle_models(&make_id).await?;
    Ok(Json(models))
}
