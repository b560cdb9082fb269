//! Estimation endpoints.
//!
//! # Data Flow
//! ```text
//! JSON body → DTO (serde) → Validate → CarbonProvider → HistoryStore::save
//!     → 201 Created + CarbonEstimationResult
//! ```
//!
//! Invalid bodies never reach the provider. A result that cannot be saved is
//! reported as an internal error and not returned.

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

use crate::estimation::{
    CarbonEstimationResult, ElectricityInput, EmissionType, FlightInput, Validate, VehicleInput,
};
use crate::http::error::{ApiError, ApiResult};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::provider::ProviderResult;

type Created = (StatusCode, Json<CarbonEstimationResult>);

pub async fn estimate_electricity(
    State(state): State<AppState>,
    payload: Result<Json<ElectricityInput>, JsonRejection>,
) -> ApiResult<Created> {
    let input = accept(EmissionType::Electricity, payload)?;
    let result = state.provider.estimate_electricity(&input).await;
    finish(&state, EmissionType::Electricity, result).await
}

pub async fn estimate_vehicle(
    State(state): State<AppState>,
    payload: Result<Json<VehicleInput>, JsonRejection>,
) -> ApiResult<Created> {
    let input = accept(EmissionType::Vehicle, payload)?;
    let result = state.provider.estimate_vehicle(&input).await;
    finish(&state, EmissionType::Vehicle, result).await
}

pub async fn estimate_flight(
    State(state): State<AppState>,
    payload: Result<Json<FlightInput>, JsonRejection>,
) -> ApiResult<Created> {
    let input = accept(EmissionType::Flight, payload)?;
    let result = state.provider.estimate_flight(&input).await;
    finish(&state, EmissionType::Flight, result).await
}

fn accept<I: Validate>(
    kind: EmissionType,
    payload: Result<Json<I>, JsonRejection>,
) -> ApiResult<I> {
    let checked = payload
        .map_err(ApiError::from)
        .and_then(|Json(input)| input.validate().map(|()| input).map_err(ApiError::from));

    if let Err(err) = &checked {
        tracing::debug!(emission_type = %kind, error = %err.message(), "Rejected estimation request");
        metrics::record_estimate(kind.as_str(), metrics::OUTCOME_INVALID);
    }
    checked
}

async fn finish(
    state: &AppState,
    kind: EmissionType,
    result: ProviderResult<CarbonEstimationResult>,
) -> ApiResult<Created> {
    let estimation = result.map_err(|e| {
        tracing::warn!(emission_type = %kind, error = %e, "Estimation failed");
        metrics::record_estimate(kind.as_str(), metrics::OUTCOME_UPSTREAM_ERROR);
        ApiError::from(e)
    })?;

    let record = state.history.save(estimation).await.map_err(|e| {
        metrics::record_estimate(kind.as_str(), metrics::OUTCOME_STORE_ERROR);
        ApiError::from(e)
    })?;

    metrics::record_estimate(kind.as_str(), metrics::OUTCOME_SUCCESS);
    tracing::info!(
        id = %record.id,
        emission_type = %kind,
        carbon_kg = record.estimation.carbon_kg,
        "Estimation recorded"
    );
    Ok((StatusCode::CREATED, Json(record.estimation)))
}
