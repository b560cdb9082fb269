//! Deterministic in-process provider.
//!
//! Returns fixed masses per emission type so the rest of the stack can be
//! exercised without credentials or network access.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::estimation::{
    CarbonEstimationResult, ElectricityInput, EmissionType, FlightInput, VehicleInput,
};
use crate::provider::{CarbonProvider, ProviderError, ProviderResult};

pub const PROVIDER_NAME: &str = "MockProvider";

const LBS_PER_GRAM: f64 = 0.0022;

/// Snapshot of how often each operation was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockCalls {
    pub electricity: usize,
    pub vehicle: usize,
    pub flight: usize,
    pub makes: usize,
    pub models: usize,
}

#[derive(Debug, Default)]
pub struct MockProvider {
    electricity: AtomicUsize,
    vehicle: AtomicUsize,
    flight: AtomicUsize,
    makes: AtomicUsize,
    models: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> MockCalls {
        MockCalls {
            electricity: self.electricity.load(Ordering::Relaxed),
            vehicle: self.vehicle.load(Ordering::Relaxed),
            flight: self.flight.load(Ordering::Relaxed),
            makes: self.makes.load(Ordering::Relaxed),
            models: self.models.load(Ordering::Relaxed),
        }
    }

    fn grams_for(kind: EmissionType) -> f64 {
        match kind {
            EmissionType::Electricity => 1000.0,
            EmissionType::Vehicle => 2000.0,
            EmissionType::Flight => 3000.0,
        }
    }

    fn respond<I: Serialize>(kind: EmissionType, input: &I) -> ProviderResult<CarbonEstimationResult> {
        let original_input =
            serde_json::to_value(input).map_err(|e| ProviderError::Decode(e.to_string()))?;
        let grams = Self::grams_for(kind);

        Ok(CarbonEstimationResult {
            carbon_grams: grams,
            carbon_lbs: grams * LBS_PER_GRAM,
            carbon_kg: grams / 1_000.0,
            carbon_mt: grams / 1_000_000.0,
            estimated_at: Utc::now(),
            source: PROVIDER_NAME.to_string(),
            emission_type: kind,
            original_input,
        })
    }
}

#[async_trait]
impl CarbonProvider for MockProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn estimate_electricity(
        &self,
        input: &ElectricityInput,
    ) -> ProviderResult<CarbonEstimationResult> {
        self.electricity.fetch_add(1, Ordering::Relaxed);
        Self::respond(EmissionType::Electricity, input)
    }

    async fn estimate_vehicle(&self, input: &VehicleInput) -> ProviderResult<CarbonEstimationResult> {
        self.vehicle.fetch_add(1, Ordering::Relaxed);
        Self::respond(EmissionType::Vehicle, input)
    }

    async fn estimate_flight(&self, input: &FlightInput) -> ProviderResult<CarbonEstimationResult> {
        self.flight.fetch_add(1, Ordering::Relaxed);
        Self::respond(EmissionType::Flight, input)
    }

    // Catalogue listings mirror Carbon Interface: an array of `{ "data": ... }` envelopes.
    async fn vehicle_makes(&self) -> ProviderResult<Value> {
        self.makes.fetch_add(1, Ordering::Relaxed);
        Ok(json!([{
            "data": {
                "id": "mock-make-1",
                "type": "vehicle_make",
                "attributes": { "name": "MockBrand", "number_of_models": 1 }
            }
        }]))
    }

    async fn vehicle_models(&self, make_id: &str) -> ProviderResult<Value> {
        self.models.fetch_add(1, Ordering::Relaxed);
        Ok(json!([{
            "data": {
                "id": "mock-model-1",
                "type": "vehicle_model",
                "attributes": { "name": "MockModel", "year": 2023, "make_id": make_id }
            }
        }]))
    }
}
