//! Estimation domain types.
//!
//! Request DTOs use the provider's snake_case field names so they can be
//! forwarded verbatim. Results use camelCase on the wire, matching what the
//! dashboard consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of activity being estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionType {
    Electricity,
    Vehicle,
    Flight,
}

impl EmissionType {
    pub const ALL: [EmissionType; 3] = [
        EmissionType::Electricity,
        EmissionType::Vehicle,
        EmissionType::Flight,
    ];

    /// Wire name, also used as the provider's `type` discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmissionType::Electricity => "electricity",
            EmissionType::Vehicle => "vehicle",
            EmissionType::Flight => "flight",
        }
    }
}

impl fmt::Display for EmissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized estimation result, independent of the provider that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonEstimationResult {
    pub carbon_grams: f64,
    pub carbon_lbs: f64,
    pub carbon_kg: f64,
    pub carbon_mt: f64,
    /// Timestamp reported by the provider.
    pub estimated_at: DateTime<Utc>,
    /// Provider name (e.g. "CarbonInterface").
    pub source: String,
    pub emission_type: EmissionType,
    /// The request exactly as it was sent to the provider.
    pub original_input: serde_json::Value,
}

/// A persisted, timestamped wrapper around one estimation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationRecord {
    pub id: String,
    /// ISO-8601 creation time (UTC).
    pub timestamp: String,
    pub estimation: CarbonEstimationResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectricityUnit {
    Kwh,
    Mwh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Mi,
    Km,
}

/// Electricity usage estimate request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricityInput {
    /// ISO country code (e.g. "us").
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub electricity_value: f64,
    pub electricity_unit: ElectricityUnit,
}

/// Vehicle trip estimate request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleInput {
    pub distance_value: f64,
    pub distance_unit: DistanceUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_model_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightLeg {
    pub departure_airport: String,
    pub destination_airport: String,
}

/// Flight estimate request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightInput {
    pub passengers: u32,
    pub legs: Vec<FlightLeg>,
}
