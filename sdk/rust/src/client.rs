//! Typed client for the carbon footprint backend.

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an error status.
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectricityRequest {
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub electricity_value: f64,
    /// `kwh` or `mwh`.
    pub electricity_unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRequest {
    pub distance_value: f64,
    /// `mi` or `km`.
    pub distance_unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_model_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightLeg {
    pub departure_airport: String,
    pub destination_airport: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRequest {
    pub passengers: u32,
    pub legs: Vec<FlightLeg>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationResult {
    pub carbon_grams: f64,
    pub carbon_lbs: f64,
    pub carbon_kg: f64,
    pub carbon_mt: f64,
    pub estimated_at: String,
    pub source: String,
    pub emission_type: String,
    pub original_input: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationRecord {
    pub id: String,
    pub timestamp: String,
    pub estimation: EstimationResult,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeTotals {
    pub electricity: f64,
    pub vehicle: f64,
    pub flight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyEmissions {
    pub date: String,
    #[serde(flatten)]
    pub totals: TypeTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub total_records: usize,
    pub total_kg: f64,
    pub by_type: TypeTotals,
    pub daily: Vec<DailyEmissions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
    pub removed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub provider: String,
    pub records: usize,
    pub uptime_secs: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct CarbonClient {
    client: Client,
    base_url: String,
}

impl CarbonClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SdkError> {
        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            // Prefer the backend's error message; fall back to the raw body.
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            return Err(SdkError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    pub async fn estimate_electricity(
        &self,
        req: &ElectricityRequest,
    ) -> Result<EstimationResult, SdkError> {
        self.send(self.request(Method::POST, "/estimate/electricity").json(req))
            .await
    }

    pub async fn estimate_vehicle(&self, req: &VehicleRequest) -> Result<EstimationResult, SdkError> {
        self.send(self.request(Method::POST, "/estimate/vehicle").json(req))
            .await
    }

    pub async fn estimate_flight(&self, req: &FlightRequest) -> Result<EstimationResult, SdkError> {
        self.send(self.request(Method::POST, "/estimate/flight").json(req))
            .await
    }

    /// Provider catalogue of vehicle makes, as returned upstream.
    pub async fn vehicle_makes(&self) -> Result<Value, SdkError> {
        self.send(self.request(Method::GET, "/vehicle/makes")).await
    }

    pub async fn vehicle_models(&self, make_id: &str) -> Result<Value, SdkError> {
        let path = format!("/vehicle/makes/{}/models", make_id);
        self.send(self.request(Method::GET, &path)).await
    }

    pub async fn history(&self) -> Result<Vec<EstimationRecord>, SdkError> {
        self.send(self.request(Method::GET, "/history")).await
    }

    pub async fn record(&self, id: &str) -> Result<EstimationRecord, SdkError> {
        let path = format!("/history/{}", id);
        self.send(self.request(Method::GET, &path)).await
    }

    pub async fn summary(&self) -> Result<HistorySummary, SdkError> {
        self.send(self.request(Method::GET, "/history/summary")).await
    }

    pub async fn clear_history(&self) -> Result<ClearResponse, SdkError> {
        self.send(self.request(Method::DELETE, "/history/clear")).await
    }

    pub async fn health(&self) -> Result<HealthStatus, SdkError> {
        self.send(self.request(Method::GET, "/health")).await
    }
}
