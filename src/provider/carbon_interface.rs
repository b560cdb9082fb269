//! Carbon Interface API adapter.
//!
//! # Responsibilities
//! - Forward estimate requests to `POST /estimates` with the input echoed verbatim
//! - Map vendor field names (`carbon_g`, `carbon_lb`, ...) to the normalized result
//! - Pass vehicle make/model listings through unchanged
//! - Surface non-2xx responses with status and raw body
//!
//! # Design Decisions
//! - Bearer token authentication, token taken from configuration
//! - Single attempt per call; the client timeout is the only guard

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

use crate::config::ProviderConfig;
use crate::estimation::{
    CarbonEstimationResult, ElectricityInput, EmissionType, FlightInput, VehicleInput,
};
use crate::observability::metrics;
use crate::provider::{CarbonProvider, ProviderError, ProviderResult};

pub const DEFAULT_BASE_URL: &str = "https://www.carboninterface.com/api/v1";
pub const PROVIDER_NAME: &str = "CarbonInterface";

/// `POST /estimates` response envelope.
#[derive(Debug, Deserialize)]
struct EstimateResponse {
    data: EstimateData,
}

#[derive(Debug, Deserialize)]
struct EstimateData {
    id: String,
    attributes: CarbonAttributes,
}

/// Mass fields shared by every estimate type; type-specific echo fields are ignored.
#[derive(Debug, Deserialize)]
struct CarbonAttributes {
    carbon_g: f64,
    carbon_lb: f64,
    carbon_kg: f64,
    carbon_mt: f64,
    estimated_at: DateTime<Utc>,
}

impl CarbonAttributes {
    fn into_result(self, kind: EmissionType, original_input: Value) -> CarbonEstimationResult {
        CarbonEstimationResult {
            carbon_grams: self.carbon_g,
            carbon_lbs: self.carbon_lb,
            carbon_kg: self.carbon_kg,
            carbon_mt: self.carbon_mt,
            estimated_at: self.estimated_at,
            source: PROVIDER_NAME.to_string(),
            emission_type: kind,
            original_input,
        }
    }
}

/// Live provider backed by the Carbon Interface REST API.
#[derive(Clone)]
pub struct CarbonInterfaceProvider {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl CarbonInterfaceProvider {
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::Config("missing API key".to_string()));
        }

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ProviderError::Config(format!("invalid base URL '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::Config(format!("base URL '{}' cannot carry a path", base_url)));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("carbon-footprint/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Append `segments` to the base path, percent-encoding each one.
    ///
    /// Caller-supplied IDs stay inside a single segment: `/`, `?`, `#` and `%`
    /// are escaped, and dot segments are refused.
    fn url(&self, segments: &[&str]) -> ProviderResult<Url> {
        if let Some(bad) = segments.iter().find(|s| s.is_empty() || **s == "." || **s == "..") {
            return Err(ProviderError::InvalidRequest(format!("invalid path segment '{}'", bad)));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::Config(format!("base URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn estimate<I: Serialize>(
        &self,
        kind: EmissionType,
        input: &I,
    ) -> ProviderResult<CarbonEstimationResult> {
        let original_input =
            serde_json::to_value(input).map_err(|e| ProviderError::Decode(e.to_string()))?;

        let fields = match &original_input {
            Value::Object(fields) => fields.clone(),
            _ => return Err(ProviderError::Decode("estimate input is not an object".to_string())),
        };
        let mut body = Map::new();
        body.insert("type".to_string(), Value::String(kind.as_str().to_string()));
        body.extend(fields);

        let url = self.url(&["estimates"])?;
        let endpoint = url.path().to_string();
        let request = self.client.post(url).json(&Value::Object(body));
        let response: EstimateResponse = self.send(request, &endpoint).await?;

        tracing::debug!(
            estimate_id = %response.data.id,
            emission_type = %kind,
            carbon_kg = response.data.attributes.carbon_kg,
            "Carbon Interface estimate received"
        );

        Ok(response.data.attributes.into_result(kind, original_input))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, endpoint: &str) -> ProviderResult<T> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(endpoint = %endpoint, error = %e, "Carbon Interface unreachable");
                metrics::record_upstream_error("transport");
                ProviderError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(endpoint = %endpoint, status = %status, "Carbon Interface rejected request");
            metrics::record_upstream_error(status.as_str());
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            metrics::record_upstream_error("decode");
            ProviderError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl CarbonProvider for CarbonInterfaceProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn estimate_electricity(
        &self,
        input: &ElectricityInput,
    ) -> ProviderResult<CarbonEstimationResult> {
        self.estimate(EmissionType::Electricity, input).await
    }

    async fn estimate_vehicle(&self, input: &VehicleInput) -> ProviderResult<CarbonEstimationResult> {
        self.estimate(EmissionType::Vehicle, input).await
    }

    async fn estimate_flight(&self, input: &FlightInput) -> ProviderResult<CarbonEstimationResult> {
        self.estimate(EmissionType::Flight, input).await
    }

    async fn vehicle_makes(&self) -> ProviderResult<Value> {
        let url = self.url(&["vehicle_makes"])?;
        let endpoint = url.path().to_string();
        self.send(self.client.get(url), &endpoint).await
    }

    async fn vehicle_models(&self, make_id: &str) -> ProviderResult<Value> {
        let url = self.url(&["vehicle_makes", make_id, "vehicle_models"])?;
        let endpoint = url.path().to_string();
        self.send(self.client.get(url), &endpoint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::{DistanceUnit, ElectricityUnit, FlightLeg};
    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode, Uri},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct Captured {
        path: String,
        authorization: Option<String>,
        body: Option<Value>,
    }

    #[derive(Clone)]
    struct Upstream {
        captured: Arc<Mutex<Vec<Captured>>>,
        status: StatusCode,
        reply: Value,
    }

    async fn estimates(
        State(upstream): State<Upstream>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, String) {
        upstream.captured.lock().unwrap().push(Captured {
            path: "/estimates".to_string(),
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: Some(body),
        });
        reply(&upstream)
    }

    async fn listing(State(upstream): State<Upstream>, uri: Uri) -> (StatusCode, String) {
        upstream.captured.lock().unwrap().push(Captured {
            path: uri
                .path_and_query()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
            authorization: None,
            body: None,
        });
        reply(&upstream)
    }

    fn reply(upstream: &Upstream) -> (StatusCode, String) {
        let body = match &upstream.reply {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        (upstream.status, body)
    }

    async fn start_upstream(status: StatusCode, reply: Value) -> (CarbonInterfaceProvider, Arc<Mutex<Vec<Captured>>>) {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = Upstream {
            captured: captured.clone(),
            status,
            reply,
        };
        let app = Router::new()
            .route("/api/v1/estimates", post(estimates))
            .route("/api/v1/vehicle_makes", get(listing))
            .route("/api/v1/vehicle_makes/{id}/vehicle_models", get(listing))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = ProviderConfig {
            base_url: format!("http://{}/api/v1/", addr),
            api_key: "mock-api-key".to_string(),
            ..ProviderConfig::default()
        };
        (CarbonInterfaceProvider::new(&config).unwrap(), captured)
    }

    fn electricity_reply() -> Value {
        json!({
            "data": {
                "id": "mock-id",
                "type": "estimate",
                "attributes": {
                    "carbon_g": 1000,
                    "carbon_lb": 2.2,
                    "carbon_kg": 1,
                    "carbon_mt": 0.001,
                    "estimated_at": "2023-01-01T00:00:00Z",
                    "country": "us",
                    "state": "ca",
                    "electricity_unit": "kwh",
                    "electricity_value": "100.0"
                }
            }
        })
    }

    fn electricity_input() -> ElectricityInput {
        ElectricityInput {
            country: "us".into(),
            state: Some("ca".into()),
            electricity_value: 100.0,
            electricity_unit: ElectricityUnit::Kwh,
        }
    }

    #[tokio::test]
    async fn test_electricity_request_shape() {
        let (provider, captured) = start_upstream(StatusCode::CREATED, electricity_reply()).await;

        provider.estimate_electricity(&electricity_input()).await.unwrap();

        let calls = captured.lock().unwrap().clone();
        assert_eq!(calls.len(), 1, "exactly one upstream call");
        assert_eq!(calls[0].authorization.as_deref(), Some("Bearer mock-api-key"));
        assert_eq!(
            calls[0].body,
            Some(json!({
                "type": "electricity",
                "country": "us",
                "state": "ca",
                "electricity_value": 100.0,
                "electricity_unit": "kwh"
            }))
        );
    }

    #[tokio::test]
    async fn test_electricity_response_mapping() {
        let (provider, _) = start_upstream(StatusCode::OK, electricity_reply()).await;

        let result = provider.estimate_electricity(&electricity_input()).await.unwrap();

        assert_eq!(result.carbon_grams, 1000.0);
        assert_eq!(result.carbon_lbs, 2.2);
        assert_eq!(result.carbon_kg, 1.0);
        assert_eq!(result.carbon_mt, 0.001);
        assert_eq!(result.estimated_at, "2023-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(result.source, "CarbonInterface");
        assert_eq!(result.emission_type, EmissionType::Electricity);
        assert_eq!(
            result.original_input,
            serde_json::to_value(electricity_input()).unwrap()
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_carries_status_and_body() {
        let (provider, _) = start_upstream(StatusCode::BAD_REQUEST, json!("API Error")).await;

        let err = provider.estimate_electricity(&electricity_input()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Upstream { status: 400, .. }));
        assert_eq!(err.to_string(), "Carbon API error: 400 - API Error");
    }

    #[tokio::test]
    async fn test_vehicle_and_flight_discriminators() {
        let reply = json!({
            "data": {
                "id": "mock-id",
                "type": "estimate",
                "attributes": {
                    "carbon_g": 2000, "carbon_lb": 4.4, "carbon_kg": 2, "carbon_mt": 0.002,
                    "estimated_at": "2023-01-01T00:00:00Z"
                }
            }
        });
        let (provider, captured) = start_upstream(StatusCode::CREATED, reply).await;

        let vehicle = VehicleInput {
            distance_value: 100.0,
            distance_unit: DistanceUnit::Mi,
            vehicle_model_id: Some("mock-model-id".into()),
        };
        let result = provider.estimate_vehicle(&vehicle).await.unwrap();
        assert_eq!(result.emission_type, EmissionType::Vehicle);
        assert_eq!(result.carbon_grams, 2000.0);

        let flight = FlightInput {
            passengers: 2,
            legs: vec![FlightLeg {
                departure_airport: "sfo".into(),
                destination_airport: "yyz".into(),
            }],
        };
        provider.estimate_flight(&flight).await.unwrap();

        let calls = captured.lock().unwrap().clone();
        assert_eq!(calls[0].body.as_ref().unwrap()["type"], json!("vehicle"));
        assert_eq!(calls[0].body.as_ref().unwrap()["vehicle_model_id"], json!("mock-model-id"));
        assert_eq!(calls[1].body.as_ref().unwrap()["type"], json!("flight"));
        assert_eq!(calls[1].body.as_ref().unwrap()["legs"][0]["destination_airport"], json!("yyz"));
    }

    #[tokio::test]
    async fn test_vehicle_makes_passthrough() {
        let reply = json!([{
            "data": {
                "id": "make-1",
                "type": "vehicle_make",
                "attributes": { "name": "Toyota", "number_of_models": 114 }
            }
        }]);
        let (provider, captured) = start_upstream(StatusCode::OK, reply.clone()).await;

        let makes = provider.vehicle_makes().await.unwrap();
        assert_eq!(makes, reply);
        assert_eq!(captured.lock().unwrap()[0].path, "/api/v1/vehicle_makes");
    }

    #[tokio::test]
    async fn test_vehicle_models_path() {
        let reply = json!([{
            "data": {
                "id": "model-1",
                "type": "vehicle_model",
                "attributes": { "name": "Camry", "year": 2020, "make_id": "make-1", "extra": true }
            }
        }]);
        let (provider, captured) = start_upstream(StatusCode::OK, reply.clone()).await;

        let models = provider.vehicle_models("make-1").await.unwrap();
        assert_eq!(models, reply);
        assert_eq!(
            captured.lock().unwrap()[0].path,
            "/api/v1/vehicle_makes/make-1/vehicle_models"
        );
    }

    #[tokio::test]
    async fn test_make_id_stays_in_one_segment() {
        let (provider, captured) = start_upstream(StatusCode::OK, json!([])).await;

        provider.vehicle_models("abc?x=1").await.unwrap();
        provider.vehicle_models("a/b#c").await.unwrap();

        let calls = captured.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].path, "/api/v1/vehicle_makes/abc%3Fx=1/vehicle_models");
        assert_eq!(calls[1].path, "/api/v1/vehicle_makes/a%2Fb%23c/vehicle_models");
    }

    #[tokio::test]
    async fn test_dot_segments_are_refused() {
        let (provider, captured) = start_upstream(StatusCode::OK, json!([])).await;

        for make_id in ["..", ".", ""] {
            assert!(matches!(
                provider.vehicle_models(make_id).await,
                Err(ProviderError::InvalidRequest(_))
            ));
        }
        assert!(captured.lock().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        let config = ProviderConfig {
            base_url: "not a url".to_string(),
            api_key: "key".to_string(),
            ..ProviderConfig::default()
        };
        assert!(matches!(
            CarbonInterfaceProvider::new(&config),
            Err(ProviderError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_decode_error() {
        let (provider, _) = start_upstream(StatusCode::OK, json!({ "unexpected": true })).await;
        let err = provider.estimate_electricity(&electricity_input()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[test]
    fn test_requires_api_key() {
        let config = ProviderConfig::default();
        assert!(matches!(
            CarbonInterfaceProvider::new(&config),
            Err(ProviderError::Config(_))
        ));
    }
}
