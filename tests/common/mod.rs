//! Shared utilities for integration testing.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

use carbon_footprint::config::{AppConfig, ProviderKind};
use carbon_footprint::lifecycle::build_state;
use carbon_footprint::{HttpServer, Shutdown};

pub const API_KEY: &str = "test-api-key";

/// Country code the mock upstream rejects with 422.
#[allow(dead_code)]
pub const REJECTED_COUNTRY: &str = "zz";

/// Counts requests seen by the mock Carbon Interface API.
#[derive(Default)]
pub struct UpstreamStats {
    pub estimates: AtomicUsize,
    pub unauthorized: AtomicUsize,
}

impl UpstreamStats {
    pub fn estimates(&self) -> usize {
        self.estimates.load(Ordering::SeqCst)
    }
}

fn authorized(stats: &UpstreamStats, headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", API_KEY);
    let ok = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false);
    if !ok {
        stats.unauthorized.fetch_add(1, Ordering::SeqCst);
    }
    ok
}

async fn estimates(
    State(stats): State<Arc<UpstreamStats>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    stats.estimates.fetch_add(1, Ordering::SeqCst);
    if !authorized(&stats, &headers) {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    if body["country"] == REJECTED_COUNTRY {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Invalid country").into_response();
    }

    let grams = match body["type"].as_str() {
        Some("electricity") => 37_240.0,
        Some("vehicle") => 37_029.0,
        Some("flight") => 1_029_211.0,
        _ => return (StatusCode::BAD_REQUEST, "Unknown type").into_response(),
    };
    let mut attributes = body.clone();
    attributes["carbon_g"] = json!(grams);
    attributes["carbon_lb"] = json!(grams * 0.0022);
    attributes["carbon_kg"] = json!(grams / 1000.0);
    attributes["carbon_mt"] = json!(grams / 1_000_000.0);
    attributes["estimated_at"] = json!("2024-05-01T12:00:00.000Z");

    (
        StatusCode::CREATED,
        Json(json!({
            "data": { "id": "upstream-1", "type": "estimate", "attributes": attributes }
        })),
    )
        .into_response()
}

// Carbon Interface lists the catalogue as a top-level array of `{ "data": ... }` envelopes.
async fn makes() -> Json<Value> {
    Json(json!([
        {
            "data": {
                "id": "2b1d0cd5-59be-4010-83b3-b60c5e5342da",
                "type": "vehicle_make",
                "attributes": { "name": "Toyota", "number_of_models": 114 }
            }
        },
        {
            "data": {
                "id": "5e3b2e7a-2c55-4e3e-9f51-5a2fdd0b3c11",
                "type": "vehicle_make",
                "attributes": { "name": "Honda", "number_of_models": 98 }
            }
        }
    ]))
}

async fn models(Path(make_id): Path<String>) -> Json<Value> {
    Json(json!([
        {
            "data": {
                "id": "7268a9b7-17e8-4c8d-acca-57059252afe9",
                "type": "vehicle_model",
                "attributes": { "name": "Corolla", "year": 1993, "make_id": make_id }
            }
        }
    ]))
}

/// Start an in-process stand-in for the Carbon Interface API.
pub async fn start_mock_upstream() -> (String, Arc<UpstreamStats>) {
    let stats = Arc::new(UpstreamStats::default());
    let app = Router::new()
        .route("/api/v1/estimates", post(estimates))
        .route("/api/v1/vehicle_makes", get(makes))
        .route("/api/v1/vehicle_makes/{id}/vehicle_models", get(models))
        .with_state(stats.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api/v1", addr), stats)
}

/// A running backend wired to the mock upstream.
pub struct TestApp {
    pub base_url: String,
    pub upstream: Arc<UpstreamStats>,
    pub shutdown: Shutdown,
    pub storage: tempfile::TempDir,
}

pub async fn spawn_app() -> TestApp {
    let storage = tempfile::tempdir().unwrap();
    spawn_app_in(storage).await
}

/// Start the backend on an ephemeral port, storing history in `storage`.
pub async fn spawn_app_in(storage: tempfile::TempDir) -> TestApp {
    let (upstream_url, upstream) = start_mock_upstream().await;

    let mut config = AppConfig::default();
    config.provider.kind = ProviderKind::Live;
    config.provider.base_url = upstream_url;
    config.provider.api_key = API_KEY.to_string();
    config.storage.dir = storage.path().to_path_buf();

    let state = build_state(&config).await.unwrap();
    let server = HttpServer::new(&config.limits, state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        upstream,
        shutdown,
        storage,
    }
}
