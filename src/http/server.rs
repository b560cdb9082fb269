//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with every API route
//! - Wire up middleware (request ID, tracing, CORS, timeout, body limit)
//! - Serve on a bound listener until shutdown is signalled

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::LimitsConfig;
use crate::http::handlers::{estimate, health, history, vehicle};
use crate::http::middleware::track_requests;
use crate::provider::CarbonProvider;
use crate::storage::HistoryStore;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn CarbonProvider>,
    pub history: Arc<HistoryStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(provider: Arc<dyn CarbonProvider>, history: Arc<HistoryStore>) -> Self {
        Self {
            provider,
            history,
            started_at: Instant::now(),
        }
    }
}

/// HTTP server for the estimation API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(limits: &LimitsConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(limits, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(limits: &LimitsConfig, state: AppState) -> Router {
        let estimates = Router::new()
            .route("/estimate/electricity", post(estimate::estimate_electricity))
            .route("/estimate/vehicle", post(estimate::estimate_vehicle))
            .route("/estimate/flight", post(estimate::estimate_flight))
            .route("/electricity/estimate", post(estimate::estimate_electricity))
            .route("/vehicle/estimate", post(estimate::estimate_vehicle))
            .route("/flight/estimate", post(estimate::estimate_flight));

        let catalogue = Router::new()
            .route("/vehicle/makes", get(vehicle::list_makes))
            .route("/vehicle/makes/{make_id}/models", get(vehicle::list_models));

        let records = Router::new()
            .route("/history", get(history::list))
            .route("/history/summary", get(history::summary))
            .route(
                "/history/clear",
                get(history::get_clear).delete(history::clear),
            )
            .route("/history/{id}", get(history::get));

        Router::new()
            .merge(estimates)
            .merge(catalogue)
            .merge(records)
            .route("/health", get(health::health))
            .route_layer(middleware::from_fn(track_requests))
            .with_state(state)
            .layer(DefaultBodyLimit::max(limits.max_body_bytes))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get(X_REQUEST_ID)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("unknown");
                        tracing::info_span!(
                            "http_request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id,
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(CorsLayer::permissive())
                    .layer(TimeoutLayer::new(Duration::from_secs(limits.request_timeout_secs))),
            )
    }

    /// Clone of the fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
