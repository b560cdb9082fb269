//! Emissions provider subsystem.
//!
//! # Data Flow
//! ```text
//! validated request DTO
//!     → CarbonProvider (trait object chosen at startup)
//!         ├─ carbon_interface.rs: POST /estimates, GET /vehicle_makes[/{id}/vehicle_models]
//!         └─ mock.rs: deterministic values, no network
//!     → CarbonEstimationResult (normalized field names)
//!     → vehicle catalogue (upstream JSON, forwarded untouched)
//! ```
//!
//! # Design Decisions
//! - One upstream call per operation: no retries, caching or rate limiting
//! - Non-2xx upstream responses carry status and raw body to the caller
//! - Provider kind is configuration, not a compile-time choice

pub mod carbon_interface;
pub mod mock;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ProviderConfig, ProviderKind};
use crate::estimation::{
    CarbonEstimationResult, ElectricityInput, FlightInput, VehicleInput,
};

pub use carbon_interface::CarbonInterfaceProvider;
pub use mock::{MockCalls, MockProvider};

/// Errors raised while talking to an emissions provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("Carbon API error: {status} - {body}")]
    Upstream { status: u16, body: String },

    /// The request never produced a response (connect, TLS, timeout).
    #[error("Carbon API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Carbon API returned an unexpected payload: {0}")]
    Decode(String),

    /// The request cannot be expressed against the provider API.
    #[error("Invalid provider request: {0}")]
    InvalidRequest(String),

    /// The provider could not be constructed from configuration.
    #[error("Provider misconfigured: {0}")]
    Config(String),
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// A source of carbon estimates.
///
/// Implementations must echo the input they were given in
/// `CarbonEstimationResult::original_input`.
#[async_trait]
pub trait CarbonProvider: Send + Sync {
    /// Name recorded in `CarbonEstimationResult::source`.
    fn name(&self) -> &'static str;

    async fn estimate_electricity(&self, input: &ElectricityInput)
        -> ProviderResult<CarbonEstimationResult>;

    async fn estimate_vehicle(&self, input: &VehicleInput) -> ProviderResult<CarbonEstimationResult>;

    async fn estimate_flight(&self, input: &FlightInput) -> ProviderResult<CarbonEstimationResult>;

    /// Vehicle makes exactly as the provider lists them.
    async fn vehicle_makes(&self) -> ProviderResult<Value>;

    /// Models of one make exactly as the provider lists them.
    async fn vehicle_models(&self, make_id: &str) -> ProviderResult<Value>;
}

/// Build the provider selected by configuration.
pub fn from_config(config: &ProviderConfig) -> ProviderResult<Arc<dyn CarbonProvider>> {
    match config.kind {
        ProviderKind::Live => {
            let provider = CarbonInterfaceProvider::new(config)?;
            tracing::info!(base_url = %config.base_url, "Using Carbon Interface provider");
            Ok(Arc::new(provider))
        }
        ProviderKind::Mock => {
            tracing::warn!("Using mock provider; estimates are not real");
            Ok(Arc::new(MockProvider::new()))
        }
    }
}
