//! Structured logging.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber once at startup
//! - Pick the output format from the runtime environment
//!
//! # Design Decisions
//! - JSON format for production, human format otherwise
//! - `RUST_LOG` overrides `observability.log_level`

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Environment, ObservabilityConfig};

/// Filter used when `RUST_LOG` is unset.
pub fn default_directives(level: &str) -> String {
    format!("carbon_footprint={level},tower_http={level}")
}

/// Install the global subscriber.
///
/// Fails if a subscriber has already been set (e.g. twice in one process).
pub fn init_logging(
    config: &ObservabilityConfig,
    environment: Environment,
) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(&config.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);

    match environment {
        Environment::Production => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
        Environment::Development | Environment::Test => registry
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    }
}
