//! Carbon footprint estimation backend.
//!
//! Accepts activity descriptions (electricity use, vehicle trips, flights),
//! asks an emissions provider for the carbon mass, and keeps a history of
//! every estimate.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http::server (request ID, trace, CORS, timeout, body limit)
//!                          │
//!                          ├─ handlers::estimate ──▶ estimation::Validate
//!                          │                     ──▶ provider::CarbonProvider ──▶ Carbon Interface
//!                          │                     ──▶ storage::HistoryStore::save
//!                          ├─ handlers::vehicle  ──▶ provider::CarbonProvider
//!                          ├─ handlers::history  ──▶ storage::HistoryStore (list/get/clear)
//!                          │                     ──▶ estimation::summarize
//!                          └─ handlers::health
//!
//!     Cross-cutting: config, observability (tracing + metrics), lifecycle
//! ```

// Core subsystems
pub mod config;
pub mod estimation;
pub mod http;
pub mod provider;
pub mod storage;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
