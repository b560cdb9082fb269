//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request ID, trace span, CORS, timeout, body limit)
//!     → middleware (request metrics on matched routes)
//!     → handlers/ (estimate, vehicle, history, health)
//!     → error.rs (failures rendered as JSON)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use server::{AppState, HttpServer, X_REQUEST_ID};
