//! Estimation domain subsystem.
//!
//! # Data Flow
//! ```text
//! request DTO (electricity / vehicle / flight)
//!     → validation.rs (field rules, all violations collected)
//!     → provider (live or mock) computes CarbonEstimationResult
//!     → storage wraps it in an EstimationRecord
//!     → summary.rs aggregates records for the dashboard
//! ```
//!
//! # Design Decisions
//! - Units are closed enums; unknown units fail deserialization
//! - The four mass fields are carried as the provider reports them
//! - `original_input` is kept as opaque JSON so records stay self-describing

pub mod summary;
pub mod types;
pub mod validation;

pub use summary::{summarize, DailyEmissions, HistorySummary, TypeTotals};
pub use types::{
    CarbonEstimationResult, DistanceUnit, ElectricityInput, ElectricityUnit, EmissionType,
    EstimationRecord, FlightInput, FlightLeg, VehicleInput,
};
pub use validation::{FieldError, Validate, ValidationError};
