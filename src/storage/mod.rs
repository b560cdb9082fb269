//! Estimation history storage.
//!
//! # Data Flow
//! ```text
//! CarbonEstimationResult
//!     → history.rs (generate ID, stamp time, wrap in EstimationRecord)
//!     → kv.rs (DashMap in memory, one JSON file per key on disk)
//!
//! list  → scan all values, keep estimation records
//! get   → direct key lookup
//! clear → remove every `estimation-` key
//! ```
//!
//! # Design Decisions
//! - Write-through: a record is on disk before `save` returns
//! - Whole directory loaded at open; history is small
//! - No transactions, indexing or pagination

pub mod history;
pub mod kv;

use std::path::PathBuf;
use thiserror::Error;

pub use history::HistoryStore;
pub use kv::KvStore;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
