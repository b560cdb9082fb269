//! Startup orchestration.
//!
//! Builds shared application state from validated configuration in
//! dependency order: provider first, then the history store.

use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::http::AppState;
use crate::provider::{self, ProviderError};
use crate::storage::{HistoryStore, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialize provider: {0}")]
    Provider(#[from] ProviderError),

    #[error("failed to open history store: {0}")]
    Storage(#[from] StoreError),
}

pub async fn build_state(config: &AppConfig) -> Result<AppState, StartupError> {
    let provider = provider::from_config(&config.provider)?;
    let history = HistoryStore::open(&config.storage.dir).await?;

    tracing::info!(
        provider = provider.name(),
        storage_dir = ?config.storage.dir,
        records = history.len(),
        "Application state ready"
    );
    Ok(AppState::new(provider, Arc::new(history)))
}
