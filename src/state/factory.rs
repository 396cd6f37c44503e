use crate::config::{StateBackend, StateConfig};
use crate::error::{AppError, Result};
use crate::state::{HistoryStore, InMemoryStore, RecordStore, SledStore};
use std::sync::Arc;

/// Create record and history stores based on configuration.
///
/// Both handles point at the same backend instance; they are returned
/// separately so callers depend only on the trait they use.
pub fn create_store(
    config: &StateConfig,
) -> Result<(Arc<dyn RecordStore>, Arc<dyn HistoryStore>)> {
    match config.backend {
        StateBackend::Sled => {
            let path = config.path.as_ref().ok_or_else(|| {
                AppError::Configuration("Sled backend requires 'path' configuration".to_string())
            })?;

            tracing::info!(path = ?path, "Initializing Sled storage backend");

            let store = Arc::new(SledStore::new(path)?);
            Ok((store.clone(), store))
        }

        StateBackend::Memory => Ok(create_in_memory_store()),
    }
}

/// Create an in-memory store (for testing and development)
pub fn create_in_memory_store() -> (Arc<dyn RecordStore>, Arc<dyn HistoryStore>) {
    tracing::info!("Initializing in-memory storage backend");
    let store = Arc::new(InMemoryStore::new());
    (store.clone(), store)
}
