pub mod factory;
pub mod memory;
pub mod sled_store;

pub use factory::{create_in_memory_store, create_store};
pub use memory::InMemoryStore;
pub use sled_store::SledStore;

use crate::error::Result;
use crate::models::{DataProduct, Indication, Procedure, SearchHistoryEntry, Study};
use crate::search::project::Suggestion;
use crate::search::query::RecordQuery;
use async_trait::async_trait;
use uuid::Uuid;

/// Trait for searchable-record storage operations
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Save a study
    async fn save_study(&self, study: &Study) -> Result<()>;

    /// Save an indication
    async fn save_indication(&self, indication: &Indication) -> Result<()>;

    /// Save a procedure
    async fn save_procedure(&self, procedure: &Procedure) -> Result<()>;

    /// Save a data product under its study
    async fn save_data_product(&self, product: &DataProduct) -> Result<()>;

    /// Get a study by ID
    async fn get_study(&self, id: &Uuid) -> Result<Option<Study>>;

    /// Data products attached to a study
    async fn data_products_for_study(&self, study_id: &Uuid) -> Result<Vec<DataProduct>>;

    /// List matching records, ranked, for the given page
    async fn list_records(
        &self,
        query: &RecordQuery,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<crate::models::SearchRecord>>;

    /// Count records matching the query across the full filtered set
    async fn count_records(&self, query: &RecordQuery) -> Result<u64>;

    /// Distinct titles containing the fragment, tagged with record type
    async fn suggest_titles(&self, fragment: &str, limit: usize) -> Result<Vec<Suggestion>>;
}

/// Trait for search-history storage operations
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a history entry
    async fn save_entry(&self, entry: &SearchHistoryEntry) -> Result<()>;

    /// Get a history entry by ID
    async fn get_entry(&self, id: &Uuid) -> Result<Option<SearchHistoryEntry>>;

    /// Update a history entry
    async fn update_entry(&self, entry: &SearchHistoryEntry) -> Result<()>;

    /// Entries for a user: saved-only listings are ordered by most recent
    /// use, full history by creation time (newest first)
    async fn list_entries(
        &self,
        user_id: &Uuid,
        saved_only: bool,
    ) -> Result<Vec<SearchHistoryEntry>>;
}
