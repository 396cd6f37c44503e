use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted record of a past search query.
///
/// The `filters` blob is stored opaquely so a saved search reproduces the
/// original parameters exactly when re-executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    /// Unique identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Raw query text
    pub query: String,

    /// Record-type scope the search ran with
    pub category: Option<String>,

    /// Structured filters as supplied, stored verbatim
    pub filters: serde_json::Value,

    /// Result count at the time of the search
    pub results_count: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Whether the entry is pinned as a saved search
    pub is_saved: bool,

    /// Last execution timestamp
    pub last_used: DateTime<Utc>,

    /// Number of times the search has been executed
    pub use_count: u32,
}

impl SearchHistoryEntry {
    /// Create a new history entry for a just-executed search
    pub fn new(
        user_id: Uuid,
        query: String,
        category: Option<String>,
        filters: serde_json::Value,
        results_count: u64,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id,
            query,
            category,
            filters,
            results_count,
            created_at: now,
            is_saved: false,
            last_used: now,
            use_count: 1,
        }
    }

    /// Pin the entry as a saved search
    pub fn mark_saved(&mut self) {
        self.is_saved = true;
        self.last_used = Utc::now();
    }

    /// Unpin the entry; the row itself is retained
    pub fn mark_unsaved(&mut self) {
        self.is_saved = false;
    }

    /// Record a re-execution of the search
    pub fn record_use(&mut self) {
        self.use_count += 1;
        self.last_used = Utc::now();
    }
}
