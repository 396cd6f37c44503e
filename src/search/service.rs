//! Search orchestration
//!
//! Ties the pipeline together: tokenize the raw query, build the
//! [`RecordQuery`], count the full filtered set, fetch one page, project
//! each record, and append a history entry. Counting and fetching are two
//! store calls; staleness between them under concurrent writes is
//! accepted.

use crate::config::SearchConfig;
use crate::error::Result;
use crate::models::{RecordScope, SearchHistoryEntry, SearchRecord};
use crate::search::project::{project_record, SearchResult, Suggestion};
use crate::search::query::{RecordQuery, SearchFilters};
use crate::search::tokenizer::tokenize_query;
use crate::state::{HistoryStore, RecordStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A validated search request, as handed over by the transport layer
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Raw query text
    pub q: String,

    /// Raw `category` parameter, preserved verbatim for history
    pub category: Option<String>,

    /// Parsed record-type scope
    pub scope: RecordScope,

    /// Structured filters
    pub filters: SearchFilters,

    /// 1-based page number
    pub page: u32,

    /// Page size
    pub per_page: u32,
}

/// Search response with results and pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Projected results for the requested page
    pub results: Vec<SearchResult>,

    /// Total matches across the full filtered set
    pub total: u64,

    /// Echoed page number
    pub page: u32,

    /// Echoed page size
    pub per_page: u32,
}

/// Search service over a record store and a history store
pub struct SearchService {
    store: Arc<dyn RecordStore>,
    history: Arc<dyn HistoryStore>,
    config: SearchConfig,
}

impl SearchService {
    /// Create a new search service
    pub fn new(
        store: Arc<dyn RecordStore>,
        history: Arc<dyn HistoryStore>,
        config: SearchConfig,
    ) -> Self {
        Self {
            store,
            history,
            config,
        }
    }

    /// Execute a search request.
    ///
    /// When a user context is present, a history entry is appended after
    /// the results are assembled; a failed history write is logged and
    /// never fails the search.
    pub async fn search(
        &self,
        request: &SearchRequest,
        user_id: Option<Uuid>,
    ) -> Result<SearchResponse> {
        let query = RecordQuery {
            terms: tokenize_query(&request.q),
            scope: request.scope,
            filters: request.filters.clone(),
        };

        tracing::debug!(
            q = %request.q,
            terms = query.terms.len(),
            scope = %query.scope,
            page = request.page,
            per_page = request.per_page,
            "Executing search"
        );

        let total = self.store.count_records(&query).await?;
        let records = self
            .store
            .list_records(&query, request.page, request.per_page)
            .await?;

        let mut results = Vec::with_capacity(records.len());
        for record in &records {
            match self.project(record).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::warn!(
                        record_id = %record.id(),
                        error = %e,
                        "Skipping record that failed projection"
                    );
                }
            }
        }

        if let Some(user_id) = user_id {
            self.append_history(request, total, user_id).await;
        }

        Ok(SearchResponse {
            results,
            total,
            page: request.page,
            per_page: request.per_page,
        })
    }

    /// Project one record, resolving attached data products for studies
    async fn project(&self, record: &SearchRecord) -> Result<SearchResult> {
        let data_products = match record {
            SearchRecord::Study(study) => self.store.data_products_for_study(&study.id).await?,
            _ => Vec::new(),
        };

        Ok(project_record(record, data_products))
    }

    /// Fire-and-forget history write, decoupled from the search result
    async fn append_history(&self, request: &SearchRequest, total: u64, user_id: Uuid) {
        let filters = match serde_json::to_value(&request.filters) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize filters for history");
                return;
            }
        };

        let entry = SearchHistoryEntry::new(
            user_id,
            request.q.clone(),
            request.category.clone(),
            filters,
            total,
        );

        if let Err(e) = self.history.save_entry(&entry).await {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to record search history");
        }
    }

    /// Suggestion lookup for a partial query fragment
    pub async fn suggest(&self, fragment: &str) -> Result<Vec<Suggestion>> {
        self.store
            .suggest_titles(fragment, self.config.suggestion_limit)
            .await
    }

    /// Engine limits, for boundary validation by the transport layer
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}
