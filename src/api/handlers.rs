use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::{RecordScope, SearchHistoryEntry};
use crate::search::project::Suggestion;
use crate::search::query::SearchFilters;
use crate::search::service::{SearchRequest, SearchResponse};
use crate::state::HistoryStore;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Header carrying the authenticated user id, populated by the external
/// auth collaborator in front of this service
const USER_HEADER: &str = "x-user-id";

fn optional_user(headers: &HeaderMap) -> Option<Uuid> {
    headers.get(USER_HEADER)?.to_str().ok()?.parse().ok()
}

fn required_user(headers: &HeaderMap) -> Result<Uuid> {
    optional_user(headers).ok_or_else(|| {
        AppError::Authentication(format!("Missing or invalid {} header", USER_HEADER))
    })
}

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Search across medical records with filters
pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    params.validate()?;

    let config = state.search.config();
    let per_page = params.per_page.unwrap_or(config.default_per_page);
    if per_page > config.max_per_page {
        return Err(AppError::Validation(format!(
            "per_page must be at most {}",
            config.max_per_page
        )));
    }

    let scope = match params.category.as_deref() {
        None => RecordScope::All,
        Some(raw) => raw
            .parse::<RecordScope>()
            .map_err(|_| AppError::Validation(format!("Unknown category: {}", raw)))?,
    };

    let request = SearchRequest {
        q: params.q,
        category: params.category,
        scope,
        filters: SearchFilters {
            status: params.status,
            phase: params.phase,
            start_date: params.start_date,
            end_date: params.end_date,
            indication_category: params.indication_category,
            severity: params.severity,
            procedure_category: params.procedure_category,
            risk_level: params.risk_level,
            min_duration: params.min_duration,
            max_duration: params.max_duration,
        },
        page: params.page.unwrap_or(1),
        per_page,
    };

    let response = state.search.search(&request, optional_user(&headers)).await?;

    Ok(Json(response))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    #[validate(length(min = 1))]
    pub q: String,
    pub category: Option<String>,
    pub status: Option<String>,
    pub phase: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub indication_category: Option<String>,
    pub severity: Option<String>,
    pub procedure_category: Option<String>,
    pub risk_level: Option<String>,
    pub min_duration: Option<u32>,
    pub max_duration: Option<u32>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1))]
    pub per_page: Option<u32>,
}

/// Get search suggestions based on partial input
pub async fn suggest(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Result<Json<SuggestResponse>> {
    let min_chars = state.search.config().suggestion_min_chars;
    if params.q.chars().count() < min_chars {
        return Err(AppError::Validation(format!(
            "q must be at least {} characters",
            min_chars
        )));
    }

    let suggestions = state.search.suggest(&params.q).await?;

    Ok(Json(SuggestResponse { suggestions }))
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<Suggestion>,
}

/// Get the search history for the current user
pub async fn get_search_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<SearchHistoryResponse>>> {
    let user_id = required_user(&headers)?;

    let entries = state.history.list_entries(&user_id, false).await?;

    Ok(Json(
        entries.into_iter().map(SearchHistoryResponse::from).collect(),
    ))
}

/// Record a search in history explicitly
pub async fn record_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RecordSearchRequest>,
) -> Result<Json<StatusResponse>> {
    request.validate()?;
    let user_id = required_user(&headers)?;

    let mut entry = SearchHistoryEntry::new(
        user_id,
        request.query,
        request.category,
        request.filters,
        request.results_count,
    );
    entry.is_saved = request.is_saved;

    state.history.save_entry(&entry).await?;
    tracing::info!(user_id = %user_id, entry_id = %entry.id, "Search recorded in history");

    Ok(Json(StatusResponse {
        success: true,
        message: "Search saved successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordSearchRequest {
    #[validate(length(min = 1))]
    pub query: String,
    pub category: Option<String>,
    #[serde(default)]
    pub filters: serde_json::Value,
    #[serde(default)]
    pub results_count: u64,
    #[serde(default)]
    pub is_saved: bool,
}

/// Pin a history entry as a saved search
pub async fn save_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>> {
    let user_id = required_user(&headers)?;

    let mut entry = state
        .history
        .get_entry(&id)
        .await?
        .filter(|entry| entry.user_id == user_id)
        .ok_or_else(|| AppError::NotFound("Search not found".to_string()))?;

    entry.mark_saved();
    state.history.update_entry(&entry).await?;
    tracing::info!(user_id = %user_id, entry_id = %id, "Search pinned as saved");

    Ok(Json(StatusResponse {
        success: true,
        message: "Search saved successfully".to_string(),
    }))
}

/// Get all saved searches for the current user
pub async fn get_saved_searches(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<SearchHistoryResponse>>> {
    let user_id = required_user(&headers)?;

    let entries = state.history.list_entries(&user_id, true).await?;

    Ok(Json(
        entries.into_iter().map(SearchHistoryResponse::from).collect(),
    ))
}

/// Re-execute a saved search, returning its stored parameters verbatim
pub async fn execute_saved_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<ExecuteSavedSearchResponse>> {
    let user_id = required_user(&headers)?;

    let mut entry = state
        .history
        .get_entry(&id)
        .await?
        .filter(|entry| entry.user_id == user_id && entry.is_saved)
        .ok_or_else(|| AppError::NotFound("Saved search not found".to_string()))?;

    entry.record_use();
    state.history.update_entry(&entry).await?;
    tracing::info!(user_id = %user_id, entry_id = %id, use_count = entry.use_count, "Saved search executed");

    Ok(Json(ExecuteSavedSearchResponse {
        query: entry.query,
        category: entry.category,
        filters: entry.filters,
        success: true,
    }))
}

#[derive(Debug, Serialize)]
pub struct ExecuteSavedSearchResponse {
    pub query: String,
    pub category: Option<String>,
    pub filters: serde_json::Value,
    pub success: bool,
}

/// Unpin a saved search; the underlying history row is retained
pub async fn delete_saved_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>> {
    let user_id = required_user(&headers)?;

    let mut entry = state
        .history
        .get_entry(&id)
        .await?
        .filter(|entry| entry.user_id == user_id && entry.is_saved)
        .ok_or_else(|| AppError::NotFound("Saved search not found".to_string()))?;

    entry.mark_unsaved();
    state.history.update_entry(&entry).await?;
    tracing::info!(user_id = %user_id, entry_id = %id, "Saved search unpinned");

    Ok(Json(StatusResponse {
        success: true,
        message: "Saved search deleted successfully".to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

/// Search history entry DTO
#[derive(Debug, Serialize)]
pub struct SearchHistoryResponse {
    pub id: Uuid,
    pub query: String,
    pub category: Option<String>,
    pub filters: serde_json::Value,
    pub results_count: u64,
    pub created_at: DateTime<Utc>,
    pub is_saved: bool,
    pub last_used: DateTime<Utc>,
    pub use_count: u32,
}

impl From<SearchHistoryEntry> for SearchHistoryResponse {
    fn from(entry: SearchHistoryEntry) -> Self {
        Self {
            id: entry.id,
            query: entry.query,
            category: entry.category,
            filters: entry.filters,
            results_count: entry.results_count,
            created_at: entry.created_at,
            is_saved: entry.is_saved,
            last_used: entry.last_used,
            use_count: entry.use_count,
        }
    }
}
