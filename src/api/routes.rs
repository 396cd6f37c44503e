use crate::api::{handlers, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::health_check))
        // Search
        .route("/api/search", get(handlers::search))
        .route("/api/suggest", get(handlers::suggest))
        // Search history
        .route("/api/search-history", get(handlers::get_search_history))
        .route("/api/search-history", post(handlers::record_search))
        .route("/api/search-history/:id/save", post(handlers::save_search))
        // Saved searches
        .route("/api/saved-searches", get(handlers::get_saved_searches))
        .route(
            "/api/saved-searches/:id/execute",
            post(handlers::execute_saved_search),
        )
        .route("/api/saved-searches/:id", delete(handlers::delete_saved_search))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
