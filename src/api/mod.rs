pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::search::SearchService;
use crate::state::HistoryStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    pub history: Arc<dyn HistoryStore>,
}

impl AppState {
    pub fn new(search: Arc<SearchService>, history: Arc<dyn HistoryStore>) -> Self {
        Self { search, history }
    }
}
