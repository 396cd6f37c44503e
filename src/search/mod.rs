//! Search engine core
//!
//! Turns a free-text query plus structured filters into a paginated,
//! ranked result set spanning studies, indications, and procedures:
//!
//! - [`tokenizer`] — splits the raw query on the literal `" OR "`
//! - [`query`] — per-term substring predicates, filter stack, ranking
//! - [`project`] — uniform result shape with data-product attachment
//! - [`service`] — orchestration: count, fetch, project, record history

pub mod project;
pub mod query;
pub mod service;
pub mod tokenizer;

pub use project::{SearchResult, Suggestion};
pub use query::{RecordQuery, SearchFilters};
pub use service::{SearchRequest, SearchResponse, SearchService};
pub use tokenizer::tokenize_query;
