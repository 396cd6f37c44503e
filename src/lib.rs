//! BioMed Search
//!
//! A biomedical search service over clinical studies, indications, and
//! procedures. The core engine turns a free-text query plus structured
//! filters into a paginated, ranked result set with attached data
//! products; around it sit per-user search history, saved searches, and a
//! suggestion lookup.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod state;
