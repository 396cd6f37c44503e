//! Search query construction and matching
//!
//! A [`RecordQuery`] carries the tokenized terms, the record-type scope,
//! and the structured filter stack. Matching is pure computation shared by
//! every store backend so that counting and fetching agree on the
//! candidate set.

use crate::models::{RecordScope, SearchRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Optional structured filters, AND-conjoined when present.
///
/// Serialized with absent filters omitted, so the stored history blob
/// reflects exactly what the caller supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFilters {
    /// Study recruitment status, exact match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Study trial phase, exact match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    /// Study start date, inclusive lower bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// Study end date, inclusive upper bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    /// Indication category, exact match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indication_category: Option<String>,

    /// Indication severity, exact match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    /// Procedure category, exact match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure_category: Option<String>,

    /// Procedure risk level, exact match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,

    /// Procedure duration in minutes, inclusive lower bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_duration: Option<u32>,

    /// Procedure duration in minutes, inclusive upper bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<u32>,
}

impl SearchFilters {
    fn has_study_filters(&self) -> bool {
        self.status.is_some()
            || self.phase.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
    }

    fn has_indication_filters(&self) -> bool {
        self.indication_category.is_some() || self.severity.is_some()
    }

    fn has_procedure_filters(&self) -> bool {
        self.procedure_category.is_some()
            || self.risk_level.is_some()
            || self.min_duration.is_some()
            || self.max_duration.is_some()
    }

    /// Whether the record satisfies every active filter.
    ///
    /// A filter whose target field does not exist on the record's variant
    /// excludes that record while active: a severity filter narrows the
    /// result set to indications, a phase filter to studies, and so on.
    pub fn matches(&self, record: &SearchRecord) -> bool {
        match record {
            SearchRecord::Study(study) => {
                if self.has_indication_filters() || self.has_procedure_filters() {
                    return false;
                }

                self.status.as_ref().map_or(true, |s| *s == study.status)
                    && self.phase.as_ref().map_or(true, |p| *p == study.phase)
                    && self.start_date.map_or(true, |d| study.start_date >= d)
                    && self.end_date.map_or(true, |d| study.end_date <= d)
            }
            SearchRecord::Indication(indication) => {
                if self.has_study_filters() || self.has_procedure_filters() {
                    return false;
                }

                self.indication_category
                    .as_ref()
                    .map_or(true, |c| *c == indication.category)
                    && self.severity.as_ref().map_or(true, |s| *s == indication.severity)
            }
            SearchRecord::Procedure(procedure) => {
                if self.has_study_filters() || self.has_indication_filters() {
                    return false;
                }

                self.procedure_category
                    .as_ref()
                    .map_or(true, |c| *c == procedure.category)
                    && self.risk_level.as_ref().map_or(true, |r| *r == procedure.risk_level)
                    && self.min_duration.map_or(true, |d| procedure.duration >= d)
                    && self.max_duration.map_or(true, |d| procedure.duration <= d)
            }
        }
    }
}

/// Fully constructed query: terms, scope, and filter stack
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    /// Disjunctive search terms from the tokenizer
    pub terms: Vec<String>,

    /// Record-type scope from the `category` parameter
    pub scope: RecordScope,

    /// Structured filter stack
    pub filters: SearchFilters,
}

impl RecordQuery {
    /// Whether the record belongs to the query's candidate set
    pub fn matches(&self, record: &SearchRecord) -> bool {
        self.scope.includes(record.record_type())
            && self.matches_terms(record)
            && self.filters.matches(record)
    }

    /// OR across terms, OR across the variant's text fields within a term
    fn matches_terms(&self, record: &SearchRecord) -> bool {
        let title = record.title().to_lowercase();
        let description = record.description().to_lowercase();

        self.terms.iter().any(|term| {
            let term = term.to_lowercase();
            title.contains(&term) || description.contains(&term)
        })
    }
}

/// Order records by relevance score (descending), breaking ties by id so
/// pagination is deterministic.
pub fn rank_records(records: &mut [SearchRecord]) {
    records.sort_by(|a, b| {
        b.relevance_score()
            .partial_cmp(&a.relevance_score())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id().cmp(&b.id()))
    });
}
