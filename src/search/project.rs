//! Result projection
//!
//! Maps matched records into the uniform response shape. Each variant
//! projects its fixed field set explicitly; fields a variant does not have
//! stay `None` rather than carrying sentinel values.

use crate::models::{DataProduct, RecordType, SearchRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Uniform search result across all record types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Record identifier
    pub id: Uuid,

    /// Record title
    pub title: String,

    /// Record-type discriminator
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Record description
    pub description: String,

    /// Recruitment status (studies only)
    pub status: Option<String>,

    /// Trial phase (studies only)
    pub phase: Option<String>,

    /// Severity classification (indications only)
    pub severity: Option<String>,

    /// Risk classification (procedures only)
    pub risk_level: Option<String>,

    /// Static relevance score
    pub relevance_score: f64,

    /// Data products attached to the record (studies only, empty otherwise)
    pub data_products: Vec<DataProductSummary>,
}

/// Data-product fields exposed in search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataProductSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub format: String,
    pub study_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<DataProduct> for DataProductSummary {
    fn from(product: DataProduct) -> Self {
        Self {
            id: product.id,
            title: product.title,
            description: product.description,
            product_type: product.product_type,
            format: product.format,
            study_id: product.study_id,
            created_at: product.created_at,
        }
    }
}

/// A suggested completion for a partial query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Suggested title text
    pub text: String,

    /// Record type the title belongs to
    #[serde(rename = "type")]
    pub record_type: RecordType,
}

/// Project a matched record, attaching the data products already resolved
/// for it (studies only; callers pass an empty list for other variants).
pub fn project_record(record: &SearchRecord, data_products: Vec<DataProduct>) -> SearchResult {
    match record {
        SearchRecord::Study(study) => SearchResult {
            id: study.id,
            title: study.title.clone(),
            record_type: RecordType::Study,
            description: study.description.clone(),
            status: Some(study.status.clone()),
            phase: Some(study.phase.clone()),
            severity: None,
            risk_level: None,
            relevance_score: study.relevance_score,
            data_products: data_products.into_iter().map(Into::into).collect(),
        },
        SearchRecord::Indication(indication) => SearchResult {
            id: indication.id,
            title: indication.title.clone(),
            record_type: RecordType::Indication,
            description: indication.description.clone(),
            status: None,
            phase: None,
            severity: Some(indication.severity.clone()),
            risk_level: None,
            relevance_score: indication.relevance_score,
            data_products: Vec::new(),
        },
        SearchRecord::Procedure(procedure) => SearchResult {
            id: procedure.id,
            title: procedure.title.clone(),
            record_type: RecordType::Procedure,
            description: procedure.description.clone(),
            status: None,
            phase: None,
            severity: None,
            risk_level: Some(procedure.risk_level.clone()),
            relevance_score: procedure.relevance_score,
            data_products: Vec::new(),
        },
    }
}
