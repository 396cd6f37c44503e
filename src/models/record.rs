use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// A clinical study record
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Study {
    /// Unique identifier
    pub id: Uuid,

    /// Human-readable title
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Recruitment status (e.g. "Recruiting", "Completed")
    pub status: String,

    /// Trial phase (e.g. "Phase I")
    pub phase: String,

    /// First day of the study
    pub start_date: NaiveDate,

    /// Last day of the study
    pub end_date: NaiveDate,

    /// Static relevance score used for result ordering
    pub relevance_score: f64,
}

impl Study {
    /// Create a new study with the default relevance score
    pub fn new(
        title: String,
        description: String,
        status: String,
        phase: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            status,
            phase,
            start_date,
            end_date,
            relevance_score: 1.0,
        }
    }
}

/// A medical indication record
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Indication {
    /// Unique identifier
    pub id: Uuid,

    /// Human-readable title
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Indication category
    pub category: String,

    /// Severity classification (e.g. "Mild", "Severe")
    pub severity: String,

    /// Static relevance score used for result ordering
    pub relevance_score: f64,
}

impl Indication {
    /// Create a new indication with the default relevance score
    pub fn new(title: String, description: String, category: String, severity: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            category,
            severity,
            relevance_score: 1.0,
        }
    }
}

/// A medical procedure record
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Procedure {
    /// Unique identifier
    pub id: Uuid,

    /// Human-readable title
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Procedure category
    pub category: String,

    /// Risk classification (e.g. "Low", "High")
    pub risk_level: String,

    /// Duration in minutes
    pub duration: u32,

    /// Static relevance score used for result ordering
    pub relevance_score: f64,
}

impl Procedure {
    /// Create a new procedure with the default relevance score
    pub fn new(
        title: String,
        description: String,
        category: String,
        risk_level: String,
        duration: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            category,
            risk_level,
            duration,
            relevance_score: 1.0,
        }
    }
}

/// A downloadable artifact attached to exactly one study
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataProduct {
    /// Unique identifier
    pub id: Uuid,

    /// Human-readable title
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Product type (e.g. "Dataset", "Report")
    #[serde(rename = "type")]
    pub product_type: String,

    /// File format (e.g. "CSV", "PDF")
    pub format: String,

    /// Owning study
    pub study_id: Uuid,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl DataProduct {
    /// Create a new data product attached to the given study
    pub fn new(
        study_id: Uuid,
        title: String,
        description: String,
        product_type: String,
        format: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            product_type,
            format,
            study_id,
            created_at: Utc::now(),
        }
    }
}

/// Searchable record variants, each with its fixed field set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SearchRecord {
    Study(Study),
    Indication(Indication),
    Procedure(Procedure),
}

impl SearchRecord {
    pub fn id(&self) -> Uuid {
        match self {
            SearchRecord::Study(s) => s.id,
            SearchRecord::Indication(i) => i.id,
            SearchRecord::Procedure(p) => p.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SearchRecord::Study(s) => &s.title,
            SearchRecord::Indication(i) => &i.title,
            SearchRecord::Procedure(p) => &p.title,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            SearchRecord::Study(s) => &s.description,
            SearchRecord::Indication(i) => &i.description,
            SearchRecord::Procedure(p) => &p.description,
        }
    }

    pub fn relevance_score(&self) -> f64 {
        match self {
            SearchRecord::Study(s) => s.relevance_score,
            SearchRecord::Indication(i) => i.relevance_score,
            SearchRecord::Procedure(p) => p.relevance_score,
        }
    }

    pub fn record_type(&self) -> RecordType {
        match self {
            SearchRecord::Study(_) => RecordType::Study,
            SearchRecord::Indication(_) => RecordType::Indication,
            SearchRecord::Procedure(_) => RecordType::Procedure,
        }
    }
}

/// Record-type discriminator exposed in API responses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordType {
    Study,
    Indication,
    Procedure,
}

/// Record-type scope selected by the `category` query parameter
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordScope {
    #[default]
    All,
    Studies,
    Indications,
    Procedures,
}

impl RecordScope {
    /// Whether records of the given type fall inside this scope
    pub fn includes(&self, record_type: RecordType) -> bool {
        matches!(
            (self, record_type),
            (RecordScope::All, _)
                | (RecordScope::Studies, RecordType::Study)
                | (RecordScope::Indications, RecordType::Indication)
                | (RecordScope::Procedures, RecordType::Procedure)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_study_creation() {
        let study = Study::new(
            "Cancer Study 1: Immunotherapy".to_string(),
            "Investigation of novel cancer treatment".to_string(),
            "Recruiting".to_string(),
            "Phase I".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        );

        assert_eq!(study.status, "Recruiting");
        assert_eq!(study.relevance_score, 1.0);
    }

    #[test]
    fn test_record_accessors() {
        let procedure = Procedure::new(
            "Cardiac Catheterization".to_string(),
            "Minimally invasive heart procedure".to_string(),
            "Cardiology".to_string(),
            "Medium".to_string(),
            90,
        );
        let id = procedure.id;
        let record = SearchRecord::Procedure(procedure);

        assert_eq!(record.id(), id);
        assert_eq!(record.title(), "Cardiac Catheterization");
        assert_eq!(record.record_type(), RecordType::Procedure);
    }

    #[test]
    fn test_scope_includes() {
        assert!(RecordScope::All.includes(RecordType::Study));
        assert!(RecordScope::Studies.includes(RecordType::Study));
        assert!(!RecordScope::Studies.includes(RecordType::Indication));
        assert!(RecordScope::Procedures.includes(RecordType::Procedure));
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!("studies".parse::<RecordScope>(), Ok(RecordScope::Studies));
        assert_eq!("all".parse::<RecordScope>(), Ok(RecordScope::All));
        assert!("bogus".parse::<RecordScope>().is_err());
    }

    #[test]
    fn test_record_type_display() {
        assert_eq!(RecordType::Study.to_string(), "study");
        assert_eq!(RecordType::Indication.to_string(), "indication");
    }
}
