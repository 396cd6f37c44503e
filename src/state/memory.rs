use crate::error::{AppError, Result};
use crate::models::{
    DataProduct, Indication, Procedure, SearchHistoryEntry, SearchRecord, Study,
};
use crate::search::project::Suggestion;
use crate::search::query::{rank_records, RecordQuery};
use crate::state::{HistoryStore, RecordStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory record store (for development and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    studies: Arc<DashMap<Uuid, Study>>,
    indications: Arc<DashMap<Uuid, Indication>>,
    procedures: Arc<DashMap<Uuid, Procedure>>,
    data_products: Arc<DashMap<Uuid, DataProduct>>,
    study_product_index: Arc<DashMap<Uuid, Vec<Uuid>>>,
    history: Arc<DashMap<Uuid, SearchHistoryEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            studies: Arc::new(DashMap::new()),
            indications: Arc::new(DashMap::new()),
            procedures: Arc::new(DashMap::new()),
            data_products: Arc::new(DashMap::new()),
            study_product_index: Arc::new(DashMap::new()),
            history: Arc::new(DashMap::new()),
        }
    }

    /// All records in the scope's variant order: studies, indications,
    /// procedures
    fn all_records(&self) -> Vec<SearchRecord> {
        let mut records: Vec<SearchRecord> = Vec::new();
        records.extend(
            self.studies
                .iter()
                .map(|entry| SearchRecord::Study(entry.value().clone())),
        );
        records.extend(
            self.indications
                .iter()
                .map(|entry| SearchRecord::Indication(entry.value().clone())),
        );
        records.extend(
            self.procedures
                .iter()
                .map(|entry| SearchRecord::Procedure(entry.value().clone())),
        );
        records
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn save_study(&self, study: &Study) -> Result<()> {
        self.studies.insert(study.id, study.clone());
        tracing::debug!(study_id = %study.id, "Study saved");
        Ok(())
    }

    async fn save_indication(&self, indication: &Indication) -> Result<()> {
        self.indications.insert(indication.id, indication.clone());
        tracing::debug!(indication_id = %indication.id, "Indication saved");
        Ok(())
    }

    async fn save_procedure(&self, procedure: &Procedure) -> Result<()> {
        self.procedures.insert(procedure.id, procedure.clone());
        tracing::debug!(procedure_id = %procedure.id, "Procedure saved");
        Ok(())
    }

    async fn save_data_product(&self, product: &DataProduct) -> Result<()> {
        self.data_products.insert(product.id, product.clone());

        let mut index = self
            .study_product_index
            .entry(product.study_id)
            .or_insert_with(Vec::new);
        if !index.contains(&product.id) {
            index.push(product.id);
        }

        tracing::debug!(product_id = %product.id, study_id = %product.study_id, "Data product saved");
        Ok(())
    }

    async fn get_study(&self, id: &Uuid) -> Result<Option<Study>> {
        Ok(self.studies.get(id).map(|entry| entry.clone()))
    }

    async fn data_products_for_study(&self, study_id: &Uuid) -> Result<Vec<DataProduct>> {
        let Some(product_ids) = self.study_product_index.get(study_id) else {
            return Ok(Vec::new());
        };

        product_ids
            .iter()
            .map(|id| {
                self.data_products
                    .get(id)
                    .map(|entry| entry.clone())
                    .ok_or_else(|| {
                        AppError::Database(format!("Data product {} missing from store", id))
                    })
            })
            .collect()
    }

    async fn list_records(
        &self,
        query: &RecordQuery,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<SearchRecord>> {
        let mut records: Vec<SearchRecord> = self
            .all_records()
            .into_iter()
            .filter(|record| query.matches(record))
            .collect();

        rank_records(&mut records);

        let start = page.saturating_sub(1) as usize * per_page as usize;

        Ok(records
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect())
    }

    async fn count_records(&self, query: &RecordQuery) -> Result<u64> {
        let count = self
            .all_records()
            .iter()
            .filter(|record| query.matches(record))
            .count();

        Ok(count as u64)
    }

    async fn suggest_titles(&self, fragment: &str, limit: usize) -> Result<Vec<Suggestion>> {
        let fragment = fragment.to_lowercase();
        let mut seen: Vec<String> = Vec::new();
        let mut suggestions = Vec::new();

        for record in self.all_records() {
            if suggestions.len() >= limit {
                break;
            }

            let title = record.title();
            if title.to_lowercase().contains(&fragment) && !seen.contains(&title.to_string()) {
                seen.push(title.to_string());
                suggestions.push(Suggestion {
                    text: title.to_string(),
                    record_type: record.record_type(),
                });
            }
        }

        Ok(suggestions)
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    async fn save_entry(&self, entry: &SearchHistoryEntry) -> Result<()> {
        self.history.insert(entry.id, entry.clone());
        tracing::debug!(entry_id = %entry.id, "History entry saved");
        Ok(())
    }

    async fn get_entry(&self, id: &Uuid) -> Result<Option<SearchHistoryEntry>> {
        Ok(self.history.get(id).map(|entry| entry.clone()))
    }

    async fn update_entry(&self, entry: &SearchHistoryEntry) -> Result<()> {
        if self.history.contains_key(&entry.id) {
            self.history.insert(entry.id, entry.clone());
            tracing::debug!(entry_id = %entry.id, "History entry updated");
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "History entry {} not found",
                entry.id
            )))
        }
    }

    async fn list_entries(
        &self,
        user_id: &Uuid,
        saved_only: bool,
    ) -> Result<Vec<SearchHistoryEntry>> {
        let mut entries: Vec<SearchHistoryEntry> = self
            .history
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|entry| entry.user_id == *user_id && (!saved_only || entry.is_saved))
            .collect();

        if saved_only {
            entries.sort_by(|a, b| b.last_used.cmp(&a.last_used));
        } else {
            entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecordScope, RecordType};
    use chrono::NaiveDate;

    fn sample_study(title: &str) -> Study {
        Study::new(
            title.to_string(),
            "Description".to_string(),
            "Recruiting".to_string(),
            "Phase I".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
    }

    fn query_for(term: &str) -> RecordQuery {
        RecordQuery {
            terms: vec![term.to_string()],
            scope: RecordScope::All,
            filters: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_save_and_get_study() {
        let store = InMemoryStore::new();
        let study = sample_study("Immunotherapy Trial");
        let id = study.id;

        store.save_study(&study).await.unwrap();

        let retrieved = store.get_study(&id).await.unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().id, id);
    }

    #[tokio::test]
    async fn test_count_is_independent_of_pagination() {
        let store = InMemoryStore::new();
        for i in 0..25 {
            store
                .save_study(&sample_study(&format!("Cancer Study {}", i)))
                .await
                .unwrap();
        }

        let query = query_for("cancer");
        assert_eq!(store.count_records(&query).await.unwrap(), 25);

        let page = store.list_records(&query, 2, 10).await.unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(store.count_records(&query).await.unwrap(), 25);
    }

    #[tokio::test]
    async fn test_data_product_index() {
        let store = InMemoryStore::new();
        let study = sample_study("Radiation Study");
        store.save_study(&study).await.unwrap();

        let product = DataProduct::new(
            study.id,
            "Imaging Dataset".to_string(),
            "DICOM exports".to_string(),
            "Dataset".to_string(),
            "DICOM".to_string(),
        );
        store.save_data_product(&product).await.unwrap();

        let products = store.data_products_for_study(&study.id).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, product.id);

        let none = store
            .data_products_for_study(&Uuid::new_v4())
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_suggest_titles_distinct_and_capped() {
        let store = InMemoryStore::new();
        for title in ["Cancer Study 1", "Cardiac Study", "Diabetes Study"] {
            store.save_study(&sample_study(title)).await.unwrap();
        }

        let suggestions = store.suggest_titles("Ca", 5).await.unwrap();
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions
            .iter()
            .all(|s| s.record_type == RecordType::Study));
        assert!(suggestions
            .iter()
            .all(|s| s.text.to_lowercase().contains("ca")));
    }

    #[tokio::test]
    async fn test_history_listing_orders() {
        let store = InMemoryStore::new();
        let user = Uuid::new_v4();

        let mut first = SearchHistoryEntry::new(
            user,
            "first".to_string(),
            None,
            serde_json::Value::Null,
            0,
        );
        let second = SearchHistoryEntry::new(
            user,
            "second".to_string(),
            None,
            serde_json::Value::Null,
            0,
        );

        first.mark_saved();
        store.save_entry(&first).await.unwrap();
        store.save_entry(&second).await.unwrap();

        let all = store.list_entries(&user, false).await.unwrap();
        assert_eq!(all.len(), 2);

        let saved = store.list_entries(&user, true).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].query, "first");
    }

    #[tokio::test]
    async fn test_update_missing_entry_fails() {
        let store = InMemoryStore::new();
        let entry = SearchHistoryEntry::new(
            Uuid::new_v4(),
            "orphan".to_string(),
            None,
            serde_json::Value::Null,
            0,
        );

        let result = store.update_entry(&entry).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
