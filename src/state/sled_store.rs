use crate::error::{AppError, Result};
use crate::models::{
    DataProduct, Indication, Procedure, SearchHistoryEntry, SearchRecord, Study,
};
use crate::search::project::Suggestion;
use crate::search::query::{rank_records, RecordQuery};
use crate::state::{HistoryStore, RecordStore};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Persistent record store using the Sled embedded database.
///
/// Record trees are serialized with bincode; the history tree uses JSON
/// because its `filters` blob is an opaque `serde_json::Value`.
#[derive(Clone)]
pub struct SledStore {
    db: Arc<Db>,
    studies_tree: sled::Tree,
    indications_tree: sled::Tree,
    procedures_tree: sled::Tree,
    products_tree: sled::Tree,
    study_products_tree: sled::Tree,
    history_tree: sled::Tree,
}

impl SledStore {
    /// Create a new Sled store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref();
        let db = sled::open(&path)
            .map_err(|e| AppError::Internal(format!("Failed to open Sled database: {}", e)))?;

        let studies_tree = Self::open_tree(&db, "studies")?;
        let indications_tree = Self::open_tree(&db, "indications")?;
        let procedures_tree = Self::open_tree(&db, "procedures")?;
        let products_tree = Self::open_tree(&db, "data_products")?;
        let study_products_tree = Self::open_tree(&db, "study_products")?;
        let history_tree = Self::open_tree(&db, "search_history")?;

        tracing::info!("Initialized Sled store at {:?}", path_str);

        Ok(Self {
            db: Arc::new(db),
            studies_tree,
            indications_tree,
            procedures_tree,
            products_tree,
            study_products_tree,
            history_tree,
        })
    }

    fn open_tree(db: &Db, name: &str) -> Result<sled::Tree> {
        db.open_tree(name)
            .map_err(|e| AppError::Internal(format!("Failed to open {} tree: {}", name, e)))
    }

    /// Serialize a record value to bytes
    fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize record: {}", e)))
    }

    /// Deserialize a record value from bytes
    fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes)
            .map_err(|e| AppError::Serialization(format!("Failed to deserialize record: {}", e)))
    }

    /// Get a record key
    fn record_key(id: &Uuid) -> Vec<u8> {
        id.as_bytes().to_vec()
    }

    fn insert(tree: &sled::Tree, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        tree.insert(key, value)
            .map_err(|e| AppError::Database(format!("Failed to write record: {}", e)))?;
        tree.flush()
            .map_err(|e| AppError::Database(format!("Failed to flush tree: {}", e)))?;
        Ok(())
    }

    /// Update the study → data-product index
    fn update_product_index(&self, product: &DataProduct) -> Result<()> {
        let key = Self::record_key(&product.study_id);

        let mut product_ids: Vec<Uuid> = match self
            .study_products_tree
            .get(&key)
            .map_err(|e| AppError::Database(format!("Failed to read product index: {}", e)))?
        {
            Some(existing) => Self::deserialize(&existing)?,
            None => Vec::new(),
        };

        if !product_ids.contains(&product.id) {
            product_ids.push(product.id);
        }

        Self::insert(
            &self.study_products_tree,
            key,
            Self::serialize(&product_ids)?,
        )
    }

    /// Deserialize every value in a tree into typed records
    fn collect_tree<T: DeserializeOwned>(tree: &sled::Tree) -> Result<Vec<T>> {
        let mut values = Vec::new();
        for result in tree.iter() {
            let (_, bytes) = result
                .map_err(|e| AppError::Database(format!("Failed to iterate tree: {}", e)))?;
            values.push(Self::deserialize(&bytes)?);
        }
        Ok(values)
    }

    /// All records in variant order: studies, indications, procedures
    fn all_records(&self) -> Result<Vec<SearchRecord>> {
        let mut records: Vec<SearchRecord> = Vec::new();
        records.extend(
            Self::collect_tree::<Study>(&self.studies_tree)?
                .into_iter()
                .map(SearchRecord::Study),
        );
        records.extend(
            Self::collect_tree::<Indication>(&self.indications_tree)?
                .into_iter()
                .map(SearchRecord::Indication),
        );
        records.extend(
            Self::collect_tree::<Procedure>(&self.procedures_tree)?
                .into_iter()
                .map(SearchRecord::Procedure),
        );
        Ok(records)
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| AppError::Database(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SledStore {
    async fn save_study(&self, study: &Study) -> Result<()> {
        Self::insert(
            &self.studies_tree,
            Self::record_key(&study.id),
            Self::serialize(study)?,
        )?;
        tracing::debug!(study_id = %study.id, "Study saved to Sled");
        Ok(())
    }

    async fn save_indication(&self, indication: &Indication) -> Result<()> {
        Self::insert(
            &self.indications_tree,
            Self::record_key(&indication.id),
            Self::serialize(indication)?,
        )?;
        tracing::debug!(indication_id = %indication.id, "Indication saved to Sled");
        Ok(())
    }

    async fn save_procedure(&self, procedure: &Procedure) -> Result<()> {
        Self::insert(
            &self.procedures_tree,
            Self::record_key(&procedure.id),
            Self::serialize(procedure)?,
        )?;
        tracing::debug!(procedure_id = %procedure.id, "Procedure saved to Sled");
        Ok(())
    }

    async fn save_data_product(&self, product: &DataProduct) -> Result<()> {
        Self::insert(
            &self.products_tree,
            Self::record_key(&product.id),
            Self::serialize(product)?,
        )?;
        self.update_product_index(product)?;
        tracing::debug!(product_id = %product.id, study_id = %product.study_id, "Data product saved to Sled");
        Ok(())
    }

    async fn get_study(&self, id: &Uuid) -> Result<Option<Study>> {
        match self
            .studies_tree
            .get(Self::record_key(id))
            .map_err(|e| AppError::Database(format!("Failed to get study: {}", e)))?
        {
            Some(bytes) => Ok(Some(Self::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn data_products_for_study(&self, study_id: &Uuid) -> Result<Vec<DataProduct>> {
        let key = Self::record_key(study_id);

        let product_ids: Vec<Uuid> = match self
            .study_products_tree
            .get(&key)
            .map_err(|e| AppError::Database(format!("Failed to query product index: {}", e)))?
        {
            Some(bytes) => Self::deserialize(&bytes)?,
            None => return Ok(Vec::new()),
        };

        let mut products = Vec::with_capacity(product_ids.len());
        for id in product_ids {
            let bytes = self
                .products_tree
                .get(Self::record_key(&id))
                .map_err(|e| AppError::Database(format!("Failed to get data product: {}", e)))?
                .ok_or_else(|| {
                    AppError::Database(format!("Data product {} missing from store", id))
                })?;
            products.push(Self::deserialize(&bytes)?);
        }

        Ok(products)
    }

    async fn list_records(
        &self,
        query: &RecordQuery,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<SearchRecord>> {
        let mut records: Vec<SearchRecord> = self
            .all_records()?
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
            .all_records()?
            .iter()
            .filter(|record| query.matches(record))
            .count();

        Ok(count as u64)
    }

    async fn suggest_titles(&self, fragment: &str, limit: usize) -> Result<Vec<Suggestion>> {
        let fragment = fragment.to_lowercase();
        let mut seen: Vec<String> = Vec::new();
        let mut suggestions = Vec::new();

        for record in self.all_records()? {
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
impl HistoryStore for SledStore {
    async fn save_entry(&self, entry: &SearchHistoryEntry) -> Result<()> {
        let value = serde_json::to_vec(entry)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize entry: {}", e)))?;
        Self::insert(&self.history_tree, Self::record_key(&entry.id), value)?;
        tracing::debug!(entry_id = %entry.id, "History entry saved to Sled");
        Ok(())
    }

    async fn get_entry(&self, id: &Uuid) -> Result<Option<SearchHistoryEntry>> {
        match self
            .history_tree
            .get(Self::record_key(id))
            .map_err(|e| AppError::Database(format!("Failed to get history entry: {}", e)))?
        {
            Some(bytes) => {
                let entry = serde_json::from_slice(&bytes).map_err(|e| {
                    AppError::Serialization(format!("Failed to deserialize entry: {}", e))
                })?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    async fn update_entry(&self, entry: &SearchHistoryEntry) -> Result<()> {
        let key = Self::record_key(&entry.id);

        if !self
            .history_tree
            .contains_key(&key)
            .map_err(|e| AppError::Database(format!("Failed to check entry existence: {}", e)))?
        {
            return Err(AppError::NotFound(format!(
                "History entry {} not found",
                entry.id
            )));
        }

        let value = serde_json::to_vec(entry)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize entry: {}", e)))?;
        Self::insert(&self.history_tree, key, value)?;
        tracing::debug!(entry_id = %entry.id, "History entry updated in Sled");
        Ok(())
    }

    async fn list_entries(
        &self,
        user_id: &Uuid,
        saved_only: bool,
    ) -> Result<Vec<SearchHistoryEntry>> {
        let mut entries: Vec<SearchHistoryEntry> = Vec::new();

        for result in self.history_tree.iter() {
            let (_, bytes) = result
                .map_err(|e| AppError::Database(format!("Failed to iterate history: {}", e)))?;
            let entry: SearchHistoryEntry = serde_json::from_slice(&bytes).map_err(|e| {
                AppError::Serialization(format!("Failed to deserialize entry: {}", e))
            })?;

            if entry.user_id == *user_id && (!saved_only || entry.is_saved) {
                entries.push(entry);
            }
        }

        if saved_only {
            entries.sort_by(|a, b| b.last_used.cmp(&a.last_used));
        } else {
            entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }

        Ok(entries)
    }
}
