//! MemoryStore - Document-style ItemStore
//!
//! Items are kept as typed records per list, in insertion order. Compiled
//! filters are evaluated in process with `CompiledFilter::matches`.

use crate::db::{DatabaseError, ItemStore};
use crate::filters::CompiledFilter;
use crate::models::{Item, ItemPatch, ListSchema};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};

#[derive(Default)]
pub struct MemoryStore {
    lists: RwLock<HashMap<String, Vec<Item>>>,
    sequences: Mutex<HashMap<(String, String), i64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items currently stored for a list
    pub async fn len(&self, list: &str) -> usize {
        self.lists.read().await.get(list).map_or(0, Vec::len)
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn prepare_list(&self, schema: &ListSchema) -> Result<(), DatabaseError> {
        self.lists
            .write()
            .await
            .entry(schema.key().to_string())
            .or_default();
        Ok(())
    }

    async fn next_sequence(&self, list: &str, field: &str) -> Result<i64, DatabaseError> {
        let mut sequences = self.sequences.lock().await;
        let value = sequences
            .entry((list.to_string(), field.to_string()))
            .or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn insert_item(&self, schema: &ListSchema, item: &Item) -> Result<(), DatabaseError> {
        let mut lists = self.lists.write().await;
        let items = lists
            .get_mut(schema.key())
            .ok_or_else(|| DatabaseError::list_not_prepared(schema.key()))?;

        if items.iter().any(|existing| existing.id == item.id) {
            return Err(DatabaseError::sql_execution(format!(
                "Item '{}' already exists in list '{}'",
                item.id,
                schema.key()
            )));
        }

        items.push(item.clone());
        Ok(())
    }

    async fn get_item(&self, schema: &ListSchema, id: &str) -> Result<Option<Item>, DatabaseError> {
        let lists = self.lists.read().await;
        let items = lists
            .get(schema.key())
            .ok_or_else(|| DatabaseError::list_not_prepared(schema.key()))?;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn update_item(
        &self,
        schema: &ListSchema,
        id: &str,
        patch: &ItemPatch,
    ) -> Result<Option<Item>, DatabaseError> {
        let mut lists = self.lists.write().await;
        let items = lists
            .get_mut(schema.key())
            .ok_or_else(|| DatabaseError::list_not_prepared(schema.key()))?;

        let Some(item) = items.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };

        item.apply(patch);
        item.version += 1;
        item.modified_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn delete_item(&self, schema: &ListSchema, id: &str) -> Result<bool, DatabaseError> {
        let mut lists = self.lists.write().await;
        let items = lists
            .get_mut(schema.key())
            .ok_or_else(|| DatabaseError::list_not_prepared(schema.key()))?;

        let before = items.len();
        items.retain(|item| item.id != id);
        Ok(items.len() != before)
    }

    async fn query_items(
        &self,
        schema: &ListSchema,
        filter: &CompiledFilter,
    ) -> Result<Vec<Item>, DatabaseError> {
        let lists = self.lists.read().await;
        let items = lists
            .get(schema.key())
            .ok_or_else(|| DatabaseError::list_not_prepared(schema.key()))?;

        Ok(items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
