//! ItemStore Trait - Storage Abstraction Layer
//!
//! `ItemStore` is the seam between the item service and a storage engine.
//! Two backends implement it:
//!
//! - `MemoryStore`: document-style, evaluates compiled filters in process
//! - `TursoStore`: relational (libsql), renders compiled filters to SQL
//!
//! Both must return identical item lists for the same compiled filter.
//!
//! # Contract
//!
//! - `query_items` returns matches in insertion order; sorting happens above
//! - `update_item` applies the whole patch atomically and bumps `version`
//! - `next_sequence` is atomic per `(list, field)` and never hands out a
//!   number twice, deleted items included

use crate::db::DatabaseError;
use crate::filters::CompiledFilter;
use crate::models::{Item, ItemPatch, ListSchema};
use async_trait::async_trait;

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Create storage for a list (idempotent)
    async fn prepare_list(&self, schema: &ListSchema) -> Result<(), DatabaseError>;

    /// Next value of the AutoIncrement sequence for `field` on `list`, starting at 1
    async fn next_sequence(&self, list: &str, field: &str) -> Result<i64, DatabaseError>;

    async fn insert_item(&self, schema: &ListSchema, item: &Item) -> Result<(), DatabaseError>;

    async fn get_item(&self, schema: &ListSchema, id: &str) -> Result<Option<Item>, DatabaseError>;

    /// Apply `patch` to an item, returning the updated item or `None` if it does not exist
    async fn update_item(
        &self,
        schema: &ListSchema,
        id: &str,
        patch: &ItemPatch,
    ) -> Result<Option<Item>, DatabaseError>;

    /// Returns whether an item was removed
    async fn delete_item(&self, schema: &ListSchema, id: &str) -> Result<bool, DatabaseError>;

    /// Items matching `filter`, in insertion order
    async fn query_items(
        &self,
        schema: &ListSchema,
        filter: &CompiledFilter,
    ) -> Result<Vec<Item>, DatabaseError>;

    /// Short backend identifier for logs
    fn backend_name(&self) -> &'static str;
}
