//! Database Layer
//!
//! Item storage behind the `ItemStore` trait:
//!
//! - `MemoryStore`: document-style backend, filters evaluated in process
//! - `TursoStore`: relational backend on libsql, filters rendered to SQL
//!
//! # Architecture
//!
//! Services only ever talk to `Arc<dyn ItemStore>`. Both backends receive the
//! same `CompiledFilter` and must agree on which items it selects, including
//! for null and negated predicates.

mod error;
mod item_store;
mod memory_store;
mod turso_store;

pub use error::DatabaseError;
pub use item_store::ItemStore;
pub use memory_store::MemoryStore;
pub use turso_store::TursoStore;
