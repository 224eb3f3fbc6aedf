//! Data Models
//!
//! This module contains the core data structures of the field layer:
//!
//! - `FieldDescriptor` / `FieldKind` - what a field is and how it is stored
//! - `StoredValue` / `FilterValue` - canonical values and filter literals
//! - `Item` / `ItemPatch` - records of a list and partial updates to them
//! - `ListSchema` - validated, immutable set of fields for one list

mod error;
mod field;
mod item;
mod schema;
mod value;

pub use error::ValidationError;
pub use field::{
    FieldConfig, FieldDescriptor, FieldKind, FieldType, StorageShape, OEMBED_SUB_FIELDS,
};
pub use item::{Item, ItemPatch};
pub use schema::{ListDefinition, ListSchema};
pub use value::{fold_case, FilterValue, StoredValue};
