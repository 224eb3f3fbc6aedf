//! Items
//!
//! An item is one record of a list: a mapping from field name to stored
//! value. A field without an entry is null.

use crate::behaviors::FieldBehavior;
use crate::models::{FieldDescriptor, StoredValue};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Server-generated UUID v4
    pub id: String,
    /// Key of the owning list
    pub list: String,
    pub values: BTreeMap<String, StoredValue>,
    /// Starts at 1, incremented by every update
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Item {
    pub fn new(list: impl Into<String>, values: BTreeMap<String, StoredValue>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            list: list.into(),
            values,
            version: 1,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn get(&self, field: &str) -> Option<&StoredValue> {
        self.values.get(field)
    }

    pub fn is_null(&self, field: &str) -> bool {
        !self.values.contains_key(field)
    }

    /// Apply a patch in place (`None` clears the field)
    pub fn apply(&mut self, patch: &ItemPatch) {
        for (field, value) in &patch.values {
            match value {
                Some(value) => {
                    self.values.insert(field.clone(), value.clone());
                }
                None => {
                    self.values.remove(field);
                }
            }
        }
    }

    /// External representation of the item for the given fields
    ///
    /// Every listed field is present in the output; null fields render as `null`.
    pub fn to_json(&self, fields: &[&FieldDescriptor]) -> Value {
        let mut object = Map::new();
        object.insert("id".to_string(), Value::String(self.id.clone()));

        for field in fields {
            let value = match self.values.get(&field.name) {
                Some(value) => field.kind.denormalize(value),
                None => Value::Null,
            };
            object.insert(field.name.clone(), value);
        }

        Value::Object(object)
    }
}

/// Partial update of an item
///
/// Fields absent from the patch are untouched; `Some(None)` sets null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub values: BTreeMap<String, Option<StoredValue>>,
}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: Option<StoredValue>) -> Self {
        self.values.insert(field.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
