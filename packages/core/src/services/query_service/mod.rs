//! Query Service - Filter Compilation, Sorting and Pagination
//!
//! This module executes list queries: the `where` object is compiled once
//! against the list schema, the resulting `CompiledFilter` is handed to the
//! store, and the matches are sorted and paginated in Rust.
//!
//! # Architecture
//!
//! - **Filtering**: done by the store (in process or as SQL), never reorders
//! - **Sorting**: stable, applied after filtering, nulls first when ascending
//! - **Pagination**: `skip` then `first`, applied after sorting
//!
//! # Examples
//!
//! ```rust,no_run
//! use fieldspace_core::access::RequestContext;
//! use fieldspace_core::config::CoreConfig;
//! use fieldspace_core::db::MemoryStore;
//! use fieldspace_core::models::{FieldDescriptor, ListSchema};
//! use fieldspace_core::services::{QueryDefinition, QueryService};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let schema = ListSchema::new("Test", vec![FieldDescriptor::text("name")])?;
//! let query_service = QueryService::new(Arc::new(MemoryStore::new()), CoreConfig::default());
//!
//! let query = QueryDefinition::new()
//!     .with_where(json!({ "name_starts_with": "a" }))
//!     .sort_by("name_ASC")
//!     .first(50);
//!
//! let items = query_service
//!     .execute(&schema, &query, &RequestContext::anonymous())
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::access::{authorize, check_input_fields, AccessContext, Operation, RequestContext};
use crate::behaviors::FieldBehavior;
use crate::config::CoreConfig;
use crate::db::ItemStore;
use crate::filters::{FilterCompiler, FilterError};
use crate::models::{FieldKind, Item, ListSchema};
use crate::services::ItemServiceError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Structured list query
///
/// Mirrors the arguments of an `all<List>` query: `where`, `sortBy`, `first`
/// and `skip`. `sortBy` accepts a single key or a list of keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDefinition {
    /// Flat where object; absent or `null` selects every item
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    /// Sort keys of the form `<field>_ASC` / `<field>_DESC`
    #[serde(default, deserialize_with = "one_or_many")]
    pub sort_by: Vec<String>,
    /// Maximum number of items returned
    #[serde(default)]
    pub first: Option<usize>,
    /// Number of items dropped from the front of the sorted result
    #[serde(default)]
    pub skip: Option<usize>,
}

impl QueryDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_where(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn sort_by(mut self, key: impl Into<String>) -> Self {
        self.sort_by.push(key.into());
        self
    }

    pub fn first(mut self, first: usize) -> Self {
        self.first = Some(first);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(key)) => vec![key],
        Some(OneOrMany::Many(keys)) => keys,
    })
}

/// Sort direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Ascending,
    #[serde(rename = "DESC")]
    Descending,
}

/// Sorting configuration for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortConfig {
    pub field: String,
    pub kind: FieldKind,
    pub direction: SortDirection,
}

impl SortConfig {
    /// Parse a `<field>_ASC` / `<field>_DESC` key against a schema
    ///
    /// The field must be part of the list's output type.
    pub fn parse(schema: &ListSchema, key: &str) -> Result<Self, FilterError> {
        let (name, suffix) = key
            .rsplit_once('_')
            .ok_or_else(|| FilterError::InvalidSort(key.to_string()))?;

        let direction = match suffix {
            "ASC" => SortDirection::Ascending,
            "DESC" => SortDirection::Descending,
            _ => return Err(FilterError::InvalidSort(key.to_string())),
        };

        let field = check_input_fields(schema, Operation::Read, [name])
            .ok()
            .and_then(|fields| fields.into_iter().next())
            .ok_or_else(|| FilterError::InvalidSort(key.to_string()))?;

        Ok(Self {
            field: field.name.clone(),
            kind: field.kind,
            direction,
        })
    }

    /// Compare two items on this key; nulls sort before values
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        let ordering = match (a.get(&self.field), b.get(&self.field)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(va), Some(vb)) => self.kind.compare(va, vb),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => write!(f, "{}_ASC", self.field),
            SortDirection::Descending => write!(f, "{}_DESC", self.field),
        }
    }
}

/// Stable multi-key sort
pub fn sort_items(items: &mut [Item], sorting: &[SortConfig]) {
    if sorting.is_empty() {
        return;
    }

    items.sort_by(|a, b| {
        for sort_config in sorting {
            let ordering = sort_config.compare(a, b);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Service for executing list queries against an item store
pub struct QueryService {
    store: Arc<dyn ItemStore>,
    config: CoreConfig,
}

impl QueryService {
    pub fn new(store: Arc<dyn ItemStore>, config: CoreConfig) -> Self {
        Self { store, config }
    }

    /// Execute a query and return matching items in sorted order
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The where clause names an unknown field or illegal operator
    /// - An operand cannot be normalized for its field
    /// - A sort key is malformed
    /// - A filtered or sorted field is denied for read by a dynamic rule
    /// - The store query fails
    pub async fn execute(
        &self,
        schema: &ListSchema,
        query: &QueryDefinition,
        ctx: &RequestContext,
    ) -> Result<Vec<Item>, ItemServiceError> {
        let filter =
            FilterCompiler::new(schema, &self.config).compile_where(query.filter.as_ref())?;
        let sorting = query
            .sort_by
            .iter()
            .map(|key| SortConfig::parse(schema, key))
            .collect::<Result<Vec<_>, _>>()?;

        let access = AccessContext {
            principal: ctx.principal.as_deref(),
            operation: Operation::Read,
            list: schema.key(),
            item_id: None,
        };
        let referenced: Vec<_> = filter
            .field_names()
            .into_iter()
            .chain(sorting.iter().map(|s| s.field.as_str()))
            .filter_map(|name| schema.field(name))
            .collect();
        authorize(&access, &referenced)?;

        let mut items = self.store.query_items(schema, &filter).await?;
        tracing::debug!(
            list = schema.key(),
            backend = self.store.backend_name(),
            matched = items.len(),
            "Executed list query"
        );

        sort_items(&mut items, &sorting);

        let skip = query.skip.unwrap_or(0);
        let items = items.into_iter().skip(skip);
        Ok(match query.first {
            Some(first) => items.take(first).collect(),
            None => items.collect(),
        })
    }
}
