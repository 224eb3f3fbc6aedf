//! Item Service - Create, Read, Update, Query and Delete
//!
//! This module is the request-level entry point of the data layer. Every
//! mutation runs through the same pipeline:
//!
//! 1. Resolve the payload's fields against the operation's input type
//!    (unknown or statically excluded fields fail as schema errors)
//! 2. Evaluate dynamic access rules (failures are forbidden errors)
//! 3. Normalize every value through the codec, resolving OEmbed URLs through
//!    the adapter bridge
//! 4. Persist
//!
//! Nothing is written unless steps 1-3 succeed for every field, so a failed
//! request never leaves a partial item behind.
//!
//! Results are returned in their external JSON shape (`{ "id": ..., field:
//! value }`) restricted to the fields the caller may read.

use crate::access::{
    authorize, check_input_fields, readable_fields, AccessContext, Operation, RequestContext,
};
use crate::behaviors::ValueCodec;
use crate::config::CoreConfig;
use crate::db::ItemStore;
use crate::models::{
    FieldDescriptor, FieldKind, Item, ItemPatch, ListDefinition, ListSchema, StoredValue,
    ValidationError,
};
use crate::services::error::ItemServiceError;
use crate::services::query_service::{QueryDefinition, QueryService};
use fieldspace_oembed::OEmbedAdapter;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Orchestrates item operations for every registered list
pub struct ItemService {
    store: Arc<dyn ItemStore>,
    codec: ValueCodec,
    queries: QueryService,
    lists: RwLock<HashMap<String, Arc<ListSchema>>>,
}

fn access_context<'a>(
    ctx: &'a RequestContext,
    operation: Operation,
    list: &'a str,
    item_id: Option<&'a str>,
) -> AccessContext<'a> {
    AccessContext {
        principal: ctx.principal.as_deref(),
        operation,
        list,
        item_id,
    }
}

fn input_object(input: &Value) -> Result<&Map<String, Value>, ItemServiceError> {
    input
        .as_object()
        .ok_or_else(|| {
            ItemServiceError::invalid_input(format!("expected an object, found {}", input))
        })
}

impl ItemService {
    /// Create a new ItemService
    ///
    /// # Errors
    ///
    /// Returns `ItemServiceError::Configuration` if `config` fails validation.
    pub fn new(store: Arc<dyn ItemStore>, config: CoreConfig) -> Result<Self, ItemServiceError> {
        config.validate().map_err(ItemServiceError::configuration)?;

        Ok(Self {
            codec: ValueCodec::new(&config),
            queries: QueryService::new(store.clone(), config),
            store,
            lists: RwLock::new(HashMap::new()),
        })
    }

    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    /// Register a list and prepare its storage
    ///
    /// Registering a key again replaces the schema used for later requests.
    pub async fn register_list(&self, schema: ListSchema) -> Result<Arc<ListSchema>, ItemServiceError> {
        self.store.prepare_list(&schema).await?;

        let schema = Arc::new(schema);
        self.lists
            .write()
            .await
            .insert(schema.key().to_string(), schema.clone());

        tracing::info!(
            list = schema.key(),
            fields = schema.fields().len(),
            backend = self.store.backend_name(),
            "Registered list"
        );
        Ok(schema)
    }

    /// Build a schema from a serialized definition and register it
    pub async fn register_definition(
        &self,
        definition: &ListDefinition,
        config: &CoreConfig,
        adapter: Option<Arc<dyn OEmbedAdapter>>,
    ) -> Result<Arc<ListSchema>, ItemServiceError> {
        let schema = ListSchema::from_definition(definition, config, adapter)?;
        self.register_list(schema).await
    }

    /// Schema of a registered list
    pub async fn schema(&self, list: &str) -> Result<Arc<ListSchema>, ItemServiceError> {
        self.lists
            .read()
            .await
            .get(list)
            .cloned()
            .ok_or_else(|| ItemServiceError::unknown_list(list))
    }

    /// Normalize the named payload fields, in payload order
    async fn normalize_fields(
        &self,
        fields: &[&FieldDescriptor],
        input: &Map<String, Value>,
    ) -> Result<Vec<(String, Option<StoredValue>)>, ItemServiceError> {
        let mut normalized = Vec::with_capacity(fields.len());
        for field in fields {
            let external = input.get(&field.name).unwrap_or(&Value::Null);
            let value = self.codec.normalize(field, external).await?;
            if value.is_none() && field.required {
                return Err(ValidationError::missing_required(&field.name).into());
            }
            normalized.push((field.name.clone(), value));
        }
        Ok(normalized)
    }

    fn render(schema: &ListSchema, item: &Item, ctx: &AccessContext<'_>) -> Value {
        item.to_json(&readable_fields(schema, ctx))
    }

    /// Create an item
    ///
    /// Omitted fields are stored as null. AutoIncrement fields are assigned
    /// after every value has been normalized, so a rejected request never
    /// consumes a sequence number.
    ///
    /// # Errors
    ///
    /// - `Schema` for unknown or statically non-creatable fields
    /// - `Forbidden` for fields denied by a dynamic create rule
    /// - `Validation` for malformed values, adapter failures and missing
    ///   required fields
    pub async fn create_item(
        &self,
        list: &str,
        input: &Value,
        ctx: &RequestContext,
    ) -> Result<Value, ItemServiceError> {
        let schema = self.schema(list).await?;
        let input = input_object(input)?;

        let fields =
            check_input_fields(&schema, Operation::Create, input.keys().map(String::as_str))?;
        authorize(
            &access_context(ctx, Operation::Create, schema.key(), None),
            &fields,
        )?;

        let mut values = BTreeMap::new();
        for (name, value) in self.normalize_fields(&fields, input).await? {
            if let Some(value) = value {
                values.insert(name, value);
            }
        }

        // AutoIncrement values are assigned below
        if let Some(missing) = schema.fields().iter().find(|f| {
            f.required && f.kind != FieldKind::AutoIncrement && !values.contains_key(&f.name)
        }) {
            return Err(ValidationError::missing_required(&missing.name).into());
        }

        for field in schema.auto_increment_fields() {
            let next = self.store.next_sequence(schema.key(), &field.name).await?;
            values.insert(field.name.clone(), StoredValue::Integer(next));
        }

        let item = Item::new(schema.key(), values);
        self.store.insert_item(&schema, &item).await?;

        tracing::debug!(list = schema.key(), id = %item.id, "Created item");

        let read_ctx = access_context(ctx, Operation::Read, schema.key(), Some(&item.id));
        Ok(Self::render(&schema, &item, &read_ctx))
    }

    /// Update an item; fields absent from `patch` are untouched
    pub async fn update_item(
        &self,
        list: &str,
        id: &str,
        patch: &Value,
        ctx: &RequestContext,
    ) -> Result<Value, ItemServiceError> {
        let schema = self.schema(list).await?;
        let patch = input_object(patch)?;

        let fields =
            check_input_fields(&schema, Operation::Update, patch.keys().map(String::as_str))?;

        if self.store.get_item(&schema, id).await?.is_none() {
            return Err(ItemServiceError::not_found(schema.key(), id));
        }

        authorize(
            &access_context(ctx, Operation::Update, schema.key(), Some(id)),
            &fields,
        )?;

        let mut item_patch = ItemPatch::new();
        for (name, value) in self.normalize_fields(&fields, patch).await? {
            item_patch = item_patch.set(name, value);
        }

        let item = self
            .store
            .update_item(&schema, id, &item_patch)
            .await?
            .ok_or_else(|| ItemServiceError::not_found(schema.key(), id))?;

        tracing::debug!(list = schema.key(), id, version = item.version, "Updated item");

        let read_ctx = access_context(ctx, Operation::Read, schema.key(), Some(id));
        Ok(Self::render(&schema, &item, &read_ctx))
    }

    /// Read an item
    ///
    /// With `fields = None` every readable field is returned and dynamically
    /// unreadable ones are left out. Naming a field explicitly turns a
    /// dynamic denial into a `Forbidden` error.
    pub async fn get_item(
        &self,
        list: &str,
        id: &str,
        fields: Option<&[&str]>,
        ctx: &RequestContext,
    ) -> Result<Value, ItemServiceError> {
        let schema = self.schema(list).await?;
        let read_ctx = access_context(ctx, Operation::Read, schema.key(), Some(id));

        let selected = match fields {
            Some(names) => {
                let selected = check_input_fields(&schema, Operation::Read, names.iter().copied())?;
                authorize(&read_ctx, &selected)?;
                selected
            }
            None => readable_fields(&schema, &read_ctx),
        };

        let item = self
            .store
            .get_item(&schema, id)
            .await?
            .ok_or_else(|| ItemServiceError::not_found(schema.key(), id))?;

        Ok(item.to_json(&selected))
    }

    /// Delete an item, returning whether it existed
    ///
    /// AutoIncrement values of deleted items are never handed out again.
    pub async fn delete_item(&self, list: &str, id: &str) -> Result<bool, ItemServiceError> {
        let schema = self.schema(list).await?;
        let removed = self.store.delete_item(&schema, id).await?;

        tracing::debug!(list = schema.key(), id, removed, "Deleted item");
        Ok(removed)
    }

    /// Run a list query and render the matches
    pub async fn query_items(
        &self,
        list: &str,
        query: &QueryDefinition,
        ctx: &RequestContext,
    ) -> Result<Vec<Value>, ItemServiceError> {
        let schema = self.schema(list).await?;
        let items = self.queries.execute(&schema, query, ctx).await?;

        Ok(items
            .iter()
            .map(|item| {
                let read_ctx = access_context(ctx, Operation::Read, schema.key(), Some(&item.id));
                Self::render(&schema, item, &read_ctx)
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "item_service_test.rs"]
mod item_service_test;
