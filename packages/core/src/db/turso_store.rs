//! TursoStore - Relational ItemStore on libsql
//!
//! Each list gets its own table, `items_<list>`, with one or two columns per
//! field (see `filters::sql` for the layout). Compiled filters are rendered
//! to a parameterized `WHERE` fragment and evaluated by SQLite.
//!
//! # Connection Model
//!
//! The store owns a single connection guarded by an async mutex. Updates and
//! sequence allocation run while the lock is held, which makes them atomic
//! with respect to every other operation on the store. It also lets
//! `:memory:` databases work, since each new connection to an in-memory
//! database would otherwise see an empty database.
//!
//! # Examples
//!
//! ```rust,no_run
//! use fieldspace_core::db::{ItemStore, TursoStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn ItemStore> = Arc::new(TursoStore::new("./data/items.db").await?);
//!     assert_eq!(store.backend_name(), "turso");
//!     Ok(())
//! }
//! ```

use crate::db::{DatabaseError, ItemStore};
use crate::filters::sql::{data_column, decimal_mantissa, folded_column, value_column};
use crate::filters::{render_filter, CompiledFilter, SqlParam};
use crate::models::{
    fold_case, FieldDescriptor, FieldKind, Item, ItemPatch, ListSchema, StorageShape, StoredValue,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fieldspace_oembed::OEmbedMetadata;
use libsql::params::Params;
use libsql::{Builder, Connection, Database, Row, Value};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Number of bookkeeping columns selected before the field columns
const ITEM_META_COLUMNS: usize = 4;

pub struct TursoStore {
    // Kept alive for the lifetime of the connection
    _db: Database,
    conn: Mutex<Connection>,
    location: PathBuf,
}

impl TursoStore {
    /// Open (or create) a database file
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Self::open(path, true).await
    }

    /// Private in-memory database, mostly for tests
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        Self::open(PathBuf::from(":memory:"), false).await
    }

    async fn open(location: PathBuf, wal: bool) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(&location)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(location.clone(), e))?;
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::connection_failed(location.clone(), e))?;

        if wal {
            execute_pragma(&conn, "PRAGMA journal_mode = WAL").await?;
        }
        execute_pragma(&conn, "PRAGMA busy_timeout = 5000").await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS _sequences (
                name TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!("Failed to create _sequences: {}", e))
        })?;

        tracing::debug!("Opened turso item store at {}", location.display());

        Ok(Self {
            _db: db,
            conn: Mutex::new(conn),
            location,
        })
    }

    pub fn location(&self) -> &Path {
        &self.location
    }
}

/// PRAGMA statements return rows, so they go through `query()` rather than `execute()`
async fn execute_pragma(conn: &Connection, pragma: &str) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(pragma).await.map_err(|e| {
        DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
    })?;
    let _ = stmt.query(()).await.map_err(|e| {
        DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
    })?;
    Ok(())
}

fn table_name(list: &str) -> String {
    format!("\"items_{}\"", list)
}

/// Columns holding a field, value column first
///
/// Scalar text keeps a case-folded shadow column, numbers (decimal mantissas
/// included) are a single INTEGER, and composites keep their match key next
/// to the serialized record.
fn field_columns(field: &FieldDescriptor) -> Vec<(String, &'static str)> {
    let value = value_column(&field.name);
    match field.kind.storage_shape() {
        StorageShape::ScalarText => vec![
            (value, "TEXT"),
            (folded_column(&field.name), "TEXT"),
        ],
        StorageShape::ScalarNumber | StorageShape::ScalarDecimal { .. } => {
            vec![(value, "INTEGER")]
        }
        StorageShape::Composite { .. } => {
            vec![(value, "TEXT"), (data_column(&field.name), "TEXT")]
        }
    }
}

/// Column values for a field, aligned with `field_columns`
fn encode_field(field: &FieldDescriptor, value: Option<&StoredValue>) -> Result<Vec<Value>, DatabaseError> {
    let encoded = match (field.kind, value) {
        (FieldKind::Text | FieldKind::Wysiwyg, Some(StoredValue::Text(s))) => {
            vec![Value::Text(s.clone()), Value::Text(fold_case(s))]
        }
        (FieldKind::Text | FieldKind::Wysiwyg, None) => vec![Value::Null, Value::Null],
        (FieldKind::AutoIncrement, Some(StoredValue::Integer(n))) => vec![Value::Integer(*n)],
        (FieldKind::Decimal { scale, .. }, Some(StoredValue::Decimal(d))) => {
            vec![Value::Integer(decimal_mantissa(*d, scale))]
        }
        (FieldKind::AutoIncrement | FieldKind::Decimal { .. }, None) => vec![Value::Null],
        (FieldKind::OEmbed, Some(StoredValue::OEmbed(metadata))) => {
            let data = serde_json::to_string(metadata).map_err(|e| {
                DatabaseError::sql_execution(format!(
                    "Failed to serialize oembed metadata for '{}': {}",
                    field.name, e
                ))
            })?;
            vec![Value::Text(metadata.original_url.clone()), Value::Text(data)]
        }
        (FieldKind::OEmbed, None) => vec![Value::Null, Value::Null],
        (kind, Some(other)) => {
            return Err(DatabaseError::sql_execution(format!(
                "Value {:?} cannot be stored in {} field '{}'",
                other, kind, field.name
            )))
        }
    };
    Ok(encoded)
}

/// Decode the field starting at column `index`
fn decode_field(
    list: &str,
    field: &FieldDescriptor,
    row: &Row,
    index: i32,
) -> Result<Option<StoredValue>, DatabaseError> {
    let raw = row.get_value(index)?;
    let corrupt = |context: String| DatabaseError::corrupt_row(list, context);

    let decoded = match (field.kind, raw) {
        (_, Value::Null) => None,
        (FieldKind::Text | FieldKind::Wysiwyg, Value::Text(s)) => Some(StoredValue::Text(s)),
        (FieldKind::AutoIncrement, Value::Integer(n)) => Some(StoredValue::Integer(n)),
        (FieldKind::Decimal { scale, .. }, Value::Integer(mantissa)) => {
            Some(StoredValue::Decimal(Decimal::new(mantissa, scale)))
        }
        (FieldKind::OEmbed, Value::Text(_)) => {
            let data: String = row.get(index + 1)?;
            let metadata: OEmbedMetadata = serde_json::from_str(&data).map_err(|e| {
                corrupt(format!("invalid oembed data for '{}': {}", field.name, e))
            })?;
            Some(StoredValue::OEmbed(Box::new(metadata)))
        }
        (kind, other) => {
            return Err(corrupt(format!(
                "unexpected value {:?} for {} field '{}'",
                other, kind, field.name
            )))
        }
    };
    Ok(decoded)
}

fn parse_timestamp(list: &str, s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::corrupt_row(list, format!("bad timestamp '{}': {}", s, e)))
}

/// `SELECT` column list: id, version, created_at, modified_at, then field columns
fn select_columns(schema: &ListSchema) -> String {
    let mut columns = vec![
        "id".to_string(),
        "version".to_string(),
        "created_at".to_string(),
        "modified_at".to_string(),
    ];
    for field in schema.fields() {
        columns.extend(field_columns(field).into_iter().map(|(name, _)| name));
    }
    columns.join(", ")
}

fn row_to_item(schema: &ListSchema, row: &Row) -> Result<Item, DatabaseError> {
    let list = schema.key();
    let id: String = row.get(0)?;
    let version: i64 = row.get(1)?;
    let created_at: String = row.get(2)?;
    let modified_at: String = row.get(3)?;

    let mut values = BTreeMap::new();
    let mut index = ITEM_META_COLUMNS as i32;
    for field in schema.fields() {
        if let Some(value) = decode_field(list, field, row, index)? {
            values.insert(field.name.clone(), value);
        }
        index += field_columns(field).len() as i32;
    }

    Ok(Item {
        id,
        list: list.to_string(),
        values,
        version,
        created_at: parse_timestamp(list, &created_at)?,
        modified_at: parse_timestamp(list, &modified_at)?,
    })
}

fn to_sql_value(param: &SqlParam) -> Value {
    match param {
        SqlParam::Text(s) => Value::Text(s.clone()),
        SqlParam::Integer(n) => Value::Integer(*n),
    }
}

async fn fetch_items(
    conn: &Connection,
    schema: &ListSchema,
    sql: &str,
    params: Vec<Value>,
) -> Result<Vec<Item>, DatabaseError> {
    let mut stmt = conn.prepare(sql).await.map_err(|e| {
        DatabaseError::sql_execution(format!("Failed to prepare '{}': {}", sql, e))
    })?;
    let mut rows = stmt
        .query(Params::Positional(params))
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to execute '{}': {}", sql, e)))?;

    let mut items = Vec::new();
    while let Some(row) = rows.next().await? {
        items.push(row_to_item(schema, &row)?);
    }
    Ok(items)
}

async fn fetch_item(
    conn: &Connection,
    schema: &ListSchema,
    id: &str,
) -> Result<Option<Item>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ?",
        select_columns(schema),
        table_name(schema.key())
    );
    let mut items = fetch_items(conn, schema, &sql, vec![Value::Text(id.to_string())]).await?;
    Ok(items.pop())
}

#[async_trait]
impl ItemStore for TursoStore {
    async fn prepare_list(&self, schema: &ListSchema) -> Result<(), DatabaseError> {
        let mut columns = vec![
            "seq INTEGER PRIMARY KEY AUTOINCREMENT".to_string(),
            "id TEXT NOT NULL UNIQUE".to_string(),
            "version INTEGER NOT NULL".to_string(),
            "created_at TEXT NOT NULL".to_string(),
            "modified_at TEXT NOT NULL".to_string(),
        ];
        for field in schema.fields() {
            columns.extend(
                field_columns(field)
                    .into_iter()
                    .map(|(name, ty)| format!("{} {}", name, ty)),
            );
        }

        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            table_name(schema.key()),
            columns.join(", ")
        );

        let conn = self.conn.lock().await;
        conn.execute(&sql, ()).await.map_err(|e| {
            DatabaseError::initialization_failed(format!(
                "Failed to create table for list '{}': {}",
                schema.key(),
                e
            ))
        })?;

        tracing::debug!("Prepared table for list '{}'", schema.key());
        Ok(())
    }

    async fn next_sequence(&self, list: &str, field: &str) -> Result<i64, DatabaseError> {
        let name = format!("{}.{}", list, field);
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare(
                "INSERT INTO _sequences (name, value) VALUES (?, 1)
                 ON CONFLICT(name) DO UPDATE SET value = value + 1
                 RETURNING value",
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare sequence update: {}", e))
            })?;
        let mut rows = stmt.query([name.as_str()]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to advance sequence '{}': {}", name, e))
        })?;

        match rows.next().await? {
            Some(row) => Ok(row.get::<i64>(0)?),
            None => Err(DatabaseError::sql_execution(format!(
                "Sequence '{}' returned no value",
                name
            ))),
        }
    }

    async fn insert_item(&self, schema: &ListSchema, item: &Item) -> Result<(), DatabaseError> {
        let mut columns = vec![
            "id".to_string(),
            "version".to_string(),
            "created_at".to_string(),
            "modified_at".to_string(),
        ];
        let mut params = vec![
            Value::Text(item.id.clone()),
            Value::Integer(item.version),
            Value::Text(item.created_at.to_rfc3339()),
            Value::Text(item.modified_at.to_rfc3339()),
        ];

        for field in schema.fields() {
            columns.extend(field_columns(field).into_iter().map(|(name, _)| name));
            params.extend(encode_field(field, item.get(&field.name))?);
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table_name(schema.key()),
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        );

        let conn = self.conn.lock().await;
        conn.execute(&sql, Params::Positional(params))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!(
                    "Failed to insert item '{}' into '{}': {}",
                    item.id,
                    schema.key(),
                    e
                ))
            })?;
        Ok(())
    }

    async fn get_item(&self, schema: &ListSchema, id: &str) -> Result<Option<Item>, DatabaseError> {
        let conn = self.conn.lock().await;
        fetch_item(&conn, schema, id).await
    }

    async fn update_item(
        &self,
        schema: &ListSchema,
        id: &str,
        patch: &ItemPatch,
    ) -> Result<Option<Item>, DatabaseError> {
        let mut assignments = vec!["version = version + 1".to_string(), "modified_at = ?".to_string()];
        let mut params = vec![Value::Text(Utc::now().to_rfc3339())];

        for (name, value) in &patch.values {
            let field = schema.field(name).ok_or_else(|| {
                DatabaseError::sql_execution(format!(
                    "Field '{}' does not exist on list '{}'",
                    name,
                    schema.key()
                ))
            })?;
            for (column, _) in field_columns(field) {
                assignments.push(format!("{} = ?", column));
            }
            params.extend(encode_field(field, value.as_ref())?);
        }
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            table_name(schema.key()),
            assignments.join(", ")
        );

        // Held across the update and the re-read
        let conn = self.conn.lock().await;
        let changed = conn
            .execute(&sql, Params::Positional(params))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to update item '{}': {}", id, e))
            })?;

        if changed == 0 {
            return Ok(None);
        }
        fetch_item(&conn, schema, id).await
    }

    async fn delete_item(&self, schema: &ListSchema, id: &str) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", table_name(schema.key()));
        let conn = self.conn.lock().await;
        let removed = conn.execute(&sql, [id]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to delete item '{}': {}", id, e))
        })?;
        Ok(removed > 0)
    }

    async fn query_items(
        &self,
        schema: &ListSchema,
        filter: &CompiledFilter,
    ) -> Result<Vec<Item>, DatabaseError> {
        let fragment = render_filter(filter);
        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY seq",
            select_columns(schema),
            table_name(schema.key()),
            fragment.sql
        );
        let params = fragment.params.iter().map(to_sql_value).collect();

        tracing::trace!("query_items: {}", sql);

        let conn = self.conn.lock().await;
        fetch_items(&conn, schema, &sql, params).await
    }

    fn backend_name(&self) -> &'static str {
        "turso"
    }
}
