//! Development Query Runner
//!
//! Loads a list definition and a handful of items from a JSON fixture, runs
//! one query against the chosen backend and prints the rendered results.
//! Useful for checking how a where clause compiles and what each backend
//! returns for it without writing a test.
//!
//! # Fixture format
//!
//! ```json
//! {
//!   "list": { "key": "Test", "fields": [{ "name": "price", "type": "Decimal", "scale": 2 }] },
//!   "items": [{ "price": "10.50" }, { "price": null }],
//!   "where": { "price_gt": "5" },
//!   "sortBy": ["price_DESC"],
//!   "backend": "turso"
//! }
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin dev-query -- fixture.json
//!
//! # Compiled filters and SQL are logged at debug level
//! RUST_LOG=fieldspace_core=debug cargo run --bin dev-query -- fixture.json
//! ```
//!
//! OEmbed fields resolve through Iframely when `IFRAMELY_API_KEY` is set and
//! through an offline adapter otherwise.

use anyhow::Context;
use async_trait::async_trait;
use fieldspace_core::config::CoreConfig;
use fieldspace_core::db::{ItemStore, MemoryStore, TursoStore};
use fieldspace_core::models::ListDefinition;
use fieldspace_core::services::{ItemService, QueryDefinition};
use fieldspace_core::RequestContext;
use fieldspace_oembed::{
    IframelyAdapter, OEmbedAdapter, OEmbedMetadata, IFRAMELY_ADAPTER_NAME, IFRAMELY_API_KEY_ENV,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Backend {
    #[default]
    Memory,
    Turso,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fixture {
    list: ListDefinition,
    #[serde(default)]
    items: Vec<Value>,
    #[serde(flatten)]
    query: QueryDefinition,
    #[serde(default)]
    backend: Backend,
    /// Database file for the turso backend; in-memory when unset
    #[serde(default)]
    database: Option<String>,
}

/// Offline adapter: every URL resolves to a bare link
struct OfflineAdapter;

#[async_trait]
impl OEmbedAdapter for OfflineAdapter {
    fn name(&self) -> &str {
        IFRAMELY_ADAPTER_NAME
    }

    async fn fetch(&self, url: &str) -> fieldspace_oembed::Result<OEmbedMetadata> {
        Ok(OEmbedMetadata::link(url))
    }
}

fn adapter() -> anyhow::Result<Arc<dyn OEmbedAdapter>> {
    if std::env::var(IFRAMELY_API_KEY_ENV).is_ok() {
        tracing::info!("Using Iframely adapter");
        Ok(Arc::new(IframelyAdapter::from_env()?))
    } else {
        tracing::info!("{} not set, using offline adapter", IFRAMELY_API_KEY_ENV);
        Ok(Arc::new(OfflineAdapter))
    }
}

async fn open_store(fixture: &Fixture) -> anyhow::Result<Arc<dyn ItemStore>> {
    Ok(match (&fixture.backend, &fixture.database) {
        (Backend::Memory, _) => Arc::new(MemoryStore::new()),
        (Backend::Turso, None) => Arc::new(TursoStore::in_memory().await?),
        (Backend::Turso, Some(path)) => Arc::new(TursoStore::new(path).await?),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: dev-query <fixture.json>")?;
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
    let fixture: Fixture =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path))?;

    let config = CoreConfig::default();
    let store = open_store(&fixture).await?;
    tracing::info!(backend = store.backend_name(), "Opened store");

    let service = ItemService::new(store, config.clone())?;
    let schema = service
        .register_definition(&fixture.list, &config, Some(adapter()?))
        .await?;

    let ctx = RequestContext::anonymous();
    for item in &fixture.items {
        service
            .create_item(schema.key(), item, &ctx)
            .await
            .with_context(|| format!("creating {}", item))?;
    }
    tracing::info!(list = schema.key(), items = fixture.items.len(), "Seeded fixture");

    let results = service
        .query_items(schema.key(), &fixture.query, &ctx)
        .await?;

    println!("{}", serde_json::to_string_pretty(&results)?);
    tracing::info!(matches = results.len(), "Query finished");
    Ok(())
}
