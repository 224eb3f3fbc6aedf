//! Shared fixtures for the integration tests
//!
//! Every fixture runs once per backend; `BACKENDS` lists them.

#![allow(dead_code)]

use async_trait::async_trait;
use fieldspace_core::config::CoreConfig;
use fieldspace_core::db::{ItemStore, MemoryStore, TursoStore};
use fieldspace_core::services::{ItemService, ItemServiceError, QueryDefinition};
use fieldspace_core::RequestContext;
use fieldspace_oembed::{OEmbedAdapter, OEmbedMetadata, OEmbedProvider, IFRAMELY_ADAPTER_NAME};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Turso,
}

pub const BACKENDS: [Backend; 2] = [Backend::Memory, Backend::Turso];

/// Offline stand-in for the Iframely adapter
///
/// Uses the same adapter name so scheme errors read exactly like production.
#[derive(Default)]
pub struct StubAdapter {
    calls: AtomicUsize,
}

impl StubAdapter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OEmbedAdapter for StubAdapter {
    fn name(&self) -> &str {
        IFRAMELY_ADAPTER_NAME
    }

    async fn fetch(&self, url: &str) -> fieldspace_oembed::Result<OEmbedMetadata> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let host = url.split("://").nth(1).unwrap_or(url).to_string();
        let mut metadata = OEmbedMetadata::link(url);
        metadata.title = Some(format!("Page at {}", host));
        metadata.provider = Some(OEmbedProvider {
            name: Some(host.clone()),
            url: Some(format!("https://{}", host)),
        });
        Ok(metadata)
    }
}

pub async fn open_store(backend: Backend) -> Arc<dyn ItemStore> {
    match backend {
        Backend::Memory => Arc::new(MemoryStore::new()),
        Backend::Turso => Arc::new(TursoStore::in_memory().await.unwrap()),
    }
}

pub async fn open_service(backend: Backend) -> ItemService {
    ItemService::new(open_store(backend).await, CoreConfig::default()).unwrap()
}

pub fn anon() -> RequestContext {
    RequestContext::anonymous()
}

/// Create every item in order, panicking on the first failure
pub async fn seed(service: &ItemService, list: &str, items: &[Value]) -> Vec<Value> {
    let mut created = Vec::with_capacity(items.len());
    for item in items {
        created.push(
            service
                .create_item(list, item, &anon())
                .await
                .unwrap_or_else(|e| panic!("failed to create {}: {}", item, e)),
        );
    }
    created
}

/// Query sorted by `name_ASC`
pub async fn query(
    service: &ItemService,
    list: &str,
    filter: Option<Value>,
) -> Result<Vec<Value>, ItemServiceError> {
    let mut query = QueryDefinition::new().sort_by("name_ASC");
    query.filter = filter;
    service.query_items(list, &query, &anon()).await
}

/// Names of the items matching `filter`, sorted by name
pub async fn names(service: &ItemService, list: &str, filter: Value) -> Vec<String> {
    query(service, list, Some(filter.clone()))
        .await
        .unwrap_or_else(|e| panic!("filter {} failed: {}", filter, e))
        .iter()
        .map(|item| item["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

/// Assert that `filter` selects exactly `expected`
pub async fn assert_names(
    backend: Backend,
    service: &ItemService,
    list: &str,
    filter: Value,
    expected: &[&str],
) {
    assert_eq!(
        names(service, list, filter.clone()).await,
        expected,
        "filter {} on {:?}",
        filter,
        backend
    );
}
