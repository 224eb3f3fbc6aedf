//! oEmbed adapter contract
//!
//! An adapter turns a URL into embed metadata. The field layer only ever
//! talks to `OEmbedAdapter`; the HTTP details live in the implementations.

use crate::error::{AdapterError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// oEmbed resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedType {
    #[default]
    Link,
    Photo,
    Video,
    Rich,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OEmbedProvider {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OEmbedAuthor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OEmbedThumbnail {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Metadata record stored for an OEmbed field
///
/// `original_url` is always the URL the client submitted; everything else
/// comes from the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OEmbedMetadata {
    pub original_url: String,

    #[serde(rename = "type", default)]
    pub embed_type: EmbedType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Canonical resource URL reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<OEmbedProvider>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<OEmbedAuthor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<OEmbedThumbnail>,
}

impl OEmbedMetadata {
    /// Minimal `link` record carrying only the submitted URL
    pub fn link(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            embed_type: EmbedType::Link,
            title: None,
            description: None,
            url: None,
            html: None,
            width: None,
            height: None,
            provider: None,
            author: None,
            thumbnail: None,
        }
    }
}

/// Check that `url` starts with `http://` or `https://`
///
/// The comparison is on the literal prefix; no lookup happens for anything else.
pub fn validate_url(adapter_name: &str, url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(AdapterError::invalid_scheme(adapter_name))
    }
}

/// Resolves a URL into oEmbed metadata
///
/// Implementations must not cache and must not retry; each call is a fresh
/// lookup and every failure is reported as an `AdapterError`.
#[async_trait]
pub trait OEmbedAdapter: Send + Sync {
    /// Human readable adapter name used in error messages
    fn name(&self) -> &str;

    /// Validate a URL before any lookup
    fn validate(&self, url: &str) -> Result<()> {
        validate_url(self.name(), url)
    }

    /// Fetch metadata for an already validated URL
    async fn fetch(&self, url: &str) -> Result<OEmbedMetadata>;
}
