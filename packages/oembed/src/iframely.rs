//! Iframely-backed oEmbed adapter
//!
//! Sends `GET <endpoint>?url=<url>&api_key=<key>` and maps the flat oEmbed
//! response (`provider_name`, `thumbnail_url`, ...) into `OEmbedMetadata`.

use crate::adapter::{
    EmbedType, OEmbedAdapter, OEmbedAuthor, OEmbedMetadata, OEmbedProvider, OEmbedThumbnail,
};
use crate::config::IframelyConfig;
use crate::error::{AdapterError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

/// Name reported in adapter errors
pub const IFRAMELY_ADAPTER_NAME: &str = "IFramely OEmbed Adapter";

/// Raw oEmbed payload as returned by Iframely
#[derive(Debug, Default, Deserialize)]
struct IframelyResponse {
    #[serde(rename = "type")]
    embed_type: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    html: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    provider_name: Option<String>,
    provider_url: Option<String>,
    author_name: Option<String>,
    author_url: Option<String>,
    thumbnail_url: Option<String>,
    thumbnail_width: Option<u32>,
    thumbnail_height: Option<u32>,

    // Iframely reports failures in-band as `{"status": 404, "error": "..."}`
    status: Option<u16>,
    error: Option<String>,
}

/// oEmbed adapter backed by the Iframely API
pub struct IframelyAdapter {
    config: IframelyConfig,
    endpoint: Url,
    http: reqwest::Client,
}

impl IframelyAdapter {
    /// Create an adapter from a validated config
    ///
    /// A missing API key is accepted here and reported on the first lookup.
    pub fn new(config: IframelyConfig) -> Result<Self> {
        config.validate().map_err(AdapterError::ConfigError)?;

        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| AdapterError::ConfigError(format!("Invalid endpoint: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AdapterError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            endpoint,
            http,
        })
    }

    /// Create an adapter configured from `IFRAMELY_API_KEY`
    pub fn from_env() -> Result<Self> {
        Self::new(IframelyConfig::from_env())
    }

    pub fn config(&self) -> &IframelyConfig {
        &self.config
    }

    /// Build the lookup URL for `url`
    pub fn request_url(&self, url: &str, api_key: &str) -> Url {
        let mut request_url = self.endpoint.clone();
        request_url
            .query_pairs_mut()
            .append_pair("url", url)
            .append_pair("api_key", api_key);
        request_url
    }

    /// Map a raw Iframely response body into metadata for `original_url`
    pub fn map_response(original_url: &str, body: &str) -> Result<OEmbedMetadata> {
        let raw: IframelyResponse = serde_json::from_str(body)
            .map_err(|e| AdapterError::invalid_response(IFRAMELY_ADAPTER_NAME, e.to_string()))?;

        if let Some(message) = raw.error {
            return Err(AdapterError::service(
                IFRAMELY_ADAPTER_NAME,
                raw.status.unwrap_or(502),
                message,
            ));
        }

        let embed_type = match raw.embed_type.as_deref() {
            None | Some("link") => EmbedType::Link,
            Some("photo") => EmbedType::Photo,
            Some("video") => EmbedType::Video,
            Some("rich") => EmbedType::Rich,
            Some(other) => {
                return Err(AdapterError::invalid_response(
                    IFRAMELY_ADAPTER_NAME,
                    format!("unknown oEmbed type '{}'", other),
                ))
            }
        };

        let provider = (raw.provider_name.is_some() || raw.provider_url.is_some()).then(|| {
            OEmbedProvider {
                name: raw.provider_name,
                url: raw.provider_url,
            }
        });

        let author = (raw.author_name.is_some() || raw.author_url.is_some()).then(|| OEmbedAuthor {
            name: raw.author_name,
            url: raw.author_url,
        });

        let thumbnail = raw.thumbnail_url.map(|url| OEmbedThumbnail {
            url,
            width: raw.thumbnail_width,
            height: raw.thumbnail_height,
        });

        Ok(OEmbedMetadata {
            original_url: original_url.to_string(),
            embed_type,
            title: raw.title,
            description: raw.description,
            url: raw.url,
            html: raw.html,
            width: raw.width,
            height: raw.height,
            provider,
            author,
            thumbnail,
        })
    }

    fn transport_error(&self, error: reqwest::Error) -> AdapterError {
        if error.is_timeout() {
            AdapterError::timeout(IFRAMELY_ADAPTER_NAME, self.config.timeout_ms)
        } else {
            AdapterError::network(IFRAMELY_ADAPTER_NAME, error.to_string())
        }
    }
}

/// Pull a readable message out of an error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<IframelyResponse>(body)
        .ok()
        .and_then(|raw| raw.error)
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[async_trait]
impl OEmbedAdapter for IframelyAdapter {
    fn name(&self) -> &str {
        IFRAMELY_ADAPTER_NAME
    }

    async fn fetch(&self, url: &str) -> Result<OEmbedMetadata> {
        self.validate(url)?;

        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AdapterError::missing_credential(IFRAMELY_ADAPTER_NAME))?;

        tracing::debug!(url, "Fetching oEmbed metadata from Iframely");

        let response = self
            .http
            .get(self.request_url(url, api_key))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(AdapterError::service(
                IFRAMELY_ADAPTER_NAME,
                status.as_u16(),
                error_message(&body),
            ));
        }

        Self::map_response(url, &body)
    }
}
