/// FieldSpace oEmbed Adapters - Embed Metadata Resolution
///
/// This crate defines the contract between OEmbed fields and the external
/// services that turn a URL into embed metadata (title, provider, thumbnail,
/// HTML snippet).
///
/// # Features
///
/// - **Adapter Trait**: `OEmbedAdapter` is the single seam the field layer calls
/// - **Scheme Validation**: URLs must start with `http://` or `https://` before any lookup
/// - **Iframely Support**: `IframelyAdapter` resolves metadata through the iframe.ly API
/// - **No Caching**: Every call is a fresh lookup; caching belongs to the caller
///
/// # Example
///
/// ```ignore
/// use fieldspace_oembed::{IframelyAdapter, IframelyConfig, OEmbedAdapter};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let adapter = IframelyAdapter::new(IframelyConfig::from_env())?;
///     let metadata = adapter.fetch("https://github.com").await?;
///
///     println!("{} ({:?})", metadata.original_url, metadata.title);
///     Ok(())
/// }
/// ```
pub mod adapter;
pub mod config;
pub mod error;
pub mod iframely;

// Re-export main types
pub use adapter::{
    validate_url, EmbedType, OEmbedAdapter, OEmbedAuthor, OEmbedMetadata, OEmbedProvider,
    OEmbedThumbnail,
};
pub use config::{IframelyConfig, IFRAMELY_API_KEY_ENV, IFRAMELY_ENDPOINT_ENV};
pub use error::{AdapterError, Result};
pub use iframely::{IframelyAdapter, IFRAMELY_ADAPTER_NAME};
