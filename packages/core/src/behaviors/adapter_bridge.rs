//! Adapter Bridge
//!
//! Resolves OEmbed input through the field's adapter. The URL scheme is
//! checked before any lookup, every lookup is bounded by the configured
//! timeout, and the returned record always carries the submitted URL as
//! `originalUrl`. Nothing is cached.

use crate::models::{FieldDescriptor, ValidationError};
use fieldspace_oembed::{AdapterError, OEmbedMetadata};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AdapterBridge {
    timeout: Duration,
}

impl AdapterBridge {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Resolve `url` for an OEmbed field
    ///
    /// # Errors
    ///
    /// `ValidationError::Adapter` for a rejected scheme, a failed or timed-out
    /// lookup; `ValidationError::InvalidSchema` if the field has no adapter.
    pub async fn resolve(
        &self,
        field: &FieldDescriptor,
        url: &str,
    ) -> Result<OEmbedMetadata, ValidationError> {
        let adapter = field.adapter.as_ref().ok_or_else(|| {
            ValidationError::invalid_schema(format!("field '{}' has no adapter", field.name))
        })?;

        adapter
            .validate(url)
            .map_err(|e| ValidationError::adapter(&field.name, e))?;

        tracing::debug!(field = %field.name, adapter = adapter.name(), url, "Resolving embed metadata");

        match tokio::time::timeout(self.timeout, adapter.fetch(url)).await {
            Ok(Ok(mut metadata)) => {
                metadata.original_url = url.to_string();
                Ok(metadata)
            }
            Ok(Err(error)) => {
                tracing::warn!(field = %field.name, url, %error, "Embed metadata lookup failed");
                Err(ValidationError::adapter(&field.name, error))
            }
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                tracing::warn!(field = %field.name, url, timeout_ms, "Embed metadata lookup timed out");
                Err(ValidationError::adapter(
                    &field.name,
                    AdapterError::timeout(adapter.name(), timeout_ms),
                ))
            }
        }
    }
}
