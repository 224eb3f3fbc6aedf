/// Configuration for the Iframely oEmbed adapter
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public Iframely oEmbed endpoint
pub const DEFAULT_IFRAMELY_ENDPOINT: &str = "https://iframe.ly/api/oembed";

/// Environment variable holding the Iframely API key
pub const IFRAMELY_API_KEY_ENV: &str = "IFRAMELY_API_KEY";

/// Environment variable overriding the Iframely endpoint (self-hosted instances)
pub const IFRAMELY_ENDPOINT_ENV: &str = "IFRAMELY_ENDPOINT";

/// Upper bound for a single metadata lookup
const MAX_TIMEOUT_MS: u64 = 120_000;

/// Configuration for the Iframely adapter
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IframelyConfig {
    /// oEmbed endpoint URL
    pub endpoint: String,

    /// API key sent as the `api_key` query parameter
    ///
    /// A missing key is not a configuration error; lookups fail with
    /// `AdapterError::MissingCredential` instead.
    pub api_key: Option<String>,

    /// HTTP timeout for a single lookup, in milliseconds
    pub timeout_ms: u64,
}

impl Default for IframelyConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_IFRAMELY_ENDPOINT.to_string(),
            api_key: None,
            timeout_ms: 10_000,
        }
    }
}

// API keys never show up in logs
impl std::fmt::Debug for IframelyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IframelyConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl IframelyConfig {
    /// Build a config from `IFRAMELY_API_KEY` and `IFRAMELY_ENDPOINT`
    ///
    /// Unset or empty variables fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var(IFRAMELY_API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.api_key = Some(key.trim().to_string());
            }
        }

        if let Ok(endpoint) = std::env::var(IFRAMELY_ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                config.endpoint = endpoint.trim().to_string();
            }
        }

        config
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let endpoint = url::Url::parse(&self.endpoint)
            .map_err(|e| format!("endpoint '{}' is not a valid URL: {}", self.endpoint, e))?;

        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(format!(
                "endpoint must use http or https, got '{}'",
                endpoint.scheme()
            ));
        }

        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than 0".to_string());
        }

        if self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(format!("timeout_ms cannot exceed {}", MAX_TIMEOUT_MS));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = IframelyConfig::default();
        assert_eq!(config.endpoint, DEFAULT_IFRAMELY_ENDPOINT);
        assert!(config.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let config = IframelyConfig {
            endpoint: "ftp://iframe.ly/api".to_string(),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("http or https"));

        let config = IframelyConfig {
            endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let zero = IframelyConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let huge = IframelyConfig {
            timeout_ms: MAX_TIMEOUT_MS + 1,
            ..Default::default()
        };
        assert!(huge.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = IframelyConfig::default().with_api_key("secret-key");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_deserialize_partial_config_uses_defaults() {
        let config: IframelyConfig = serde_json::from_str(r#"{"api_key": "abc"}"#).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.endpoint, DEFAULT_IFRAMELY_ENDPOINT);
        assert_eq!(config.timeout_ms, 10_000);
    }
}
