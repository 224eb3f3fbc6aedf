/// Error types for oEmbed adapters
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("url passed to {adapter} must start with either http:// or https://")]
    InvalidScheme { adapter: String },

    #[error("{adapter} requires an API key but none was configured")]
    MissingCredential { adapter: String },

    #[error("{adapter} request failed: {message}")]
    Network { adapter: String, message: String },

    #[error("{adapter} responded with status {status}: {message}")]
    Service {
        adapter: String,
        status: u16,
        message: String,
    },

    #[error("{adapter} returned an invalid response: {message}")]
    InvalidResponse { adapter: String, message: String },

    #[error("{adapter} did not respond within {timeout_ms}ms")]
    Timeout { adapter: String, timeout_ms: u64 },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl AdapterError {
    pub fn invalid_scheme(adapter: impl Into<String>) -> Self {
        Self::InvalidScheme {
            adapter: adapter.into(),
        }
    }

    pub fn missing_credential(adapter: impl Into<String>) -> Self {
        Self::MissingCredential {
            adapter: adapter.into(),
        }
    }

    pub fn network(adapter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            adapter: adapter.into(),
            message: message.into(),
        }
    }

    pub fn service(adapter: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            adapter: adapter.into(),
            status,
            message: message.into(),
        }
    }

    pub fn invalid_response(adapter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            adapter: adapter.into(),
            message: message.into(),
        }
    }

    pub fn timeout(adapter: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            adapter: adapter.into(),
            timeout_ms,
        }
    }

    /// Whether a caller-side retry could succeed (network hiccups, 5xx, timeouts)
    ///
    /// Adapters never retry on their own.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => true,
            Self::Service { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
