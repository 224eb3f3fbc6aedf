//! Validation Error Types
//!
//! Raised while turning client input into stored values and while building
//! list schemas. Every variant is fatal to the request and leaves storage
//! untouched.

use fieldspace_oembed::AdapterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    /// Input could not be converted to the field's stored representation
    #[error("Invalid value for field \"{field}\": {reason}")]
    InvalidValue { field: String, reason: String },

    /// Decimal needs more significant digits than the field allows
    #[error("Value for field \"{field}\" exceeds precision {precision} (scale {scale})")]
    PrecisionExceeded {
        field: String,
        precision: u32,
        scale: u32,
    },

    /// Required field is missing or null
    #[error("Field \"{field}\" is required")]
    MissingRequired { field: String },

    /// Client supplied a value the server assigns itself
    #[error("Field \"{field}\" is assigned by the server and cannot be set")]
    ServerAssigned { field: String },

    /// Embed metadata lookup failed (including URL scheme rejection)
    #[error("{source}")]
    Adapter {
        field: String,
        #[source]
        source: AdapterError,
    },

    /// List schema definition is inconsistent
    #[error("Invalid list schema: {0}")]
    InvalidSchema(String),
}

impl ValidationError {
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_required(field: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
        }
    }

    pub fn server_assigned(field: impl Into<String>) -> Self {
        Self::ServerAssigned {
            field: field.into(),
        }
    }

    pub fn adapter(field: impl Into<String>, source: AdapterError) -> Self {
        Self::Adapter {
            field: field.into(),
            source,
        }
    }

    pub fn invalid_schema(msg: impl Into<String>) -> Self {
        Self::InvalidSchema(msg.into())
    }

    /// Field the error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { field, .. }
            | Self::PrecisionExceeded { field, .. }
            | Self::MissingRequired { field }
            | Self::ServerAssigned { field }
            | Self::Adapter { field, .. } => Some(field),
            Self::InvalidSchema(_) => None,
        }
    }
}
