//! Service Layer Error Types
//!
//! This module defines the error taxonomy surfaced by item operations. Lower
//! layers chain in through `#[from]` conversions so callers only ever see
//! `ItemServiceError`.

use crate::access::{AccessError, Operation};
use crate::db::DatabaseError;
use crate::filters::FilterError;
use crate::models::ValidationError;
use thiserror::Error;

/// Coarse classification of an `ItemServiceError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown or statically excluded field, unknown list, illegal operator
    Schema,
    /// Malformed value, adapter failure, required or server-assigned field
    Validation,
    /// Dynamic access denial
    Forbidden,
    NotFound,
    Database,
}

/// Item operation errors
#[derive(Error, Debug)]
pub enum ItemServiceError {
    /// Field is unknown or statically excluded from the operation's type
    #[error("Field \"{field}\" is not defined by type \"{type_name}\"")]
    Schema { field: String, type_name: String },

    /// No list registered under this key
    #[error("List \"{0}\" is not registered")]
    UnknownList(String),

    /// Where clause or sort could not be compiled
    #[error(transparent)]
    InvalidFilter(#[from] FilterError),

    /// Create/update payload is not an object
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Input value rejected by the codec or adapter
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Dynamic access rule denied the operation
    #[error("You do not have access to {operation} field \"{field}\"")]
    Forbidden { operation: Operation, field: String },

    /// Item not found by ID
    #[error("Item \"{id}\" not found in list \"{list}\"")]
    NotFound { list: String, id: String },

    /// Database operation failed
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    /// Service initialization failed
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl From<AccessError> for ItemServiceError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::UnknownField { field, type_name } => Self::Schema { field, type_name },
            AccessError::Forbidden { operation, field } => Self::Forbidden { operation, field },
        }
    }
}

impl ItemServiceError {
    pub fn unknown_list(list: impl Into<String>) -> Self {
        Self::UnknownList(list.into())
    }

    /// Create an item not found error
    pub fn not_found(list: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            list: list.into(),
            id: id.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema { .. } | Self::UnknownList(_) => ErrorKind::Schema,
            Self::InvalidFilter(err) if err.is_schema_error() => ErrorKind::Schema,
            Self::InvalidFilter(_)
            | Self::InvalidInput(_)
            | Self::Validation(_)
            | Self::Configuration(_) => ErrorKind::Validation,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Database(_) => ErrorKind::Database,
        }
    }

    /// Field named by the error, when there is one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Schema { field, .. } | Self::Forbidden { field, .. } => Some(field),
            Self::InvalidFilter(FilterError::UnknownField { key, .. }) => Some(key),
            Self::InvalidFilter(FilterError::UnsupportedOperator { field, .. }) => Some(field),
            Self::Validation(err) => err.field(),
            _ => None,
        }
    }
}
