//! Filter Error Types
//!
//! Raised while parsing and compiling a where clause, before any storage
//! access happens.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Key does not name a readable field with a known operator suffix
    #[error("Field \"{key}\" is not defined by type \"{type_name}\"")]
    UnknownField { key: String, type_name: String },

    /// Operator exists but is not legal for the field's kind
    #[error("Operator \"{operator}\" is not supported by {type_name} field \"{field}\"")]
    UnsupportedOperator {
        field: String,
        operator: String,
        type_name: String,
    },

    /// Operand has the wrong shape or cannot be normalized
    #[error("Invalid operand for \"{key}\": {reason}")]
    InvalidOperand { key: String, reason: String },

    /// Where clause is not an object, or `AND`/`OR` is not a list of objects
    #[error("Invalid where clause: {0}")]
    InvalidWhere(String),

    /// Sort key is malformed or names an unknown field
    #[error("Invalid sortBy \"{0}\"")]
    InvalidSort(String),
}

impl FilterError {
    pub fn unknown_field(key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnknownField {
            key: key.into(),
            type_name: type_name.into(),
        }
    }

    pub fn invalid_operand(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOperand {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_where(msg: impl Into<String>) -> Self {
        Self::InvalidWhere(msg.into())
    }

    /// Whether the error is a schema-level rejection (unknown key or illegal operator)
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownField { .. } | Self::UnsupportedOperator { .. } | Self::InvalidSort(_)
        )
    }
}
