//! Stored and comparable values
//!
//! `StoredValue` is the canonical per-field representation held by every
//! backend. Null is never a `StoredValue`; it is the absence of one.

use fieldspace_oembed::OEmbedMetadata;
use rust_decimal::Decimal;
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Text(String),
    Integer(i64),
    /// Already rescaled to the field's scale
    Decimal(Decimal),
    OEmbed(Box<OEmbedMetadata>),
}

impl StoredValue {
    /// Textual projection used by string matching and OEmbed equality
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StoredValue::Text(s) => Some(s),
            StoredValue::OEmbed(metadata) => Some(&metadata.original_url),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            StoredValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            StoredValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_oembed(&self) -> Option<&OEmbedMetadata> {
        match self {
            StoredValue::OEmbed(metadata) => Some(metadata),
            _ => None,
        }
    }

    /// Compare against a filter literal of the same comparability class
    ///
    /// Returns `None` when the two values are not comparable.
    pub fn compare_to(&self, operand: &FilterValue) -> Option<Ordering> {
        match (self, operand) {
            (StoredValue::Integer(a), FilterValue::Integer(b)) => Some(a.cmp(b)),
            (StoredValue::Decimal(a), FilterValue::Decimal(b)) => Some(a.cmp(b)),
            (stored, FilterValue::Text(b)) => stored.as_text().map(|a| a.cmp(b.as_str())),
            _ => None,
        }
    }

    /// Compare two stored values of the same field
    pub fn compare(&self, other: &StoredValue) -> Option<Ordering> {
        match (self, other) {
            (StoredValue::Integer(a), StoredValue::Integer(b)) => Some(a.cmp(b)),
            (StoredValue::Decimal(a), StoredValue::Decimal(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_text(), b.as_text()) {
                (Some(a), Some(b)) => Some(a.cmp(b)),
                _ => None,
            },
        }
    }
}

/// Normalized filter literal
///
/// OEmbed literals are URLs and compare against `originalUrl`, so they are
/// carried as `Text`.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
}

impl FilterValue {
    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::Text(s) => Value::String(s.clone()),
            FilterValue::Integer(n) => Value::from(*n),
            FilterValue::Decimal(d) => Value::String(d.to_string()),
        }
    }
}

/// Simple per-character case folding used by every `_i` operator
///
/// Both backends fold with this function so they agree on non-ASCII input.
pub fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}
