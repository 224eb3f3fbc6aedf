//! Value Codec
//!
//! Converts between the external representation of a field value (JSON
//! string, number or object) and its `StoredValue`.
//!
//! | kind          | external          | stored                         |
//! |---------------|-------------------|--------------------------------|
//! | Text, Wysiwyg | string            | `Text` (identity, no trimming) |
//! | AutoIncrement | integer           | `Integer`, server assigned     |
//! | Decimal       | string or number  | `Decimal` at the field's scale |
//! | OEmbed        | URL string        | `OEmbed` metadata record       |

use crate::behaviors::adapter_bridge::AdapterBridge;
use crate::behaviors::decimal::{normalize_decimal, parse_decimal, to_scale};
use crate::config::CoreConfig;
use crate::filters::FilterOperator;
use crate::models::{FieldDescriptor, FieldKind, FilterValue, StoredValue, ValidationError};
use serde_json::Value;
use std::cmp::Ordering;

/// Result of the synchronous part of normalization
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Ready(StoredValue),
    /// OEmbed input still to be resolved through the adapter
    Resolve(String),
}

/// Capabilities every field kind provides
pub trait FieldBehavior {
    /// Whether a filter operator is legal for this kind
    fn supports(&self, operator: &FilterOperator) -> bool;

    /// Convert non-null client input
    fn normalize(&self, field: &str, external: &Value) -> Result<Normalized, ValidationError>;

    /// Convert a non-null filter literal
    fn normalize_operand(&self, field: &str, external: &Value)
        -> Result<FilterValue, ValidationError>;

    fn denormalize(&self, value: &StoredValue) -> Value;

    /// Total order over stored values of this kind
    fn compare(&self, a: &StoredValue, b: &StoredValue) -> Ordering;
}

fn expect_string<'v>(field: &str, external: &'v Value) -> Result<&'v str, ValidationError> {
    external.as_str().ok_or_else(|| {
        ValidationError::invalid_value(field, format!("expected a string, found {}", external))
    })
}

impl FieldBehavior for FieldKind {
    fn supports(&self, operator: &FilterOperator) -> bool {
        operator.is_supported_by(self)
    }

    fn normalize(&self, field: &str, external: &Value) -> Result<Normalized, ValidationError> {
        match self {
            FieldKind::Text | FieldKind::Wysiwyg => Ok(Normalized::Ready(StoredValue::Text(
                expect_string(field, external)?.to_string(),
            ))),
            FieldKind::AutoIncrement => Err(ValidationError::server_assigned(field)),
            FieldKind::Decimal { precision, scale } => Ok(Normalized::Ready(
                StoredValue::Decimal(normalize_decimal(field, external, *precision, *scale)?),
            )),
            FieldKind::OEmbed => Ok(Normalized::Resolve(
                expect_string(field, external)?.to_string(),
            )),
        }
    }

    fn normalize_operand(
        &self,
        field: &str,
        external: &Value,
    ) -> Result<FilterValue, ValidationError> {
        match self {
            FieldKind::Text | FieldKind::Wysiwyg | FieldKind::OEmbed => {
                Ok(FilterValue::Text(expect_string(field, external)?.to_string()))
            }
            FieldKind::AutoIncrement => {
                let parsed = match external {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.parse::<i64>().ok(),
                    _ => None,
                };
                parsed.map(FilterValue::Integer).ok_or_else(|| {
                    ValidationError::invalid_value(
                        field,
                        format!("expected an integer, found {}", external),
                    )
                })
            }
            // Literals keep every digit so comparisons against stored values
            // stay exact; they are not limited by precision either
            FieldKind::Decimal { .. } => Ok(FilterValue::Decimal(parse_decimal(field, external)?)),
        }
    }

    fn denormalize(&self, value: &StoredValue) -> Value {
        match (self, value) {
            (FieldKind::Decimal { scale, .. }, StoredValue::Decimal(d)) => {
                Value::String(to_scale(*d, *scale).to_string())
            }
            (_, StoredValue::Text(s)) => Value::String(s.clone()),
            (_, StoredValue::Integer(n)) => Value::from(*n),
            (_, StoredValue::Decimal(d)) => Value::String(d.to_string()),
            (_, StoredValue::OEmbed(metadata)) => match serde_json::to_value(metadata.as_ref()) {
                Ok(value) => value,
                Err(error) => {
                    tracing::warn!(
                        url = %metadata.original_url,
                        %error,
                        "Failed to serialize embed metadata, rendering null"
                    );
                    Value::Null
                }
            },
        }
    }

    fn compare(&self, a: &StoredValue, b: &StoredValue) -> Ordering {
        a.compare(b).unwrap_or(Ordering::Equal)
    }
}

/// Async entry point used by the item service
#[derive(Debug, Clone)]
pub struct ValueCodec {
    bridge: AdapterBridge,
}

impl ValueCodec {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            bridge: AdapterBridge::new(config.adapter_timeout()),
        }
    }

    /// Normalize client input for a field
    ///
    /// `null` normalizes to `None` without any lookup. AutoIncrement input is
    /// always rejected, null included.
    pub async fn normalize(
        &self,
        field: &FieldDescriptor,
        external: &Value,
    ) -> Result<Option<StoredValue>, ValidationError> {
        if field.kind == FieldKind::AutoIncrement {
            return Err(ValidationError::server_assigned(&field.name));
        }

        if external.is_null() {
            return Ok(None);
        }

        match field.kind.normalize(&field.name, external)? {
            Normalized::Ready(value) => Ok(Some(value)),
            Normalized::Resolve(url) => {
                let metadata = self.bridge.resolve(field, &url).await?;
                Ok(Some(StoredValue::OEmbed(Box::new(metadata))))
            }
        }
    }

    /// External representation of a possibly-null stored value
    pub fn denormalize(field: &FieldDescriptor, value: Option<&StoredValue>) -> Value {
        value.map_or(Value::Null, |v| field.kind.denormalize(v))
    }
}

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;
