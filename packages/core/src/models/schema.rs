//! List Schemas
//!
//! A list schema is the validated, immutable set of field descriptors for one
//! list. It can be assembled in code or loaded from a `ListDefinition`:
//!
//! ```json
//! {
//!   "key": "Product",
//!   "fields": [
//!     { "name": "name", "type": "Text", "required": true },
//!     { "name": "orderNumber", "type": "AutoIncrement" },
//!     { "name": "price", "type": "Decimal", "scale": 2 },
//!     { "name": "portfolio", "type": "OEmbed" }
//!   ]
//! }
//! ```

use crate::access::FieldAccess;
use crate::config::{CoreConfig, MAX_DECIMAL_PRECISION};
use crate::filters::operator::operator_suffixes;
use crate::models::{FieldConfig, FieldDescriptor, FieldKind, ValidationError};
use fieldspace_oembed::OEmbedAdapter;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Field names that would clash with item metadata or where-clause keys
const RESERVED_FIELD_NAMES: &[&str] = &["id", "AND", "OR"];

/// Serialized list definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDefinition {
    pub key: String,
    pub fields: Vec<FieldConfig>,
}

#[derive(Debug, Clone)]
pub struct ListSchema {
    key: String,
    fields: Vec<FieldDescriptor>,
}

impl ListSchema {
    /// Build and validate a schema
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidSchema` if:
    /// - the list key or a field name is not an identifier
    /// - a field name is reserved, duplicated or contains `__`
    /// - a field name equals another field's name plus an operator suffix
    ///   (`price` and `price_not` would make `price_not` ambiguous)
    /// - a Decimal field has precision outside `1..=18` or scale above precision
    /// - an OEmbed field has no adapter
    pub fn new(key: impl Into<String>, fields: Vec<FieldDescriptor>) -> Result<Self, ValidationError> {
        let key = key.into();

        if !is_identifier(&key) {
            return Err(ValidationError::invalid_schema(format!(
                "list key '{}' must start with a letter and contain only letters, digits and underscores",
                key
            )));
        }

        let mut names = HashSet::new();
        for field in &fields {
            validate_field(&key, field)?;

            if !names.insert(field.name.as_str()) {
                return Err(ValidationError::invalid_schema(format!(
                    "field '{}' is defined more than once on list '{}'",
                    field.name, key
                )));
            }
        }

        for field in &fields {
            for suffix in operator_suffixes() {
                let derived = format!("{}_{}", field.name, suffix);
                if names.contains(derived.as_str()) {
                    return Err(ValidationError::invalid_schema(format!(
                        "field '{}' collides with filter key '{}' of field '{}'",
                        derived, derived, field.name
                    )));
                }
            }
        }

        Ok(Self { key, fields })
    }

    /// Build a schema from a serialized definition
    ///
    /// OEmbed fields all share `adapter`; Decimal fields without precision or
    /// scale take the defaults from `config`.
    pub fn from_definition(
        definition: &ListDefinition,
        config: &CoreConfig,
        adapter: Option<Arc<dyn OEmbedAdapter>>,
    ) -> Result<Self, ValidationError> {
        let fields = definition
            .fields
            .iter()
            .map(|field_config| {
                let kind = field_config.kind(
                    config.default_decimal_precision,
                    config.default_decimal_scale,
                );
                let access = match &field_config.access {
                    Some(access_config) => FieldAccess::from_config(access_config, &kind),
                    None => FieldAccess::default_for(&kind),
                };

                let mut field = FieldDescriptor::new(field_config.name.clone(), kind)
                    .with_access(access);
                field.required = field_config.required;
                if kind == FieldKind::OEmbed {
                    field.adapter = adapter.clone();
                }
                field
            })
            .collect();

        Self::new(definition.key.clone(), fields)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Name of the create input type, used in schema errors
    pub fn create_input_type(&self) -> String {
        format!("{}CreateInput", self.key)
    }

    pub fn update_input_type(&self) -> String {
        format!("{}UpdateInput", self.key)
    }

    pub fn where_input_type(&self) -> String {
        format!("{}WhereInput", self.key)
    }

    /// Name of the output type, used for read errors
    pub fn output_type(&self) -> String {
        self.key.clone()
    }

    pub fn auto_increment_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::AutoIncrement)
    }
}

fn validate_field(list: &str, field: &FieldDescriptor) -> Result<(), ValidationError> {
    if !is_identifier(&field.name) || field.name.contains("__") {
        return Err(ValidationError::invalid_schema(format!(
            "field name '{}' on list '{}' must be an identifier without '__'",
            field.name, list
        )));
    }

    if RESERVED_FIELD_NAMES.contains(&field.name.as_str()) {
        return Err(ValidationError::invalid_schema(format!(
            "field name '{}' is reserved",
            field.name
        )));
    }

    match field.kind {
        FieldKind::Decimal { precision, scale } => {
            if precision == 0 || precision > MAX_DECIMAL_PRECISION {
                return Err(ValidationError::invalid_schema(format!(
                    "precision of '{}' must be between 1 and {}",
                    field.name, MAX_DECIMAL_PRECISION
                )));
            }
            if scale > precision {
                return Err(ValidationError::invalid_schema(format!(
                    "scale of '{}' ({}) cannot exceed its precision ({})",
                    field.name, scale, precision
                )));
            }
        }
        FieldKind::OEmbed if field.adapter.is_none() => {
            return Err(ValidationError::invalid_schema(format!(
                "OEmbed field '{}' requires an adapter",
                field.name
            )));
        }
        _ => {}
    }

    Ok(())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod schema_test;
