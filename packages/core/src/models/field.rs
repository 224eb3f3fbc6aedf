//! Field Descriptors
//!
//! A field descriptor fixes, at schema-definition time, a field's kind, its
//! access rules and its options. Descriptors are immutable once the owning
//! `ListSchema` is built.

use crate::access::{AccessConfig, FieldAccess};
use fieldspace_oembed::OEmbedAdapter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Sub-fields exposed by an OEmbed value
pub const OEMBED_SUB_FIELDS: &[&str] = &[
    "originalUrl",
    "type",
    "title",
    "description",
    "url",
    "html",
    "width",
    "height",
    "provider",
    "author",
    "thumbnail",
];

/// Closed set of field kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain string
    Text,
    /// Rich-text HTML string
    Wysiwyg,
    /// Server-assigned per-list sequence number
    AutoIncrement,
    /// Fixed-point number stored at `scale` fractional digits
    Decimal { precision: u32, scale: u32 },
    /// URL resolved to embed metadata by an adapter
    OEmbed,
}

/// Shape of the value a field kind persists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageShape {
    ScalarText,
    ScalarNumber,
    ScalarDecimal { scale: u32 },
    Composite { sub_fields: &'static [&'static str] },
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "Text",
            FieldKind::Wysiwyg => "Wysiwyg",
            FieldKind::AutoIncrement => "AutoIncrement",
            FieldKind::Decimal { .. } => "Decimal",
            FieldKind::OEmbed => "OEmbed",
        }
    }

    pub fn storage_shape(&self) -> StorageShape {
        match self {
            FieldKind::Text | FieldKind::Wysiwyg => StorageShape::ScalarText,
            FieldKind::AutoIncrement => StorageShape::ScalarNumber,
            FieldKind::Decimal { scale, .. } => StorageShape::ScalarDecimal { scale: *scale },
            FieldKind::OEmbed => StorageShape::Composite {
                sub_fields: OEMBED_SUB_FIELDS,
            },
        }
    }

    /// Text-like kinds get string matching and case-insensitive equality
    pub fn is_text_like(&self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Wysiwyg)
    }

    /// Kinds with a total order usable by `lt`/`lte`/`gt`/`gte`
    pub fn is_ordered(&self) -> bool {
        matches!(self, FieldKind::AutoIncrement | FieldKind::Decimal { .. })
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Decimal { precision, scale } => {
                write!(f, "Decimal({}, {})", precision, scale)
            }
            other => f.write_str(other.type_name()),
        }
    }
}

/// A field of a list
#[derive(Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub access: FieldAccess,
    pub required: bool,
    /// Metadata source for OEmbed fields
    pub adapter: Option<Arc<dyn OEmbedAdapter>>,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("access", &self.access)
            .field("required", &self.required)
            .field("adapter", &self.adapter.as_ref().map(|a| a.name().to_string()))
            .finish()
    }
}

impl FieldDescriptor {
    /// Create a descriptor with the kind's default access rules
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            access: FieldAccess::default_for(&kind),
            kind,
            required: false,
            adapter: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn wysiwyg(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Wysiwyg)
    }

    pub fn auto_increment(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::AutoIncrement)
    }

    pub fn decimal(name: impl Into<String>, precision: u32, scale: u32) -> Self {
        Self::new(name, FieldKind::Decimal { precision, scale })
    }

    pub fn oembed(name: impl Into<String>, adapter: Arc<dyn OEmbedAdapter>) -> Self {
        let mut field = Self::new(name, FieldKind::OEmbed);
        field.adapter = Some(adapter);
        field
    }

    pub fn with_access(mut self, access: FieldAccess) -> Self {
        self.access = access;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Serialized field kind name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Wysiwyg,
    AutoIncrement,
    Decimal,
    OEmbed,
}

/// Field definition as loaded from JSON
///
/// ```json
/// { "name": "price", "type": "Decimal", "scale": 2, "access": { "update": false } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessConfig>,
}

impl FieldConfig {
    /// Resolve the kind, filling Decimal defaults
    pub fn kind(&self, default_precision: u32, default_scale: u32) -> FieldKind {
        match self.field_type {
            FieldType::Text => FieldKind::Text,
            FieldType::Wysiwyg => FieldKind::Wysiwyg,
            FieldType::AutoIncrement => FieldKind::AutoIncrement,
            FieldType::Decimal => FieldKind::Decimal {
                precision: self.precision.unwrap_or(default_precision),
                scale: self.scale.unwrap_or(default_scale),
            },
            FieldType::OEmbed => FieldKind::OEmbed,
        }
    }
}
