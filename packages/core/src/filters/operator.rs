//! Filter Operator Table
//!
//! Flat where-clause keys (`price_lte`, `content_not_contains_i`, ...) are
//! decomposed here, once, into a `FilterOperator`. Nothing past this module
//! matches operator strings.

use crate::models::{FieldDescriptor, FieldKind, ListSchema};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseOperator {
    Equals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Contains,
    StartsWith,
    EndsWith,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorClass {
    Equality,
    Ordering,
    StringMatch,
    Set,
}

impl BaseOperator {
    pub fn class(&self) -> OperatorClass {
        match self {
            BaseOperator::Equals => OperatorClass::Equality,
            BaseOperator::LessThan
            | BaseOperator::LessThanOrEqual
            | BaseOperator::GreaterThan
            | BaseOperator::GreaterThanOrEqual => OperatorClass::Ordering,
            BaseOperator::Contains | BaseOperator::StartsWith | BaseOperator::EndsWith => {
                OperatorClass::StringMatch
            }
            BaseOperator::In => OperatorClass::Set,
        }
    }
}

/// Decomposed operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterOperator {
    pub base: BaseOperator,
    pub negated: bool,
    pub case_insensitive: bool,
}

impl FilterOperator {
    pub const fn new(base: BaseOperator, negated: bool, case_insensitive: bool) -> Self {
        Self {
            base,
            negated,
            case_insensitive,
        }
    }

    pub fn class(&self) -> OperatorClass {
        self.base.class()
    }

    /// Key suffix for this operator (`""` for plain equality)
    pub fn suffix(&self) -> &'static str {
        OPERATOR_TABLE
            .iter()
            .find(|(_, op)| op == self)
            .map(|(suffix, _)| *suffix)
            .unwrap_or("")
    }

    /// Whether `kind` accepts this operator
    ///
    /// - Equality and set membership exist for every kind
    /// - Ordering exists for AutoIncrement and Decimal
    /// - String matching and every `_i` twin exist for Text and Wysiwyg only
    pub fn is_supported_by(&self, kind: &FieldKind) -> bool {
        if self.case_insensitive && !kind.is_text_like() {
            return false;
        }

        match self.class() {
            OperatorClass::Equality | OperatorClass::Set => true,
            OperatorClass::Ordering => kind.is_ordered(),
            OperatorClass::StringMatch => kind.is_text_like(),
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suffix() {
            "" => f.write_str("eq"),
            suffix => f.write_str(suffix),
        }
    }
}

use BaseOperator::*;

/// Every legal key suffix and the operator it decodes to
const OPERATOR_TABLE: &[(&str, FilterOperator)] = &[
    ("", FilterOperator::new(Equals, false, false)),
    ("not", FilterOperator::new(Equals, true, false)),
    ("i", FilterOperator::new(Equals, false, true)),
    ("not_i", FilterOperator::new(Equals, true, true)),
    ("lt", FilterOperator::new(LessThan, false, false)),
    ("lte", FilterOperator::new(LessThanOrEqual, false, false)),
    ("gt", FilterOperator::new(GreaterThan, false, false)),
    ("gte", FilterOperator::new(GreaterThanOrEqual, false, false)),
    ("contains", FilterOperator::new(Contains, false, false)),
    ("not_contains", FilterOperator::new(Contains, true, false)),
    ("contains_i", FilterOperator::new(Contains, false, true)),
    ("not_contains_i", FilterOperator::new(Contains, true, true)),
    ("starts_with", FilterOperator::new(StartsWith, false, false)),
    ("not_starts_with", FilterOperator::new(StartsWith, true, false)),
    ("starts_with_i", FilterOperator::new(StartsWith, false, true)),
    ("not_starts_with_i", FilterOperator::new(StartsWith, true, true)),
    ("ends_with", FilterOperator::new(EndsWith, false, false)),
    ("not_ends_with", FilterOperator::new(EndsWith, true, false)),
    ("ends_with_i", FilterOperator::new(EndsWith, false, true)),
    ("not_ends_with_i", FilterOperator::new(EndsWith, true, true)),
    ("in", FilterOperator::new(In, false, false)),
    ("not_in", FilterOperator::new(In, true, false)),
];

/// Non-empty key suffixes, longest first
pub fn operator_suffixes() -> impl Iterator<Item = &'static str> {
    let mut suffixes: Vec<&'static str> = OPERATOR_TABLE
        .iter()
        .map(|(suffix, _)| *suffix)
        .filter(|suffix| !suffix.is_empty())
        .collect();
    suffixes.sort_by_key(|suffix| std::cmp::Reverse(suffix.len()));
    suffixes.into_iter()
}

/// Look up the operator for a bare suffix (`"not_in"`, `"contains_i"`)
pub fn lookup_suffix(suffix: &str) -> Option<FilterOperator> {
    OPERATOR_TABLE
        .iter()
        .find(|(s, _)| *s == suffix)
        .map(|(_, op)| *op)
}

/// Split a where key into its field and operator
///
/// An exact field name is plain equality. Otherwise the longest suffix whose
/// remaining prefix names a field wins; schema validation guarantees at most
/// one candidate exists. Support for the field's kind is checked by the
/// compiler, not here.
pub fn decompose_key<'s>(
    schema: &'s ListSchema,
    key: &str,
) -> Option<(&'s FieldDescriptor, FilterOperator)> {
    if let Some(field) = schema.field(key) {
        return lookup_suffix("").map(|op| (field, op));
    }

    operator_suffixes().find_map(|suffix| {
        let field_name = key.strip_suffix(suffix)?.strip_suffix('_')?;
        let field = schema.field(field_name)?;
        lookup_suffix(suffix).map(|op| (field, op))
    })
}

#[cfg(test)]
#[path = "operator_test.rs"]
mod operator_test;
