//! Compiled predicates and their in-process evaluation
//!
//! A predicate is evaluated against the stored value of a single field, where
//! `None` is null. Every predicate is two-valued: null never yields "unknown",
//! so `Not` is the exact complement of its operand.

use crate::models::{fold_case, FilterValue, StoredValue};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Comparison {
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Comparison::LessThan => ordering == Ordering::Less,
            Comparison::LessThanOrEqual => ordering != Ordering::Greater,
            Comparison::GreaterThan => ordering == Ordering::Greater,
            Comparison::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }

    pub fn sql_operator(&self) -> &'static str {
        match self {
            Comparison::LessThan => "<",
            Comparison::LessThanOrEqual => "<=",
            Comparison::GreaterThan => ">",
            Comparison::GreaterThanOrEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Contains,
    StartsWith,
    EndsWith,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    IsNull,
    Equals(FilterValue),
    /// Operand is already case folded
    EqualsIgnoreCase(String),
    Compare(Comparison, FilterValue),
    /// `needle` is already case folded when `case_insensitive` is set
    Matches {
        mode: MatchMode,
        needle: String,
        case_insensitive: bool,
    },
    /// Set membership; a `null` element is kept as `includes_null`
    In {
        values: Vec<FilterValue>,
        includes_null: bool,
    },
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    pub fn evaluate(&self, value: Option<&StoredValue>) -> bool {
        match self {
            Predicate::IsNull => value.is_none(),
            Predicate::Equals(operand) => {
                value.and_then(|v| v.compare_to(operand)) == Some(Ordering::Equal)
            }
            Predicate::EqualsIgnoreCase(folded) => value
                .and_then(StoredValue::as_text)
                .is_some_and(|text| fold_case(text) == *folded),
            Predicate::Compare(comparison, operand) => value
                .and_then(|v| v.compare_to(operand))
                .is_some_and(|ordering| comparison.accepts(ordering)),
            Predicate::Matches {
                mode,
                needle,
                case_insensitive,
            } => value.and_then(StoredValue::as_text).is_some_and(|text| {
                if *case_insensitive {
                    string_matches(*mode, &fold_case(text), needle)
                } else {
                    string_matches(*mode, text, needle)
                }
            }),
            Predicate::In {
                values,
                includes_null,
            } => match value {
                None => *includes_null,
                Some(stored) => values
                    .iter()
                    .any(|operand| stored.compare_to(operand) == Some(Ordering::Equal)),
            },
            Predicate::Not(inner) => !inner.evaluate(value),
        }
    }
}

fn string_matches(mode: MatchMode, haystack: &str, needle: &str) -> bool {
    match mode {
        MatchMode::Contains => haystack.contains(needle),
        MatchMode::StartsWith => haystack.starts_with(needle),
        MatchMode::EndsWith => haystack.ends_with(needle),
    }
}
