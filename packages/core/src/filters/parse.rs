//! Where-clause parsing
//!
//! Turns a JSON where object into a tree of `FilterExpression`s. Top-level
//! keys are conjoined; `AND` and `OR` take lists of nested where objects.

use crate::filters::error::FilterError;
use crate::filters::operator::{decompose_key, BaseOperator, FilterOperator};
use crate::models::ListSchema;
use serde_json::Value;

/// Right-hand side of a filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Null,
    Value(Value),
    /// Only for `_in` / `_not_in`; may be empty or contain `Value::Null`
    List(Vec<Value>),
}

/// One `{ field, operator, operand }` triple
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpression {
    /// Original where key, kept for error messages
    pub key: String,
    pub field: String,
    pub operator: FilterOperator,
    pub operand: Operand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    And(Vec<WhereClause>),
    Or(Vec<WhereClause>),
    Condition(FilterExpression),
}

/// Parse a where object
///
/// `None` and `null` parse to an empty conjunction, which matches every item.
pub fn parse_where(schema: &ListSchema, filter: Option<&Value>) -> Result<WhereClause, FilterError> {
    match filter {
        None | Some(Value::Null) => Ok(WhereClause::And(Vec::new())),
        Some(value) => parse_object(schema, value),
    }
}

fn parse_object(schema: &ListSchema, value: &Value) -> Result<WhereClause, FilterError> {
    let object = value.as_object().ok_or_else(|| {
        FilterError::invalid_where(format!("expected an object, found {}", value))
    })?;

    let mut clauses = Vec::with_capacity(object.len());
    for (key, operand) in object {
        let clause = match key.as_str() {
            "AND" => WhereClause::And(parse_list(schema, key, operand)?),
            "OR" => WhereClause::Or(parse_list(schema, key, operand)?),
            _ => WhereClause::Condition(parse_expression(schema, key, operand)?),
        };
        clauses.push(clause);
    }

    Ok(WhereClause::And(clauses))
}

fn parse_list(schema: &ListSchema, key: &str, value: &Value) -> Result<Vec<WhereClause>, FilterError> {
    let items = value
        .as_array()
        .ok_or_else(|| FilterError::invalid_where(format!("{} expects a list of objects", key)))?;

    items.iter().map(|item| parse_object(schema, item)).collect()
}

fn parse_expression(
    schema: &ListSchema,
    key: &str,
    value: &Value,
) -> Result<FilterExpression, FilterError> {
    let (field, operator) = decompose_key(schema, key)
        .filter(|(field, _)| !field.access.read.is_statically_denied())
        .ok_or_else(|| FilterError::unknown_field(key, schema.where_input_type()))?;

    let operand = match (operator.base, value) {
        (_, Value::Null) => Operand::Null,
        (BaseOperator::In, Value::Array(items)) => Operand::List(items.clone()),
        (BaseOperator::In, other) => {
            return Err(FilterError::invalid_operand(
                key,
                format!("expected a list, found {}", other),
            ))
        }
        (_, Value::Array(_)) | (_, Value::Object(_)) => {
            return Err(FilterError::invalid_operand(
                key,
                "expected a single value".to_string(),
            ))
        }
        (_, other) => Operand::Value(other.clone()),
    };

    Ok(FilterExpression {
        key: key.to_string(),
        field: field.name.clone(),
        operator,
        operand,
    })
}
