//! Filter Compiler
//!
//! Compiles a parsed where clause against a list schema into a
//! `CompiledFilter`: a tree of per-field predicates whose operands are already
//! normalized through the field's codec. Both backends consume the same tree,
//! the document backend through `CompiledFilter::matches` and the relational
//! backend through `sql::render_filter`.

use crate::behaviors::FieldBehavior;
use crate::config::CoreConfig;
use crate::filters::error::FilterError;
use crate::filters::operator::{BaseOperator, OperatorClass};
use crate::filters::parse::{parse_where, FilterExpression, Operand, WhereClause};
use crate::filters::predicate::{Comparison, MatchMode, Predicate};
use crate::models::{fold_case, FieldDescriptor, FieldKind, FilterValue, Item, ListSchema};
use serde_json::Value;

/// Predicate over one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    pub field: String,
    pub kind: FieldKind,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompiledFilter {
    /// Empty conjunction matches everything
    And(Vec<CompiledFilter>),
    /// Empty disjunction is treated as no constraint
    Or(Vec<CompiledFilter>),
    Field(FieldPredicate),
}

impl CompiledFilter {
    pub fn match_all() -> Self {
        CompiledFilter::And(Vec::new())
    }

    pub fn is_match_all(&self) -> bool {
        match self {
            CompiledFilter::And(children) | CompiledFilter::Or(children) => {
                children.iter().all(CompiledFilter::is_match_all)
            }
            CompiledFilter::Field(_) => false,
        }
    }

    /// Evaluate against an item in process
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            CompiledFilter::And(children) => children.iter().all(|c| c.matches(item)),
            CompiledFilter::Or(children) => {
                children.is_empty() || children.iter().any(|c| c.matches(item))
            }
            CompiledFilter::Field(field) => field.predicate.evaluate(item.get(&field.field)),
        }
    }

    /// Names of the fields the filter reads, in first-use order
    pub fn field_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_field_names(&mut names);
        names
    }

    fn collect_field_names<'s>(&'s self, names: &mut Vec<&'s str>) {
        match self {
            CompiledFilter::And(children) | CompiledFilter::Or(children) => {
                for child in children {
                    child.collect_field_names(names);
                }
            }
            CompiledFilter::Field(field) => {
                if !names.contains(&field.field.as_str()) {
                    names.push(&field.field);
                }
            }
        }
    }
}

/// Compiles where clauses for one list
pub struct FilterCompiler<'a> {
    schema: &'a ListSchema,
    max_in_list_len: usize,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(schema: &'a ListSchema, config: &CoreConfig) -> Self {
        Self {
            schema,
            max_in_list_len: config.max_in_list_len,
        }
    }

    /// Parse and compile a JSON where object
    pub fn compile_where(&self, filter: Option<&Value>) -> Result<CompiledFilter, FilterError> {
        let clause = parse_where(self.schema, filter)?;
        let compiled = self.compile(&clause)?;

        tracing::debug!(list = self.schema.key(), filter = ?compiled, "Compiled where clause");
        Ok(compiled)
    }

    pub fn compile(&self, clause: &WhereClause) -> Result<CompiledFilter, FilterError> {
        match clause {
            WhereClause::And(children) => Ok(CompiledFilter::And(
                children
                    .iter()
                    .map(|c| self.compile(c))
                    .collect::<Result<_, _>>()?,
            )),
            WhereClause::Or(children) => Ok(CompiledFilter::Or(
                children
                    .iter()
                    .map(|c| self.compile(c))
                    .collect::<Result<_, _>>()?,
            )),
            WhereClause::Condition(expr) => self.compile_expression(expr).map(CompiledFilter::Field),
        }
    }

    /// Compile a single `{ field, operator, operand }`
    pub fn compile_expression(&self, expr: &FilterExpression) -> Result<FieldPredicate, FilterError> {
        let field = self
            .schema
            .field(&expr.field)
            .ok_or_else(|| FilterError::unknown_field(&expr.key, self.schema.where_input_type()))?;

        let operator = expr.operator;
        if !field.kind.supports(&operator) {
            return Err(FilterError::UnsupportedOperator {
                field: field.name.clone(),
                operator: operator.to_string(),
                type_name: field.type_name().to_string(),
            });
        }

        let positive = match (operator.class(), &expr.operand) {
            (_, Operand::List(_)) if operator.base != BaseOperator::In => {
                return Err(FilterError::invalid_operand(&expr.key, "expected a single value"))
            }
            (OperatorClass::Equality, Operand::Null) => Predicate::IsNull,
            (OperatorClass::Equality, Operand::Value(value)) => {
                if operator.case_insensitive {
                    Predicate::EqualsIgnoreCase(fold_case(&self.text_operand(field, expr, value)?))
                } else {
                    Predicate::Equals(self.operand(field, expr, value)?)
                }
            }
            (OperatorClass::Ordering, Operand::Value(value)) => {
                Predicate::Compare(comparison(operator.base), self.operand(field, expr, value)?)
            }
            (OperatorClass::StringMatch, Operand::Value(value)) => {
                let text = self.text_operand(field, expr, value)?;
                Predicate::Matches {
                    mode: match_mode(operator.base),
                    needle: if operator.case_insensitive {
                        fold_case(&text)
                    } else {
                        text
                    },
                    case_insensitive: operator.case_insensitive,
                }
            }
            (OperatorClass::Set, Operand::List(items)) => self.compile_in(field, expr, items)?,
            (OperatorClass::Set, _) => {
                return Err(FilterError::invalid_operand(&expr.key, "expected a list"))
            }
            (_, Operand::Null) => {
                return Err(FilterError::invalid_operand(
                    &expr.key,
                    format!("null is not a valid operand for \"{}\"", operator),
                ))
            }
            (_, Operand::List(_)) => {
                return Err(FilterError::invalid_operand(&expr.key, "expected a single value"))
            }
        };

        let predicate = if operator.negated {
            positive.negate()
        } else {
            positive
        };

        Ok(FieldPredicate {
            field: field.name.clone(),
            kind: field.kind,
            predicate,
        })
    }

    fn compile_in(
        &self,
        field: &FieldDescriptor,
        expr: &FilterExpression,
        items: &[Value],
    ) -> Result<Predicate, FilterError> {
        if items.len() > self.max_in_list_len {
            return Err(FilterError::invalid_operand(
                &expr.key,
                format!(
                    "list has {} elements, at most {} are allowed",
                    items.len(),
                    self.max_in_list_len
                ),
            ));
        }

        let mut values = Vec::with_capacity(items.len());
        let mut includes_null = false;
        for item in items {
            match item {
                Value::Null => includes_null = true,
                other => values.push(self.operand(field, expr, other)?),
            }
        }

        Ok(Predicate::In {
            values,
            includes_null,
        })
    }

    fn operand(
        &self,
        field: &FieldDescriptor,
        expr: &FilterExpression,
        value: &Value,
    ) -> Result<FilterValue, FilterError> {
        field
            .kind
            .normalize_operand(&field.name, value)
            .map_err(|e| FilterError::invalid_operand(&expr.key, e.to_string()))
    }

    fn text_operand(
        &self,
        field: &FieldDescriptor,
        expr: &FilterExpression,
        value: &Value,
    ) -> Result<String, FilterError> {
        match self.operand(field, expr, value)? {
            FilterValue::Text(text) => Ok(text),
            other => Err(FilterError::invalid_operand(
                &expr.key,
                format!("expected a string, found {}", other.to_json()),
            )),
        }
    }
}

fn comparison(base: BaseOperator) -> Comparison {
    match base {
        BaseOperator::LessThan => Comparison::LessThan,
        BaseOperator::LessThanOrEqual => Comparison::LessThanOrEqual,
        BaseOperator::GreaterThan => Comparison::GreaterThan,
        _ => Comparison::GreaterThanOrEqual,
    }
}

fn match_mode(base: BaseOperator) -> MatchMode {
    match base {
        BaseOperator::StartsWith => MatchMode::StartsWith,
        BaseOperator::EndsWith => MatchMode::EndsWith,
        _ => MatchMode::Contains,
    }
}

#[cfg(test)]
#[path = "compiler_test.rs"]
mod compiler_test;
