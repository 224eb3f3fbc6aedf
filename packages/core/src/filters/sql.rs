//! SQL rendering of compiled filters
//!
//! Produces a parameterized `WHERE` fragment for the relational backend. Each
//! field predicate renders to an expression that is never SQL `NULL`, so
//! `NOT (...)` keeps the exact complement semantics of the in-process
//! evaluator.
//!
//! Decimal literals may carry more digits than the field's scale. Ordering
//! operands are moved to the nearest representable bound (`lt`/`gte` round
//! up, `lte`/`gt` round down) and equality against an unrepresentable
//! literal matches nothing.
//!
//! String matching compares bytes (`CAST(.. AS BLOB)`), since SQLite's text
//! `length()` stops at the first NUL.
//!
//! Column layout per field (see `TursoStore`):
//!
//! | kind           | columns                               |
//! |----------------|---------------------------------------|
//! | Text, Wysiwyg  | `f_<name>`, `f_<name>__folded`        |
//! | AutoIncrement  | `f_<name>` (INTEGER)                  |
//! | Decimal        | `f_<name>` (INTEGER mantissa at scale) |
//! | OEmbed         | `f_<name>` (originalUrl), `f_<name>__data` (JSON) |

use crate::filters::compiler::{CompiledFilter, FieldPredicate};
use crate::filters::predicate::{Comparison, MatchMode, Predicate};
use crate::models::{FilterValue, StorageShape};
use rust_decimal::{Decimal, RoundingStrategy};

/// Bound parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    Integer(i64),
}

/// `WHERE` fragment with positional `?` parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Quoted value column of a field
pub fn value_column(field: &str) -> String {
    format!("\"f_{}\"", field)
}

/// Quoted case-folded shadow column of a text-like field
pub fn folded_column(field: &str) -> String {
    format!("\"f_{}__folded\"", field)
}

/// Quoted JSON metadata column of an OEmbed field
pub fn data_column(field: &str) -> String {
    format!("\"f_{}__data\"", field)
}

/// Integer mantissa of `value` at `scale`
///
/// Values outside the `i64` range saturate. Stored decimals never exceed 18
/// digits, so a saturated literal still orders correctly against all of them.
pub fn decimal_mantissa(value: Decimal, scale: u32) -> i64 {
    let mut scaled = value;
    scaled.rescale(scale);
    let mantissa = scaled.mantissa();
    i64::try_from(mantissa).unwrap_or(if mantissa < 0 { i64::MIN } else { i64::MAX })
}

/// Render a compiled filter
pub fn render_filter(filter: &CompiledFilter) -> SqlFragment {
    let mut fragment = SqlFragment {
        sql: String::new(),
        params: Vec::new(),
    };
    render_node(filter, &mut fragment);
    fragment
}

fn render_node(filter: &CompiledFilter, out: &mut SqlFragment) {
    match filter {
        CompiledFilter::And(children) => render_group(children, " AND ", "1", out),
        CompiledFilter::Or(children) => render_group(children, " OR ", "1", out),
        CompiledFilter::Field(field) => render_field(field, &field.predicate, out),
    }
}

fn render_group(children: &[CompiledFilter], joiner: &str, empty: &str, out: &mut SqlFragment) {
    if children.is_empty() {
        out.sql.push_str(empty);
        return;
    }

    out.sql.push('(');
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            out.sql.push_str(joiner);
        }
        render_node(child, out);
    }
    out.sql.push(')');
}

/// Scale of the integer mantissa stored for a decimal field
fn decimal_scale(field: &FieldPredicate) -> Option<u32> {
    match field.kind.storage_shape() {
        StorageShape::ScalarDecimal { scale } => Some(scale),
        _ => None,
    }
}

/// Parameter for an exact match; `None` when the literal cannot equal any
/// stored value of the field
fn bind_exact(field: &FieldPredicate, value: &FilterValue) -> Option<SqlParam> {
    match (value, decimal_scale(field)) {
        (FilterValue::Text(s), _) => Some(SqlParam::Text(s.clone())),
        (FilterValue::Integer(n), _) => Some(SqlParam::Integer(*n)),
        (FilterValue::Decimal(d), Some(scale)) => {
            (d.round_dp(scale) == *d).then(|| SqlParam::Integer(decimal_mantissa(*d, scale)))
        }
        (FilterValue::Decimal(d), None) => Some(SqlParam::Text(d.to_string())),
    }
}

/// Parameter for an ordering comparison
fn bind_bound(field: &FieldPredicate, comparison: Comparison, value: &FilterValue) -> SqlParam {
    match (value, decimal_scale(field)) {
        (FilterValue::Decimal(d), Some(scale)) => {
            let strategy = match comparison {
                Comparison::LessThan | Comparison::GreaterThanOrEqual => {
                    RoundingStrategy::ToPositiveInfinity
                }
                Comparison::LessThanOrEqual | Comparison::GreaterThan => {
                    RoundingStrategy::ToNegativeInfinity
                }
            };
            SqlParam::Integer(decimal_mantissa(
                d.round_dp_with_strategy(scale, strategy),
                scale,
            ))
        }
        (FilterValue::Text(s), _) => SqlParam::Text(s.clone()),
        (FilterValue::Integer(n), _) => SqlParam::Integer(*n),
        (FilterValue::Decimal(d), None) => SqlParam::Text(d.to_string()),
    }
}

fn blob(expr: &str) -> String {
    format!("CAST({} AS BLOB)", expr)
}

fn render_field(field: &FieldPredicate, predicate: &Predicate, out: &mut SqlFragment) {
    let column = value_column(&field.field);

    match predicate {
        Predicate::IsNull => {
            out.sql.push_str(&format!("{} IS NULL", column));
        }
        Predicate::Equals(value) => match bind_exact(field, value) {
            Some(param) => {
                out.sql
                    .push_str(&format!("({c} IS NOT NULL AND {c} = ?)", c = column));
                out.params.push(param);
            }
            None => out.sql.push('0'),
        },
        Predicate::EqualsIgnoreCase(folded) => {
            out.sql.push_str(&format!(
                "({c} IS NOT NULL AND {c} = ?)",
                c = folded_column(&field.field)
            ));
            out.params.push(SqlParam::Text(folded.clone()));
        }
        Predicate::Compare(comparison, value) => {
            out.sql.push_str(&format!(
                "({c} IS NOT NULL AND {c} {op} ?)",
                c = column,
                op = comparison.sql_operator()
            ));
            out.params.push(bind_bound(field, *comparison, value));
        }
        Predicate::Matches {
            mode,
            needle,
            case_insensitive,
        } => {
            let c = if *case_insensitive {
                folded_column(&field.field)
            } else {
                column
            };
            let haystack = blob(&c);
            let needle_blob = blob("?");
            match mode {
                MatchMode::Contains => {
                    out.sql.push_str(&format!(
                        "({c} IS NOT NULL AND instr({h}, {n}) > 0)",
                        c = c,
                        h = haystack,
                        n = needle_blob
                    ));
                    out.params.push(SqlParam::Text(needle.clone()));
                }
                MatchMode::StartsWith => {
                    out.sql.push_str(&format!(
                        "({c} IS NOT NULL AND substr({h}, 1, length({n})) = {n})",
                        c = c,
                        h = haystack,
                        n = needle_blob
                    ));
                    out.params.push(SqlParam::Text(needle.clone()));
                    out.params.push(SqlParam::Text(needle.clone()));
                }
                MatchMode::EndsWith => {
                    out.sql.push_str(&format!(
                        "({c} IS NOT NULL AND length({h}) >= length({n}) AND substr({h}, length({h}) - length({n}) + 1) = {n})",
                        c = c,
                        h = haystack,
                        n = needle_blob
                    ));
                    for _ in 0..3 {
                        out.params.push(SqlParam::Text(needle.clone()));
                    }
                }
            }
        }
        Predicate::In {
            values,
            includes_null,
        } => {
            let params: Vec<SqlParam> =
                values.iter().filter_map(|v| bind_exact(field, v)).collect();
            match (params.is_empty(), includes_null) {
                (true, false) => out.sql.push('0'),
                (true, true) => out.sql.push_str(&format!("{} IS NULL", column)),
                (false, _) => {
                    let placeholders = vec!["?"; params.len()].join(", ");
                    let membership = format!(
                        "({c} IS NOT NULL AND {c} IN ({p}))",
                        c = column,
                        p = placeholders
                    );
                    if *includes_null {
                        out.sql
                            .push_str(&format!("({} OR {} IS NULL)", membership, column));
                    } else {
                        out.sql.push_str(&membership);
                    }
                    out.params.extend(params);
                }
            }
        }
        Predicate::Not(inner) => {
            out.sql.push_str("NOT (");
            render_field(field, inner, out);
            out.sql.push(')');
        }
    }
}
