//! Filters
//!
//! Where-clause handling, leaves first:
//!
//! - [`operator`] - flat key table (`price_lte` -> `{LessThanOrEqual, negated: false, ..}`)
//! - [`parse`] - JSON where object to a tree of filter expressions
//! - [`compiler`] - per-field predicates with normalized operands
//! - [`predicate`] - in-process evaluation (document backend)
//! - [`sql`] - parameterized `WHERE` rendering (relational backend)

pub mod compiler;
pub mod error;
pub mod operator;
pub mod parse;
pub mod predicate;
pub mod sql;

pub use compiler::{CompiledFilter, FieldPredicate, FilterCompiler};
pub use error::FilterError;
pub use operator::{BaseOperator, FilterOperator, OperatorClass};
pub use parse::{FilterExpression, Operand, WhereClause};
pub use predicate::{Comparison, MatchMode, Predicate};
pub use sql::{render_filter, SqlFragment, SqlParam};
