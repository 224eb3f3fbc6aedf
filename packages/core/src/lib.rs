//! FieldSpace Core - Pluggable Field Types and Filter Compiler
//!
//! This crate provides the field-type contract of a schema-driven data layer
//! and the machinery that makes every field kind behave the same way under
//! create, update, read and query.
//!
//! # Architecture
//!
//! - **Closed field kinds**: Text, Wysiwyg, AutoIncrement, Decimal and OEmbed
//!   share one capability trait (`FieldBehavior`)
//! - **Flat filter keys**: `price_lte`, `content_not_i`, `name_in`... are
//!   decomposed once into `{base, negated, caseInsensitive}` and compiled to a
//!   backend-neutral predicate tree
//! - **Two backends**: an in-process document store and a libsql relational
//!   store must select exactly the same items for every filter
//!
//! # Modules
//!
//! - [`models`] - Field descriptors, list schemas, items and stored values
//! - [`behaviors`] - Value codec, decimal arithmetic and the adapter bridge
//! - [`filters`] - Operator table, where-clause parsing, compilation, SQL rendering
//! - [`access`] - Per-field create/read/update rules
//! - [`db`] - `ItemStore` trait with memory and libsql backends
//! - [`services`] - Item and query services
//! - [`config`] - Runtime configuration

pub mod access;
pub mod behaviors;
pub mod config;
pub mod db;
pub mod filters;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use access::{AccessRule, FieldAccess, Operation, RequestContext};
pub use config::CoreConfig;
pub use db::{ItemStore, MemoryStore, TursoStore};
pub use filters::{CompiledFilter, FilterCompiler, FilterError};
pub use models::*;
pub use services::*;
