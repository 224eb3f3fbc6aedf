//! Access Policy Gate
//!
//! Every field carries one rule per operation (create, read, update). A rule
//! is either a static boolean or a predicate over the request context.
//!
//! - Statically denied fields are not part of the input type at all: a request
//!   naming one fails with `AccessError::UnknownField` before any access check.
//! - Dynamically denied fields fail during authorization with
//!   `AccessError::Forbidden`.
//!
//! AutoIncrement fields are statically denied for create and update unless
//! the schema says otherwise.

use crate::models::{FieldDescriptor, FieldKind, ListSchema};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Operation a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => f.write_str("create"),
            Operation::Read => f.write_str("read"),
            Operation::Update => f.write_str("update"),
        }
    }
}

/// Caller identity carried by every service request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub principal: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_principal(principal: impl Into<String>) -> Self {
        Self {
            principal: Some(principal.into()),
        }
    }
}

/// What a dynamic rule gets to look at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext<'a> {
    pub principal: Option<&'a str>,
    pub operation: Operation,
    pub list: &'a str,
    /// Set for update and read
    pub item_id: Option<&'a str>,
}

pub type AccessPredicate = Arc<dyn Fn(&AccessContext<'_>) -> bool + Send + Sync>;

#[derive(Clone)]
pub enum AccessRule {
    Static(bool),
    Dynamic(AccessPredicate),
}

impl AccessRule {
    pub fn allowed() -> Self {
        AccessRule::Static(true)
    }

    pub fn denied() -> Self {
        AccessRule::Static(false)
    }

    pub fn dynamic<F>(predicate: F) -> Self
    where
        F: Fn(&AccessContext<'_>) -> bool + Send + Sync + 'static,
    {
        AccessRule::Dynamic(Arc::new(predicate))
    }

    pub fn is_statically_denied(&self) -> bool {
        matches!(self, AccessRule::Static(false))
    }

    pub fn evaluate(&self, ctx: &AccessContext<'_>) -> bool {
        match self {
            AccessRule::Static(allowed) => *allowed,
            AccessRule::Dynamic(predicate) => predicate(ctx),
        }
    }
}

impl fmt::Debug for AccessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessRule::Static(allowed) => write!(f, "Static({})", allowed),
            AccessRule::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<bool> for AccessRule {
    fn from(allowed: bool) -> Self {
        AccessRule::Static(allowed)
    }
}

/// Per-field access rules
#[derive(Debug, Clone)]
pub struct FieldAccess {
    pub create: AccessRule,
    pub read: AccessRule,
    pub update: AccessRule,
}

impl Default for FieldAccess {
    fn default() -> Self {
        Self::open()
    }
}

impl FieldAccess {
    pub fn open() -> Self {
        Self {
            create: AccessRule::allowed(),
            read: AccessRule::allowed(),
            update: AccessRule::allowed(),
        }
    }

    /// Readable, never writable by clients
    pub fn read_only() -> Self {
        Self {
            create: AccessRule::denied(),
            read: AccessRule::allowed(),
            update: AccessRule::denied(),
        }
    }

    pub fn default_for(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::AutoIncrement => Self::read_only(),
            _ => Self::open(),
        }
    }

    /// Overlay a serialized config on the kind's defaults
    pub fn from_config(config: &AccessConfig, kind: &FieldKind) -> Self {
        let mut access = Self::default_for(kind);
        if let Some(create) = config.create {
            access.create = create.into();
        }
        if let Some(read) = config.read {
            access.read = read.into();
        }
        if let Some(update) = config.update {
            access.update = update.into();
        }
        access
    }

    pub fn with_create(mut self, rule: AccessRule) -> Self {
        self.create = rule;
        self
    }

    pub fn with_read(mut self, rule: AccessRule) -> Self {
        self.read = rule;
        self
    }

    pub fn with_update(mut self, rule: AccessRule) -> Self {
        self.update = rule;
        self
    }

    pub fn rule(&self, operation: Operation) -> &AccessRule {
        match operation {
            Operation::Create => &self.create,
            Operation::Read => &self.read,
            Operation::Update => &self.update,
        }
    }
}

/// Serialized access flags; unset entries keep the kind's default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<bool>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Field is unknown or statically excluded from the input/output type
    #[error("Field \"{field}\" is not defined by type \"{type_name}\"")]
    UnknownField { field: String, type_name: String },

    /// Dynamic rule denied the operation
    #[error("You do not have access to {operation} field \"{field}\"")]
    Forbidden { operation: Operation, field: String },
}

fn type_name(schema: &ListSchema, operation: Operation) -> String {
    match operation {
        Operation::Create => schema.create_input_type(),
        Operation::Update => schema.update_input_type(),
        Operation::Read => schema.output_type(),
    }
}

/// Resolve the fields a request names against the operation's type
///
/// Unknown and statically denied fields both fail as `UnknownField`; the
/// first offending field in input order is reported.
pub fn check_input_fields<'s, 'n>(
    schema: &'s ListSchema,
    operation: Operation,
    names: impl IntoIterator<Item = &'n str>,
) -> Result<Vec<&'s FieldDescriptor>, AccessError> {
    names
        .into_iter()
        .map(|name| match schema.field(name) {
            Some(field) if !field.access.rule(operation).is_statically_denied() => Ok(field),
            _ => Err(AccessError::UnknownField {
                field: name.to_string(),
                type_name: type_name(schema, operation),
            }),
        })
        .collect()
}

/// Evaluate the rules of already resolved fields
pub fn authorize(ctx: &AccessContext<'_>, fields: &[&FieldDescriptor]) -> Result<(), AccessError> {
    for field in fields {
        if !field.access.rule(ctx.operation).evaluate(ctx) {
            tracing::debug!(
                list = ctx.list,
                field = %field.name,
                operation = %ctx.operation,
                "Access denied by dynamic rule"
            );
            return Err(AccessError::Forbidden {
                operation: ctx.operation,
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}

/// Fields the caller may see when no explicit selection is made
///
/// Dynamically denied fields are left out silently.
pub fn readable_fields<'s>(
    schema: &'s ListSchema,
    ctx: &AccessContext<'_>,
) -> Vec<&'s FieldDescriptor> {
    schema
        .fields()
        .iter()
        .filter(|field| field.access.read.evaluate(ctx))
        .collect()
}
