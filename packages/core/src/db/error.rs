//! Database Error Types
//!
//! This module defines error types for item storage, covering connection,
//! initialization, query and row decoding failures for every backend.

use std::path::PathBuf;
use thiserror::Error;

/// Storage operation errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish database connection
    #[error("Failed to connect to database at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// Failed to initialize database schema
    #[error("Failed to initialize database schema: {0}")]
    InitializationFailed(String),

    /// Failed to create parent directory
    #[error("Failed to create parent directory for database: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    /// libsql operation error
    #[error("Database operation failed: {0}")]
    LibsqlError(#[from] libsql::Error),

    /// SQL execution error with context
    #[error("SQL execution failed: {context}")]
    SqlExecutionError { context: String },

    /// Operation on a list whose storage was never prepared
    #[error("List '{0}' has not been prepared in this store")]
    ListNotPrepared(String),

    /// Stored row could not be decoded into an item
    #[error("Corrupt row in list '{list}': {context}")]
    CorruptRow { list: String, context: String },
}

impl DatabaseError {
    /// Create a connection failed error
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    /// Create an initialization failed error
    pub fn initialization_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    /// Create a SQL execution error with context
    pub fn sql_execution(context: impl Into<String>) -> Self {
        Self::SqlExecutionError {
            context: context.into(),
        }
    }

    pub fn list_not_prepared(list: impl Into<String>) -> Self {
        Self::ListNotPrepared(list.into())
    }

    pub fn corrupt_row(list: impl Into<String>, context: impl Into<String>) -> Self {
        Self::CorruptRow {
            list: list.into(),
            context: context.into(),
        }
    }
}
