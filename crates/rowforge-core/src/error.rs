//! # Error Types
//!
//! Defines `RowForgeError`, the unified error enum for every failure mode
//! in a rowforge run. Each variant carries enough context (table, SQL
//! snippet, database error code) to read the failure without digging
//! through logs.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// All errors that can occur in rowforge operations.
#[derive(Error, Debug)]
pub enum RowForgeError {
    #[error("Database connection failed: {message}\n  Connection string: {connection_hint}\n  Cause: {source}")]
    Connection {
        message: String,
        connection_hint: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Catalog query '{query}' failed: {source}")]
    Catalog {
        query: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("No database URL provided. rowforge looks for a connection in this order:\n  1. --db flag\n  2. DATABASE_URL environment variable\n  3. .env file with DATABASE_URL\n  4. rowforge.toml [database] section\n\nExample: rowforge seed orders --db postgres://localhost/myapp")]
    NoDatabaseUrl,

    #[error("Table '{name}' not found in any non-system schema")]
    TableNotFound { name: String },

    #[error("Table {table} has no insertable columns (every column is generated or optional)")]
    NoRequiredColumns { table: String },

    #[error("Insert failed on {table} ({kind}): {message}\n  SQL: {sql_preview}")]
    Insert {
        table: String,
        kind: ConstraintKind,
        code: Option<String>,
        message: String,
        sql_preview: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Other(String),
}

impl RowForgeError {
    /// The database error code (SQLSTATE) for insert failures, when the
    /// database reported one.
    pub fn sqlstate(&self) -> Option<&str> {
        match self {
            RowForgeError::Insert { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Human-readable category for a failed insert, derived from the
/// database's own SQLSTATE code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConstraintKind {
    ForeignKey,
    Unique,
    Check,
    NotNull,
    Connectivity,
    Other,
}

impl ConstraintKind {
    /// Map a SQLSTATE to a category. Class 23 is integrity-constraint
    /// violation; class 08 is connection failure.
    pub fn from_sqlstate(code: Option<&str>) -> Self {
        match code {
            Some("23503") => ConstraintKind::ForeignKey,
            Some("23505") => ConstraintKind::Unique,
            Some("23514") => ConstraintKind::Check,
            Some("23502") => ConstraintKind::NotNull,
            Some(c) if c.starts_with("08") => ConstraintKind::Connectivity,
            _ => ConstraintKind::Other,
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::ForeignKey => write!(f, "foreign key violation"),
            ConstraintKind::Unique => write!(f, "unique violation"),
            ConstraintKind::Check => write!(f, "check violation"),
            ConstraintKind::NotNull => write!(f, "not-null violation"),
            ConstraintKind::Connectivity => write!(f, "connection failure"),
            ConstraintKind::Other => write!(f, "database error"),
        }
    }
}

pub type Result<T> = std::result::Result<T, RowForgeError>;
