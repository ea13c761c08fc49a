//! # Insertion Engine
//!
//! Dependency-first row insertion: every child of a node is inserted
//! before the node's own target table, generated keys are cached for
//! reuse, and a failure in one table never aborts its siblings or
//! ancestors.

pub mod cache;
pub mod columns;
pub mod engine;
pub mod outcome;

use indexmap::IndexMap;

use crate::catalog::types::TableRef;
use crate::error::Result;
use crate::synth::value::Value;

/// A successfully inserted row as the database returned it, plus the
/// statement that produced it.
#[derive(Debug, Clone)]
pub struct InsertedRow {
    pub sql: String,
    pub row: IndexMap<String, Value>,
}

/// Executes one parameterized insert and hands the generated row back.
/// Implemented by the PostgreSQL backend and the in-memory test double.
pub trait Inserter: Send + Sync {
    /// Insert one row with the given column/value set, requesting every
    /// column of the new row back. An empty column set inserts the
    /// table's defaults.
    fn insert_returning(
        &self,
        table: &TableRef,
        columns: &[String],
        values: &[Value],
    ) -> impl std::future::Future<Output = Result<InsertedRow>> + Send;
}

pub use cache::IdCache;
pub use columns::{required_columns, ColumnRole, RequiredColumn};
pub use engine::InsertEngine;
pub use outcome::{InsertOutcome, OutcomeError, RunReport};
