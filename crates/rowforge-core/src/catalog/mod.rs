//! # Catalog Reader
//!
//! Read-only access to the database's own metadata: schemas, tables,
//! columns, and foreign-key constraints. Everything the tree builder and
//! the FK resolver know about the world comes through this trait.

pub mod types;

use crate::error::Result;
use crate::synth::value::Value;
use types::{ColumnInfo, FkEdge, TableRef};

/// Read-only catalog queries. Implemented by the PostgreSQL backend and
/// by the in-memory double used in tests.
pub trait Catalog: Send + Sync {
    /// List non-system schemas, alphabetically.
    fn schemas(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// Find a table by name across all non-system schemas,
    /// case-insensitively. On ambiguity, an exact-case match wins,
    /// otherwise the first schema alphabetically.
    fn find_table(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<TableRef>>> + Send;

    /// List a table's columns in ordinal order.
    fn columns(
        &self,
        table: &TableRef,
    ) -> impl std::future::Future<Output = Result<Vec<ColumnInfo>>> + Send;

    /// List a table's outgoing foreign-key constraints.
    fn foreign_keys(
        &self,
        table: &TableRef,
    ) -> impl std::future::Future<Output = Result<Vec<FkEdge>>> + Send;

    /// Fetch the foreign-key constraint backing one specific column, if
    /// there is one.
    fn foreign_key_for(
        &self,
        table: &TableRef,
        column: &str,
    ) -> impl std::future::Future<Output = Result<Option<FkEdge>>> + Send;

    /// Fetch one random existing key value from a table, or `None` when
    /// the table is empty.
    fn sample_key(
        &self,
        table: &TableRef,
    ) -> impl std::future::Future<Output = Result<Option<Value>>> + Send;
}

/// Conventional identifier column names, in the order they are tried
/// when picking a key out of a returned or sampled row.
pub const ID_COLUMN_CANDIDATES: &[&str] = &["id", "uuid", "guid", "key", "pk"];

/// Search a list of column names for the first conventional identifier,
/// falling back to the first column when none match.
pub fn pick_id_column<'a>(names: impl IntoIterator<Item = &'a str> + Clone) -> Option<&'a str> {
    for candidate in ID_COLUMN_CANDIDATES {
        for name in names.clone() {
            if name.eq_ignore_ascii_case(candidate) {
                return Some(name);
            }
        }
    }
    names.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_id_column_prefers_id() {
        let names = vec!["created_at", "id", "uuid"];
        assert_eq!(pick_id_column(names.iter().copied()), Some("id"));
    }

    #[test]
    fn pick_id_column_case_insensitive() {
        let names = vec!["Name", "ID"];
        assert_eq!(pick_id_column(names.iter().copied()), Some("ID"));
    }

    #[test]
    fn pick_id_column_falls_back_to_first() {
        let names = vec!["order_number", "total"];
        assert_eq!(pick_id_column(names.iter().copied()), Some("order_number"));
    }

    #[test]
    fn pick_id_column_empty() {
        assert_eq!(pick_id_column(std::iter::empty()), None);
    }
}
