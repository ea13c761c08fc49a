use serde::Serialize;

use crate::catalog::types::{ColumnInfo, DataType, FkEdge};

/// Why a column made it into the insert set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnRole {
    /// Backed by a foreign-key constraint; always included so
    /// referential density stays predictable even when nullable.
    ForeignKey,
    /// NOT NULL without a database-side default.
    Required,
    /// Everything else; not inserted.
    Optional,
}

/// One column the engine must fill for a single insert attempt.
/// Produced fresh per table per attempt, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RequiredColumn {
    pub name: String,
    pub data_type: DataType,
    pub max_length: Option<u32>,
    pub nullable: bool,
    pub role: ColumnRole,
}

/// Classify a table's columns and keep the ones an insert must provide:
/// every NOT NULL column without a default, plus every FK column
/// regardless of nullability. Database-generated columns are left to the
/// database.
pub fn required_columns(columns: &[ColumnInfo], fks: &[FkEdge]) -> Vec<RequiredColumn> {
    columns
        .iter()
        .filter_map(|col| {
            let role = classify(col, fks);
            match role {
                ColumnRole::Optional => None,
                ColumnRole::ForeignKey | ColumnRole::Required => Some(RequiredColumn {
                    name: col.name.clone(),
                    data_type: col.data_type.clone(),
                    max_length: col.max_length,
                    nullable: col.nullable,
                    role,
                }),
            }
        })
        .collect()
}

fn classify(col: &ColumnInfo, fks: &[FkEdge]) -> ColumnRole {
    let is_fk = fks.iter().any(|fk| fk.source_column == col.name);
    if is_fk {
        return ColumnRole::ForeignKey;
    }
    if !col.nullable && !col.default_kind.is_generated() {
        return ColumnRole::Required;
    }
    ColumnRole::Optional
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{DefaultKind, TableRef};

    fn fk(src_col: &str) -> FkEdge {
        FkEdge {
            constraint: None,
            source: TableRef::new("public", "orders"),
            source_column: src_col.to_string(),
            target: TableRef::new("public", "customers"),
            target_column: "id".to_string(),
        }
    }

    #[test]
    fn serial_pk_is_skipped() {
        let mut id = ColumnInfo::new("id", DataType::Integer, "integer");
        id.nullable = false;
        id.default_kind = DefaultKind::AutoIncrement;

        let out = required_columns(&[id], &[]);
        assert!(out.is_empty());
    }

    #[test]
    fn not_null_without_default_is_required() {
        let mut email = ColumnInfo::new("email", DataType::VarChar, "character varying");
        email.nullable = false;

        let out = required_columns(&[email], &[]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].role, ColumnRole::Required);
    }

    #[test]
    fn nullable_fk_is_still_included() {
        let customer_id = ColumnInfo::new("customer_id", DataType::Integer, "integer");
        // nullable by default
        let out = required_columns(&[customer_id], &[fk("customer_id")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].role, ColumnRole::ForeignKey);
        assert!(out[0].nullable);
    }

    #[test]
    fn nullable_with_default_is_optional() {
        let mut note = ColumnInfo::new("note", DataType::Text, "text");
        note.default_kind = DefaultKind::HasDefault;
        let plain = ColumnInfo::new("nickname", DataType::Text, "text");

        let out = required_columns(&[note, plain], &[]);
        assert!(out.is_empty());
    }

    #[test]
    fn not_null_with_auto_timestamp_is_skipped() {
        let mut created = ColumnInfo::new("created_at", DataType::TimestampTz, "timestamptz");
        created.nullable = false;
        created.default_kind = DefaultKind::AutoTimestamp;

        let out = required_columns(&[created], &[]);
        assert!(out.is_empty());
    }
}
