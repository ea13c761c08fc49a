use serde::Serialize;

use crate::catalog::types::TableRef;
use crate::error::{ConstraintKind, RowForgeError};
use crate::synth::value::Value;

/// The failure half of an outcome: the database's own category, code,
/// and message for the insert that went wrong.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeError {
    pub kind: ConstraintKind,
    pub code: Option<String>,
    pub message: String,
}

/// One attempted insert, success or not. The engine returns an ordered
/// sequence of these for a whole subtree.
#[derive(Debug, Clone, Serialize)]
pub struct InsertOutcome {
    pub table: TableRef,
    pub sql: String,
    pub success: bool,
    pub generated_id: Option<Value>,
    pub error: Option<OutcomeError>,
}

impl InsertOutcome {
    pub fn succeeded(table: TableRef, sql: String, generated_id: Option<Value>) -> Self {
        Self {
            table,
            sql,
            success: true,
            generated_id,
            error: None,
        }
    }

    pub fn failed(table: TableRef, err: &RowForgeError) -> Self {
        let (sql, error) = match err {
            RowForgeError::Insert {
                kind,
                code,
                message,
                sql_preview,
                ..
            } => (
                sql_preview.clone(),
                OutcomeError {
                    kind: *kind,
                    code: code.clone(),
                    message: message.clone(),
                },
            ),
            other => (
                String::new(),
                OutcomeError {
                    kind: ConstraintKind::Other,
                    code: None,
                    message: other.to_string(),
                },
            ),
        };
        Self {
            table,
            sql,
            success: false,
            generated_id: None,
            error: Some(error),
        }
    }
}

/// The full result of one run: every outcome in insertion order plus
/// the tally.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<InsertOutcome>,
}

impl RunReport {
    pub fn push(&mut self, outcome: InsertOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn extend(&mut self, outcomes: Vec<InsertOutcome>) {
        self.outcomes.extend(outcomes);
    }

    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes.len() - self.successes()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_both_sides() {
        let table = TableRef::new("public", "users");
        let mut report = RunReport::default();
        report.push(InsertOutcome::succeeded(
            table.clone(),
            "INSERT ...".to_string(),
            Some(Value::Int(1)),
        ));
        report.push(InsertOutcome::failed(
            table.clone(),
            &RowForgeError::Insert {
                table: table.qualified(),
                kind: ConstraintKind::Unique,
                code: Some("23505".to_string()),
                message: "duplicate key".to_string(),
                sql_preview: "INSERT ...".to_string(),
            },
        ));

        assert_eq!(report.successes(), 1);
        assert_eq!(report.failures(), 1);
    }

    #[test]
    fn failed_outcome_keeps_category_and_code() {
        let table = TableRef::new("public", "orders");
        let outcome = InsertOutcome::failed(
            table,
            &RowForgeError::Insert {
                table: "public.orders".to_string(),
                kind: ConstraintKind::ForeignKey,
                code: Some("23503".to_string()),
                message: "violates foreign key".to_string(),
                sql_preview: "INSERT INTO orders ...".to_string(),
            },
        );

        assert!(!outcome.success);
        let err = outcome.error.expect("failure carries an error");
        assert_eq!(err.kind, ConstraintKind::ForeignKey);
        assert_eq!(err.code.as_deref(), Some("23503"));
        assert_eq!(outcome.sql, "INSERT INTO orders ...");
    }

    #[test]
    fn non_insert_errors_become_other() {
        let table = TableRef::new("public", "orders");
        let outcome = InsertOutcome::failed(
            table.clone(),
            &RowForgeError::NoRequiredColumns {
                table: table.qualified(),
            },
        );
        let err = outcome.error.expect("failure carries an error");
        assert_eq!(err.kind, ConstraintKind::Other);
        assert!(err.message.contains("no insertable columns"));
    }
}
