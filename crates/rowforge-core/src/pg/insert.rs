use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

use crate::catalog::types::TableRef;
use crate::error::{ConstraintKind, Result, RowForgeError};
use crate::insert::{InsertedRow, Inserter};
use crate::pg::{decode_row, quote_ident, truncate_sql, Pg};
use crate::synth::value::Value;

impl Inserter for Pg {
    async fn insert_returning(
        &self,
        table: &TableRef,
        columns: &[String],
        values: &[Value],
    ) -> Result<InsertedRow> {
        let sql = build_insert_sql(table, columns);

        let mut query = sqlx::query(&sql);
        for value in values {
            query = bind_value(query, value);
        }

        let row = query
            .fetch_one(self.pool())
            .await
            .map_err(|e| insert_error(table, &sql, e))?;

        Ok(InsertedRow {
            row: decode_row(&row),
            sql,
        })
    }
}

/// One parameterized insert for the full column/value set, asking for
/// the whole generated row back. An empty column set falls back to the
/// table's defaults.
fn build_insert_sql(table: &TableRef, columns: &[String]) -> String {
    let qualified = format!("{}.{}", quote_ident(&table.schema), quote_ident(&table.table));
    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES RETURNING *", qualified);
    }

    let col_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        qualified, col_list, placeholders
    )
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(b) => query.bind(*b),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::String(s) => query.bind(s.to_string()),
        Value::Timestamp(ts) => query.bind(*ts),
        Value::Date(d) => query.bind(*d),
        Value::Time(t) => query.bind(*t),
        Value::Uuid(u) => query.bind(*u),
        Value::Json(j) => query.bind(j.clone()),
        Value::Bytes(b) => query.bind(b.clone()),
    }
}

/// Fold a database failure into the run's error taxonomy, categorized
/// by the SQLSTATE the database reported.
fn insert_error(table: &TableRef, sql: &str, e: sqlx::Error) -> RowForgeError {
    let (code, message) = match &e {
        sqlx::Error::Database(db) => (db.code().map(|c| c.to_string()), db.message().to_string()),
        other => (None, other.to_string()),
    };
    RowForgeError::Insert {
        table: table.qualified(),
        kind: ConstraintKind::from_sqlstate(code.as_deref()),
        code,
        message,
        sql_preview: truncate_sql(sql, 200),
    }
}
