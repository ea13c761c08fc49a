use sqlx::Row;

use crate::catalog::types::{ColumnInfo, DataType, DefaultKind, FkEdge, TableRef};
use crate::catalog::{Catalog, ID_COLUMN_CANDIDATES};
use crate::error::{Result, RowForgeError};
use crate::pg::{decode_column, quote_ident, Pg};
use crate::synth::value::Value;

fn catalog_err(query: &str) -> impl FnOnce(sqlx::Error) -> RowForgeError {
    let query = query.to_string();
    move |e| RowForgeError::Catalog { query, source: e }
}

impl Catalog for Pg {
    async fn schemas(&self) -> Result<Vec<String>> {
        let query = r#"
            SELECT schema_name
            FROM information_schema.schemata
            WHERE schema_name NOT IN ('pg_catalog', 'information_schema')
                AND schema_name NOT LIKE 'pg_toast%'
                AND schema_name NOT LIKE 'pg_temp%'
            ORDER BY schema_name
        "#;
        let rows = sqlx::query(query)
            .fetch_all(self.pool())
            .await
            .map_err(catalog_err("list schemas"))?;

        Ok(rows.iter().map(|r| r.get::<String, _>("schema_name")).collect())
    }

    async fn find_table(&self, name: &str) -> Result<Option<TableRef>> {
        let query = r#"
            SELECT table_schema, table_name
            FROM information_schema.tables
            WHERE table_type = 'BASE TABLE'
                AND lower(table_name) = lower($1)
                AND table_schema NOT IN ('pg_catalog', 'information_schema')
            ORDER BY table_schema
        "#;
        let rows = sqlx::query(query)
            .bind(name)
            .fetch_all(self.pool())
            .await
            .map_err(catalog_err("find table"))?;

        let candidates: Vec<TableRef> = rows
            .iter()
            .map(|r| TableRef::new(r.get::<String, _>("table_schema"), r.get::<String, _>("table_name")))
            .collect();

        // Exact-case match wins over the alphabetical-first fallback.
        let exact = candidates.iter().find(|t| t.table == name).cloned();
        Ok(exact.or_else(|| candidates.into_iter().next()))
    }

    async fn columns(&self, table: &TableRef) -> Result<Vec<ColumnInfo>> {
        let query = r#"
            SELECT
                column_name,
                data_type,
                is_nullable,
                column_default,
                is_identity,
                character_maximum_length,
                numeric_precision,
                numeric_scale,
                ordinal_position
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
        "#;
        let rows = sqlx::query(query)
            .bind(&table.schema)
            .bind(&table.table)
            .fetch_all(self.pool())
            .await
            .map_err(catalog_err("fetch columns"))?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.get("column_name");
            let raw_type: String = row.get("data_type");
            let is_nullable: String = row.get("is_nullable");
            let column_default: Option<String> = row.get("column_default");
            let is_identity: String = row.get("is_identity");
            let max_length: Option<i32> = row.get("character_maximum_length");
            let numeric_precision: Option<i32> = row.get("numeric_precision");
            let numeric_scale: Option<i32> = row.get("numeric_scale");
            let ordinal_position: i32 = row.get("ordinal_position");

            let data_type = DataType::from_raw(&raw_type);
            let mut column = ColumnInfo::new(name, data_type, raw_type);
            column.nullable = is_nullable == "YES";
            column.default_kind =
                DefaultKind::from_catalog(column_default.as_deref(), is_identity == "YES");
            column.max_length = max_length.map(|v| v as u32);
            column.numeric_precision = numeric_precision.map(|v| v as u32);
            column.numeric_scale = numeric_scale.map(|v| v as u32);
            column.ordinal_position = ordinal_position as u32;
            columns.push(column);
        }

        Ok(columns)
    }

    async fn foreign_keys(&self, table: &TableRef) -> Result<Vec<FkEdge>> {
        let query = r#"
            SELECT
                tc.constraint_name,
                kcu.column_name,
                ccu.table_schema AS target_schema,
                ccu.table_name AS target_table,
                ccu.column_name AS target_column
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
            JOIN information_schema.constraint_column_usage ccu
                ON tc.constraint_name = ccu.constraint_name
                AND tc.constraint_schema = ccu.constraint_schema
            WHERE tc.table_schema = $1
                AND tc.table_name = $2
                AND tc.constraint_type = 'FOREIGN KEY'
            ORDER BY tc.constraint_name, kcu.ordinal_position
        "#;
        let rows = sqlx::query(query)
            .bind(&table.schema)
            .bind(&table.table)
            .fetch_all(self.pool())
            .await
            .map_err(catalog_err("fetch foreign keys"))?;

        Ok(rows.iter().map(|row| fk_edge_from_row(table, row)).collect())
    }

    async fn foreign_key_for(&self, table: &TableRef, column: &str) -> Result<Option<FkEdge>> {
        let query = r#"
            SELECT
                tc.constraint_name,
                kcu.column_name,
                ccu.table_schema AS target_schema,
                ccu.table_name AS target_table,
                ccu.column_name AS target_column
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
            JOIN information_schema.constraint_column_usage ccu
                ON tc.constraint_name = ccu.constraint_name
                AND tc.constraint_schema = ccu.constraint_schema
            WHERE tc.table_schema = $1
                AND tc.table_name = $2
                AND kcu.column_name = $3
                AND tc.constraint_type = 'FOREIGN KEY'
            LIMIT 1
        "#;
        let row = sqlx::query(query)
            .bind(&table.schema)
            .bind(&table.table)
            .bind(column)
            .fetch_optional(self.pool())
            .await
            .map_err(catalog_err("fetch foreign key for column"))?;

        Ok(row.map(|r| fk_edge_from_row(table, &r)))
    }

    async fn sample_key(&self, table: &TableRef) -> Result<Option<Value>> {
        let qualified = format!("{}.{}", quote_ident(&table.schema), quote_ident(&table.table));

        // Conventional id columns first; a failed query just means the
        // column doesn't exist on this table.
        for candidate in ID_COLUMN_CANDIDATES {
            let sql = format!(
                "SELECT {} FROM {} ORDER BY random() LIMIT 1",
                quote_ident(candidate),
                qualified
            );
            match sqlx::query(&sql).fetch_optional(self.pool()).await {
                Ok(Some(row)) => {
                    let value = decode_column(&row, 0);
                    return Ok(if value.is_null() { None } else { Some(value) });
                }
                Ok(None) => return Ok(None),
                Err(_) => continue,
            }
        }

        // No conventional id column: first column of one random row.
        let sql = format!("SELECT * FROM {} ORDER BY random() LIMIT 1", qualified);
        let row = sqlx::query(&sql)
            .fetch_optional(self.pool())
            .await
            .map_err(catalog_err("sample key"))?;

        Ok(row.and_then(|r| {
            let value = decode_column(&r, 0);
            if value.is_null() {
                None
            } else {
                Some(value)
            }
        }))
    }
}

fn fk_edge_from_row(source: &TableRef, row: &sqlx::postgres::PgRow) -> FkEdge {
    FkEdge {
        constraint: Some(row.get("constraint_name")),
        source: source.clone(),
        source_column: row.get("column_name"),
        target: TableRef::new(
            row.get::<String, _>("target_schema"),
            row.get::<String, _>("target_table"),
        ),
        target_column: row.get("target_column"),
    }
}
