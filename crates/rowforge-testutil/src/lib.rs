//! In-memory `Catalog` + `Inserter` double for exercising the tree
//! builder, the resolver, and the insertion engine without a live
//! database. Failures are scripted per table; catalog lookups are
//! counted so tests can assert cache behavior.

use std::collections::HashMap;
use std::sync::Mutex;

use indexmap::IndexMap;

use rowforge_core::catalog::types::{ColumnInfo, DataType, DefaultKind, FkEdge, TableRef};
use rowforge_core::catalog::{pick_id_column, Catalog};
use rowforge_core::error::{ConstraintKind, Result, RowForgeError};
use rowforge_core::insert::{InsertedRow, Inserter};
use rowforge_core::synth::value::Value;

#[derive(Default)]
struct MemTable {
    columns: Vec<ColumnInfo>,
    foreign_keys: Vec<FkEdge>,
    rows: Vec<IndexMap<String, Value>>,
    insert_failure: Option<String>,
    next_id: i64,
}

#[derive(Default)]
struct State {
    tables: HashMap<String, MemTable>,
    broken_fk_lookups: Vec<String>,
    sample_key_calls: usize,
}

/// An in-memory database. Interior mutability keeps the same `&self`
/// surface as the live backend.
#[derive(Default)]
pub struct MemoryDb {
    state: Mutex<State>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a table with its columns and outgoing foreign keys.
    pub fn define_table(&self, table: &TableRef, columns: Vec<ColumnInfo>, fks: Vec<FkEdge>) {
        let mut state = self.state.lock().unwrap();
        state.tables.insert(
            table.qualified(),
            MemTable {
                columns,
                foreign_keys: fks,
                ..MemTable::default()
            },
        );
    }

    /// Add a pre-existing row, as if it were in the database before the
    /// run started.
    pub fn seed_row(&self, table: &TableRef, row: IndexMap<String, Value>) {
        let mut state = self.state.lock().unwrap();
        state
            .tables
            .entry(table.qualified())
            .or_default()
            .rows
            .push(row);
    }

    /// Make every insert into `table` fail with the given SQLSTATE.
    pub fn fail_inserts(&self, table: &TableRef, sqlstate: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .tables
            .entry(table.qualified())
            .or_default()
            .insert_failure = Some(sqlstate.to_string());
    }

    /// Make `foreign_keys` queries against `table` fail, as a broken
    /// catalog would.
    pub fn break_foreign_key_lookup(&self, table: &TableRef) {
        let mut state = self.state.lock().unwrap();
        state.broken_fk_lookups.push(table.qualified());
    }

    /// How many times `sample_key` hit this database.
    pub fn sample_key_calls(&self) -> usize {
        self.state.lock().unwrap().sample_key_calls
    }

    /// Rows currently stored for a table (seeded plus inserted).
    pub fn rows(&self, table: &TableRef) -> Vec<IndexMap<String, Value>> {
        let state = self.state.lock().unwrap();
        state
            .tables
            .get(&table.qualified())
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: &TableRef) -> usize {
        let state = self.state.lock().unwrap();
        state
            .tables
            .get(&table.qualified())
            .map(|t| t.rows.len())
            .unwrap_or(0)
    }
}

impl Catalog for MemoryDb {
    async fn schemas(&self) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        let mut schemas: Vec<String> = state
            .tables
            .keys()
            .filter_map(|q| q.split('.').next().map(str::to_string))
            .collect();
        schemas.sort();
        schemas.dedup();
        Ok(schemas)
    }

    async fn find_table(&self, name: &str) -> Result<Option<TableRef>> {
        let state = self.state.lock().unwrap();
        let mut candidates: Vec<TableRef> = state
            .tables
            .keys()
            .filter_map(|q| {
                let (schema, table) = q.split_once('.')?;
                if table.eq_ignore_ascii_case(name) {
                    Some(TableRef::new(schema, table))
                } else {
                    None
                }
            })
            .collect();
        candidates.sort_by(|a, b| a.schema.cmp(&b.schema));

        let exact = candidates.iter().find(|t| t.table == name).cloned();
        Ok(exact.or_else(|| candidates.into_iter().next()))
    }

    async fn columns(&self, table: &TableRef) -> Result<Vec<ColumnInfo>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tables
            .get(&table.qualified())
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    async fn foreign_keys(&self, table: &TableRef) -> Result<Vec<FkEdge>> {
        let state = self.state.lock().unwrap();
        if state.broken_fk_lookups.contains(&table.qualified()) {
            return Err(RowForgeError::Other(format!(
                "scripted catalog failure for {}",
                table
            )));
        }
        Ok(state
            .tables
            .get(&table.qualified())
            .map(|t| t.foreign_keys.clone())
            .unwrap_or_default())
    }

    async fn foreign_key_for(&self, table: &TableRef, column: &str) -> Result<Option<FkEdge>> {
        let state = self.state.lock().unwrap();
        Ok(state.tables.get(&table.qualified()).and_then(|t| {
            t.foreign_keys
                .iter()
                .find(|fk| fk.source_column == column)
                .cloned()
        }))
    }

    async fn sample_key(&self, table: &TableRef) -> Result<Option<Value>> {
        let mut state = self.state.lock().unwrap();
        state.sample_key_calls += 1;
        let Some(mem) = state.tables.get(&table.qualified()) else {
            return Ok(None);
        };
        let Some(row) = mem.rows.first() else {
            return Ok(None);
        };
        let key = pick_id_column(row.keys().map(String::as_str))
            .and_then(|col| row.get(col))
            .filter(|v| !v.is_null())
            .cloned();
        Ok(key)
    }
}

impl Inserter for MemoryDb {
    async fn insert_returning(
        &self,
        table: &TableRef,
        columns: &[String],
        values: &[Value],
    ) -> Result<InsertedRow> {
        let sql = render_insert_sql(table, columns);
        let mut state = self.state.lock().unwrap();
        let Some(mem) = state.tables.get_mut(&table.qualified()) else {
            return Err(RowForgeError::Insert {
                table: table.qualified(),
                kind: ConstraintKind::Other,
                code: Some("42P01".to_string()),
                message: format!("relation \"{}\" does not exist", table),
                sql_preview: sql,
            });
        };

        if let Some(sqlstate) = &mem.insert_failure {
            return Err(RowForgeError::Insert {
                table: table.qualified(),
                kind: ConstraintKind::from_sqlstate(Some(sqlstate)),
                code: Some(sqlstate.clone()),
                message: "scripted insert failure".to_string(),
                sql_preview: sql,
            });
        }

        let provided: IndexMap<&str, &Value> = columns
            .iter()
            .map(String::as_str)
            .zip(values.iter())
            .collect();

        // Materialize the full row the way RETURNING * would: provided
        // values as-is, auto-increment columns filled, the rest NULL.
        let mut row: IndexMap<String, Value> = IndexMap::new();
        for col in &mem.columns {
            let value = if let Some(v) = provided.get(col.name.as_str()) {
                (*v).clone()
            } else if col.default_kind == DefaultKind::AutoIncrement {
                mem.next_id += 1;
                Value::Int(mem.next_id)
            } else {
                Value::Null
            };
            row.insert(col.name.clone(), value);
        }

        mem.rows.push(row.clone());
        Ok(InsertedRow { sql, row })
    }
}

fn render_insert_sql(table: &TableRef, columns: &[String]) -> String {
    if columns.is_empty() {
        return format!(
            "INSERT INTO \"{}\".\"{}\" DEFAULT VALUES RETURNING *",
            table.schema, table.table
        );
    }
    let placeholders = (1..=columns.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO \"{}\".\"{}\" ({}) VALUES ({}) RETURNING *",
        table.schema,
        table.table,
        columns
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", "),
        placeholders
    )
}

// ---------------------------------------------------------------------------
// Column and schema shorthands
// ---------------------------------------------------------------------------

/// An auto-increment integer primary key.
pub fn serial_pk(name: &str) -> ColumnInfo {
    let mut col = ColumnInfo::new(name, DataType::Integer, "integer");
    col.nullable = false;
    col.default_kind = DefaultKind::AutoIncrement;
    col
}

/// A NOT NULL column without a default.
pub fn required(name: &str, data_type: DataType) -> ColumnInfo {
    let mut col = ColumnInfo::new(name, data_type.clone(), data_type.to_string());
    col.nullable = false;
    col
}

/// A nullable column without a default.
pub fn nullable(name: &str, data_type: DataType) -> ColumnInfo {
    ColumnInfo::new(name, data_type.clone(), data_type.to_string())
}

pub fn fk(source: &TableRef, source_column: &str, target: &TableRef) -> FkEdge {
    FkEdge {
        constraint: Some(format!("{}_{}_fkey", source.table, source_column)),
        source: source.clone(),
        source_column: source_column.to_string(),
        target: target.clone(),
        target_column: "id".to_string(),
    }
}

/// The stock three-table shop: `orders` referencing `customers` and
/// `products`, all primary keys auto-increment, all tables empty.
pub fn shop_schema(db: &MemoryDb) -> (TableRef, TableRef, TableRef) {
    let orders = TableRef::new("public", "orders");
    let customers = TableRef::new("public", "customers");
    let products = TableRef::new("public", "products");

    db.define_table(
        &customers,
        vec![serial_pk("id"), required("name", DataType::Text)],
        vec![],
    );
    db.define_table(
        &products,
        vec![
            serial_pk("id"),
            required("title", DataType::Text),
            required("price", DataType::Numeric),
        ],
        vec![],
    );
    db.define_table(
        &orders,
        vec![
            serial_pk("id"),
            required("customer_id", DataType::Integer),
            required("product_id", DataType::Integer),
            required("quantity", DataType::Integer),
        ],
        vec![
            fk(&orders, "customer_id", &customers),
            fk(&orders, "product_id", &products),
        ],
    );

    (orders, customers, products)
}
