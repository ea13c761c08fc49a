//! End-to-end engine behavior over the in-memory database: insertion
//! order, key wiring, partial-failure tolerance, and cache reuse.

use std::time::Duration;

use rowforge_core::catalog::types::{DataType, TableRef};
use rowforge_core::catalog::Catalog;
use rowforge_core::error::ConstraintKind;
use rowforge_core::insert::InsertEngine;
use rowforge_core::resolve::mapping::ColumnMap;
use rowforge_core::synth::value::Value;
use rowforge_core::tree::builder::TreeBuilder;
use rowforge_testutil::{fk, nullable, required, serial_pk, shop_schema, MemoryDb};

fn engine<'a>(
    db: &'a MemoryDb,
    mappings: &'a ColumnMap,
) -> InsertEngine<'a, MemoryDb> {
    InsertEngine::new(db, mappings)
        .with_seed(42)
        .with_throttle(Duration::ZERO)
}

#[tokio::test]
async fn orders_customers_products_all_succeed() {
    let db = MemoryDb::new();
    let (orders, customers, products) = shop_schema(&db);

    let roots = TreeBuilder::new(&db).build(&orders).await.unwrap();
    let mappings = ColumnMap::with_defaults();
    let report = engine(&db, &mappings).seed_table(&orders, &roots).await;

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.successes(), 3);
    assert_eq!(report.failures(), 0);

    // One row in each dependency, one in the target.
    assert_eq!(db.row_count(&customers), 1);
    assert_eq!(db.row_count(&products), 1);
    assert_eq!(db.row_count(&orders), 1);

    // The order's FK columns hold the generated dependency keys.
    let customer_id = db.rows(&customers)[0].get("id").cloned().unwrap();
    let product_id = db.rows(&products)[0].get("id").cloned().unwrap();
    let order = &db.rows(&orders)[0];
    assert_eq!(order.get("customer_id"), Some(&customer_id));
    assert_eq!(order.get("product_id"), Some(&product_id));

    // The target's own outcome carries its generated key.
    let last = report.outcomes.last().unwrap();
    assert_eq!(last.table, orders);
    assert!(last.generated_id.is_some());
}

#[tokio::test]
async fn outcomes_are_strictly_post_order() {
    let db = MemoryDb::new();
    let a = TableRef::new("public", "a");
    let b = TableRef::new("public", "b");
    let c = TableRef::new("public", "c");
    db.define_table(
        &a,
        vec![serial_pk("id"), required("b_id", DataType::Integer)],
        vec![fk(&a, "b_id", &b)],
    );
    db.define_table(
        &b,
        vec![serial_pk("id"), required("c_id", DataType::Integer)],
        vec![fk(&b, "c_id", &c)],
    );
    db.define_table(&c, vec![serial_pk("id"), required("name", DataType::Text)], vec![]);

    let roots = TreeBuilder::new(&db).build(&a).await.unwrap();
    let mappings = ColumnMap::new();
    let report = engine(&db, &mappings).seed_table(&a, &roots).await;

    let order: Vec<&str> = report
        .outcomes
        .iter()
        .map(|o| o.table.table.as_str())
        .collect();
    assert_eq!(order, vec!["c", "b", "a"], "descendants precede ancestors");

    // And the generated keys chain through.
    let c_id = db.rows(&c)[0].get("id").cloned().unwrap();
    let b_row = &db.rows(&b)[0];
    assert_eq!(b_row.get("c_id"), Some(&c_id));
}

#[tokio::test]
async fn failed_child_does_not_abort_parent() {
    let db = MemoryDb::new();
    let (orders, customers, products) = shop_schema(&db);
    db.fail_inserts(&customers, "23505");

    let roots = TreeBuilder::new(&db).build(&orders).await.unwrap();
    let mappings = ColumnMap::new();
    let report = engine(&db, &mappings).seed_table(&orders, &roots).await;

    // All three tables were attempted; only customers failed.
    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.failures(), 1);
    assert_eq!(report.successes(), 2);

    let failed = report
        .outcomes
        .iter()
        .find(|o| o.table == customers)
        .expect("customers outcome present");
    assert!(!failed.success);
    let err = failed.error.as_ref().expect("failure carries error detail");
    assert_eq!(err.kind, ConstraintKind::Unique);
    assert_eq!(err.code.as_deref(), Some("23505"));

    // The parent was still attempted, with its true flag.
    let parent = report.outcomes.last().unwrap();
    assert_eq!(parent.table, orders);
    assert!(parent.success);
}

#[tokio::test]
async fn self_referential_fk_inserts_null_parent_first() {
    let db = MemoryDb::new();
    let categories = TableRef::new("public", "categories");
    db.define_table(
        &categories,
        vec![
            serial_pk("id"),
            required("name", DataType::Text),
            nullable("parent_id", DataType::Integer),
        ],
        vec![fk(&categories, "parent_id", &categories)],
    );

    let roots = TreeBuilder::new(&db).build(&categories).await.unwrap();
    assert_eq!(roots.len(), 1, "self-edge visited exactly once");

    let mappings = ColumnMap::new();
    let report = engine(&db, &mappings).seed_table(&categories, &roots).await;

    assert_eq!(report.successes(), report.outcomes.len());

    // The first row had nothing to reference: parent_id stays NULL
    // instead of looping. The target row then references it.
    let rows = db.rows(&categories);
    assert_eq!(rows[0].get("parent_id"), Some(&Value::Null));
    let first_id = rows[0].get("id").cloned().unwrap();
    assert_eq!(rows.last().unwrap().get("parent_id"), Some(&first_id));
}

#[tokio::test]
async fn second_fk_to_same_table_reuses_cache() {
    let db = MemoryDb::new();
    let orders = TableRef::new("public", "orders");
    let customers = TableRef::new("public", "customers");
    db.define_table(
        &orders,
        vec![
            serial_pk("id"),
            required("customer_id", DataType::Integer),
            required("billing_customer_id", DataType::Integer),
        ],
        vec![
            fk(&orders, "customer_id", &customers),
            fk(&orders, "billing_customer_id", &customers),
        ],
    );
    db.define_table(
        &customers,
        vec![serial_pk("id"), required("name", DataType::Text)],
        vec![],
    );

    let roots = TreeBuilder::new(&db).build(&orders).await.unwrap();
    let mappings = ColumnMap::new();
    let report = engine(&db, &mappings).seed_table(&orders, &roots).await;

    assert_eq!(report.successes(), 2, "one customers row, one orders row");
    assert_eq!(db.row_count(&customers), 1);

    // Both FK columns point at the single generated customer, and the
    // second resolution never issued a fresh lookup.
    let customer_id = db.rows(&customers)[0].get("id").cloned().unwrap();
    let order = &db.rows(&orders)[0];
    assert_eq!(order.get("customer_id"), Some(&customer_id));
    assert_eq!(order.get("billing_customer_id"), Some(&customer_id));
    assert_eq!(db.sample_key_calls(), 0);
}

#[tokio::test]
async fn unknown_target_table_is_reported_not_crashed() {
    let db = MemoryDb::new();
    assert!(db.find_table("missing").await.unwrap().is_none());

    // Driving the engine at an undefined table still produces a
    // captured failure rather than a panic.
    let ghost = TableRef::new("public", "ghost");
    let mappings = ColumnMap::new();
    let report = engine(&db, &mappings).seed_table(&ghost, &[]).await;

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.successes(), 0);
    assert!(!report.outcomes[0].success);
}

#[tokio::test]
async fn cache_resets_between_runs() {
    let db = MemoryDb::new();
    let (orders, customers, _) = shop_schema(&db);

    let roots = TreeBuilder::new(&db).build(&orders).await.unwrap();
    let mappings = ColumnMap::new();
    let mut eng = engine(&db, &mappings);

    let first = eng.seed_table(&orders, &roots).await;
    assert_eq!(first.failures(), 0);
    assert_eq!(eng.cache().ids(&customers).len(), 1);

    let second = eng.seed_table(&orders, &roots).await;
    assert_eq!(second.failures(), 0);
    // The second run starts from a clean cache: one id from this run,
    // not two accumulated across runs.
    assert_eq!(eng.cache().ids(&customers).len(), 1);
    assert_eq!(db.row_count(&customers), 2);
}
