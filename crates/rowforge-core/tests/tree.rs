//! Tree-builder behavior over the in-memory catalog: cycle suppression,
//! depth capping, and degradation when the catalog misbehaves.

use rowforge_core::catalog::types::{DataType, TableRef};
use rowforge_core::tree::builder::TreeBuilder;
use rowforge_core::tree::{forest_size, DependencyNode};
use rowforge_testutil::{fk, required, serial_pk, MemoryDb};

fn collect_identities(roots: &[DependencyNode], out: &mut Vec<String>) {
    for node in roots {
        out.push(node.edge.identity());
        collect_identities(&node.children, out);
    }
}

#[tokio::test]
async fn two_table_cycle_terminates() {
    let db = MemoryDb::new();
    let a = TableRef::new("public", "a");
    let b = TableRef::new("public", "b");
    db.define_table(
        &a,
        vec![serial_pk("id"), required("b_id", DataType::Integer)],
        vec![fk(&a, "b_id", &b)],
    );
    db.define_table(
        &b,
        vec![serial_pk("id"), required("a_id", DataType::Integer)],
        vec![fk(&b, "a_id", &a)],
    );

    let roots = TreeBuilder::new(&db).build(&a).await.unwrap();

    // a→b, then b→a, then the cycle closes and expansion stops.
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].edge.target, b);
    assert_eq!(roots[0].children.len(), 1);
    assert_eq!(roots[0].children[0].edge.target, a);
    assert!(roots[0].children[0].children.is_empty());

    let mut identities = Vec::new();
    collect_identities(&roots, &mut identities);
    let total = identities.len();
    identities.sort();
    identities.dedup();
    assert_eq!(identities.len(), total, "no edge identity appears twice");
}

#[tokio::test]
async fn self_reference_is_visited_once() {
    let db = MemoryDb::new();
    let categories = TableRef::new("public", "categories");
    db.define_table(
        &categories,
        vec![serial_pk("id"), required("name", DataType::Text)],
        vec![fk(&categories, "parent_id", &categories)],
    );

    let roots = TreeBuilder::new(&db).build(&categories).await.unwrap();

    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].edge.source_column, "parent_id");
    assert!(roots[0].children.is_empty(), "self-edge must not recurse");
}

#[tokio::test]
async fn depth_cap_truncates_branch() {
    let db = MemoryDb::new();
    let tables: Vec<TableRef> = (0..6)
        .map(|i| TableRef::new("public", format!("t{}", i)))
        .collect();
    for i in 0..6 {
        let fks = if i + 1 < 6 {
            vec![fk(&tables[i], "next_id", &tables[i + 1])]
        } else {
            vec![]
        };
        db.define_table(&tables[i], vec![serial_pk("id")], fks);
    }

    let roots = TreeBuilder::new(&db)
        .with_max_depth(2)
        .build(&tables[0])
        .await
        .unwrap();

    // Depths 0, 1, 2 exist; the branch at depth 3 is truncated.
    assert_eq!(forest_size(&roots), 3);
    let mut node = &roots[0];
    let mut max_depth = node.depth;
    while let Some(child) = node.children.first() {
        node = child;
        max_depth = node.depth;
    }
    assert_eq!(max_depth, 2);
}

#[tokio::test]
async fn table_without_fks_yields_empty_forest() {
    let db = MemoryDb::new();
    let users = TableRef::new("public", "users");
    db.define_table(&users, vec![serial_pk("id")], vec![]);

    let roots = TreeBuilder::new(&db).build(&users).await.unwrap();
    assert!(roots.is_empty(), "no dependencies, insert the target directly");
}

#[tokio::test]
async fn broken_catalog_lookup_degrades_to_leaf() {
    let db = MemoryDb::new();
    let orders = TableRef::new("public", "orders");
    let customers = TableRef::new("public", "customers");
    db.define_table(
        &orders,
        vec![serial_pk("id"), required("customer_id", DataType::Integer)],
        vec![fk(&orders, "customer_id", &customers)],
    );
    db.define_table(&customers, vec![serial_pk("id")], vec![]);
    db.break_foreign_key_lookup(&customers);

    let roots = TreeBuilder::new(&db).build(&orders).await.unwrap();

    // The orders→customers edge survives; customers just looks like a
    // leaf because its own lookup failed.
    assert_eq!(roots.len(), 1);
    assert!(roots[0].children.is_empty());
}

#[tokio::test]
async fn broken_lookup_on_start_table_yields_empty_forest() {
    let db = MemoryDb::new();
    let orders = TableRef::new("public", "orders");
    db.define_table(&orders, vec![serial_pk("id")], vec![]);
    db.break_foreign_key_lookup(&orders);

    let roots = TreeBuilder::new(&db).build(&orders).await.unwrap();
    assert!(roots.is_empty());
}

#[tokio::test]
async fn duplicate_edges_to_same_table_are_suppressed() {
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
    db.define_table(&customers, vec![serial_pk("id")], vec![]);

    let roots = TreeBuilder::new(&db).build(&orders).await.unwrap();

    // One expansion per source/target table pair.
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].edge.source_column, "customer_id");
}
