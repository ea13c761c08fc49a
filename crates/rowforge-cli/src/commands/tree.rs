use anyhow::Result;

use rowforge_core::catalog::Catalog;
use rowforge_core::tree::builder::{TreeBuilder, DEFAULT_MAX_DEPTH};
use rowforge_core::tree::{forest_size, DependencyNode};

use crate::args::TreeArgs;
use crate::commands::{connect, load_config, resolve_db_url, table_name_or_prompt};

pub async fn run(args: &TreeArgs) -> Result<()> {
    let config = load_config()?;
    let db_url = resolve_db_url(args.db.as_deref(), config.as_ref())?;
    let db = connect(&db_url).await?;

    let name = table_name_or_prompt(args.table.as_deref())?;
    let Some(target) = db.find_table(&name).await? else {
        println!("Table '{}' not found in any non-system schema.", name);
        return Ok(());
    };

    let max_depth = args
        .max_depth
        .or_else(|| config.as_ref().and_then(|c| c.run.max_depth))
        .unwrap_or(DEFAULT_MAX_DEPTH);

    let roots = TreeBuilder::new(&db)
        .with_max_depth(max_depth)
        .build(&target)
        .await?;

    println!("{}", target);
    if roots.is_empty() {
        println!("  (no foreign-key dependencies)");
        return Ok(());
    }

    for node in &roots {
        print_node(node, 1);
    }
    println!("{} foreign-key edges", forest_size(&roots));

    Ok(())
}

fn print_node(node: &DependencyNode, indent: usize) {
    println!(
        "{}{} → {} ({})",
        "  ".repeat(indent),
        node.edge.source_column,
        node.edge.target,
        node.edge.target_column,
    );
    for child in &node.children {
        print_node(child, indent + 1);
    }
}
