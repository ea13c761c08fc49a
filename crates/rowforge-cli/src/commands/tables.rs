use anyhow::Result;
use comfy_table::{Cell, Table as ComfyTable};

use rowforge_core::catalog::types::DefaultKind;
use rowforge_core::catalog::Catalog;

use crate::args::TablesArgs;
use crate::commands::{connect, load_config, resolve_db_url};

pub async fn run(args: &TablesArgs) -> Result<()> {
    let config = load_config()?;
    let db_url = resolve_db_url(args.db.as_deref(), config.as_ref())?;
    let db = connect(&db_url).await?;

    let Some(name) = args.name.as_deref() else {
        for schema in db.schemas().await? {
            println!("{}", schema);
        }
        return Ok(());
    };

    let Some(table) = db.find_table(name).await? else {
        println!("Table '{}' not found in any non-system schema.", name);
        return Ok(());
    };
    println!("{}", table);

    let columns = db.columns(&table).await?;
    let mut out = ComfyTable::new();
    out.set_header(vec!["Column", "Type", "Nullable", "Default"]);
    for col in &columns {
        out.add_row(vec![
            Cell::new(&col.name),
            Cell::new(&col.raw_type),
            Cell::new(if col.nullable { "yes" } else { "no" }),
            Cell::new(default_label(col.default_kind)),
        ]);
    }
    println!("{}", out);

    let fks = db.foreign_keys(&table).await?;
    if fks.is_empty() {
        println!("No outgoing foreign keys.");
    } else {
        println!("Foreign keys:");
        for fk in &fks {
            println!(
                "  {} → {}.{}",
                fk.source_column, fk.target, fk.target_column
            );
        }
    }

    Ok(())
}

fn default_label(kind: DefaultKind) -> &'static str {
    match kind {
        DefaultKind::AutoIncrement => "auto increment",
        DefaultKind::AutoUuid => "auto uuid",
        DefaultKind::AutoTimestamp => "auto timestamp",
        DefaultKind::HasDefault => "expression",
        DefaultKind::NoDefault => "none",
    }
}
