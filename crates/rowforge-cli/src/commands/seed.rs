use std::time::Duration;

use anyhow::Result;
use comfy_table::{Cell, Table as ComfyTable};
use indicatif::{ProgressBar, ProgressStyle};

use rowforge_core::catalog::Catalog;
use rowforge_core::insert::{InsertEngine, RunReport};
use rowforge_core::resolve::mapping::ColumnMap;
use rowforge_core::tree::builder::{TreeBuilder, DEFAULT_MAX_DEPTH};
use rowforge_core::tree::forest_size;

use crate::args::{ReportFormat, SeedArgs};
use crate::commands::{connect, load_config, resolve_db_url, table_name_or_prompt};

pub async fn run(args: &SeedArgs) -> Result<()> {
    let config = load_config()?;
    let db_url = resolve_db_url(args.db.as_deref(), config.as_ref())?;
    let db = connect(&db_url).await?;

    let name = table_name_or_prompt(args.table.as_deref())?;

    // Discovery failure is a report, not a crash.
    let Some(target) = db.find_table(&name).await? else {
        println!("Table '{}' not found in any non-system schema.", name);
        println!("0 succeeded, 0 failed");
        return Ok(());
    };

    let max_depth = args
        .max_depth
        .or_else(|| config.as_ref().and_then(|c| c.run.max_depth))
        .unwrap_or(DEFAULT_MAX_DEPTH);

    let pb = spinner("1/2", format!("Resolving dependencies of {}...", target));
    let roots = TreeBuilder::new(&db)
        .with_max_depth(max_depth)
        .build(&target)
        .await?;
    pb.finish_with_message(format!(
        "Resolving dependencies of {}... ✓ {} dependent tables",
        target,
        forest_size(&roots)
    ));

    let mappings = config
        .as_ref()
        .map(|c| c.column_map())
        .unwrap_or_else(ColumnMap::with_defaults);

    let mut engine = InsertEngine::new(&db, &mappings);
    if let Some(ms) = args
        .throttle_ms
        .or_else(|| config.as_ref().and_then(|c| c.run.throttle_ms))
    {
        engine = engine.with_throttle(Duration::from_millis(ms));
    }
    if let Some(seed) = args
        .seed
        .or_else(|| config.as_ref().and_then(|c| c.run.seed))
    {
        engine = engine.with_seed(seed);
    }

    let pb2 = spinner("2/2", "Inserting rows...".to_string());
    let report = engine.seed_table(&target, &roots).await;
    pb2.finish_with_message(format!(
        "Inserting rows... ✓ {} attempted",
        report.outcomes.len()
    ));

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Table => print_report(&report),
    }

    Ok(())
}

fn spinner(prefix: &str, message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{prefix}] {msg}")
            .unwrap(),
    );
    pb.set_prefix(prefix.to_string());
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn print_report(report: &RunReport) {
    let mut table = ComfyTable::new();
    table.set_header(vec!["", "Table", "Generated id", "Detail"]);

    for outcome in &report.outcomes {
        let (mark, detail) = if outcome.success {
            ("✓".to_string(), String::new())
        } else {
            let detail = outcome
                .error
                .as_ref()
                .map(|e| match &e.code {
                    Some(code) => format!("{} [{}]: {}", e.kind, code, e.message),
                    None => format!("{}: {}", e.kind, e.message),
                })
                .unwrap_or_default();
            ("✗".to_string(), detail)
        };

        let id = outcome
            .generated_id
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(mark),
            Cell::new(outcome.table.to_string()),
            Cell::new(id),
            Cell::new(detail),
        ]);
    }

    println!("{}", table);
    println!("{} succeeded, {} failed", report.successes(), report.failures());
}
