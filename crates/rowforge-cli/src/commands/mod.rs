pub mod seed;
pub mod tables;
pub mod tree;

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};

use rowforge_core::config::{read_config, RowForgeConfig};
use rowforge_core::pg::Pg;

/// Load the optional rowforge.toml from the working directory.
pub(crate) fn load_config() -> Result<Option<RowForgeConfig>> {
    Ok(read_config(Path::new("."))?)
}

/// Resolution order: --db flag (or DATABASE_URL via clap), then the
/// config file.
pub(crate) fn resolve_db_url(
    flag: Option<&str>,
    config: Option<&RowForgeConfig>,
) -> Result<String> {
    if let Some(url) = flag {
        return Ok(url.to_string());
    }
    if let Some(url) = config.and_then(|c| c.database.url.clone()) {
        return Ok(url);
    }
    Err(rowforge_core::RowForgeError::NoDatabaseUrl.into())
}

pub(crate) async fn connect(db_url: &str) -> Result<Pg> {
    Pg::connect(db_url)
        .await
        .context("Failed to connect to PostgreSQL")
}

/// The interactive start-table input: a single non-empty string.
pub(crate) fn table_name_or_prompt(arg: Option<&str>) -> Result<String> {
    if let Some(name) = arg {
        return Ok(name.to_string());
    }

    let stdin = std::io::stdin();
    loop {
        print!("Target table: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            bail!("No table name provided");
        }
        let name = line.trim();
        if !name.is_empty() {
            return Ok(name.to_string());
        }
    }
}
