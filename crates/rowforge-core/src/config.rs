//! # Configuration File Parser
//!
//! Reads and parses `rowforge.toml`, the optional configuration file
//! that customizes a run without CLI flags:
//!
//! - `[database]`: default connection URL
//! - `[run]`: depth cap, throttle, fixed seed
//! - `[mappings]`: FK column renames for the resolver
//!
//! Example `rowforge.toml`:
//!
//! ```toml
//! [database]
//! url = "postgres://localhost/myapp"
//!
//! [run]
//! max_depth = 6
//! throttle_ms = 100
//!
//! [mappings]
//! legacy_owner = "user_id"
//! acct = "account_id"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, RowForgeError};
use crate::resolve::mapping::ColumnMap;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "rowforge.toml";

/// Top-level rowforge.toml structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RowForgeConfig {
    pub database: DatabaseConfig,
    pub run: RunConfig,
    /// FK-column renames, keyed by the column's name as it appears in
    /// the schema.
    pub mappings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "postgres://localhost/myapp").
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Dependency-tree depth cap.
    pub max_depth: Option<usize>,
    /// Pause after each successful insert, in milliseconds.
    pub throttle_ms: Option<u64>,
    /// Fixed random seed for reproducible reference picks.
    pub seed: Option<u64>,
}

impl RowForgeConfig {
    /// The resolver's column map: built-in exceptions plus whatever the
    /// config adds (config entries win on conflict).
    pub fn column_map(&self) -> ColumnMap {
        let mut map = ColumnMap::with_defaults();
        map.extend(self.mappings.iter().map(|(k, v)| (k.as_str(), v.clone())));
        map
    }
}

/// Read `rowforge.toml` from a directory, if present.
pub fn read_config(dir: &Path) -> Result<Option<RowForgeConfig>> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }

    let text = std::fs::read_to_string(&path).map_err(|e| RowForgeError::Config {
        message: format!("failed to read {}: {}", path.display(), e),
    })?;
    let config = toml::from_str(&text).map_err(|e| RowForgeError::Config {
        message: format!("failed to parse {}: {}", path.display(), e),
    })?;
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn parse_full_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
                [database]
                url = "postgres://localhost/myapp"

                [run]
                max_depth = 4
                throttle_ms = 50

                [mappings]
                legacy_owner = "user_id"
            "#,
        )
        .unwrap();

        let config = read_config(dir.path()).unwrap().expect("config present");
        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/myapp"));
        assert_eq!(config.run.max_depth, Some(4));
        assert_eq!(config.run.throttle_ms, Some(50));

        let map = config.column_map();
        assert_eq!(map.lookup("legacy_owner"), Some("user_id"));
        // Built-in defaults survive the merge.
        assert_eq!(map.lookup("created_by"), Some("user_id"));
    }

    #[test]
    fn empty_sections_are_fine() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();

        let config = read_config(dir.path()).unwrap().expect("config present");
        assert!(config.database.url.is_none());
        assert!(config.run.max_depth.is_none());
        assert!(config.mappings.is_empty());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[run\nmax_depth = 4").unwrap();

        let err = read_config(dir.path()).unwrap_err();
        assert!(matches!(err, RowForgeError::Config { .. }));
    }
}
