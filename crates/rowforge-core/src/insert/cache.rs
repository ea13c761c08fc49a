//! # Inserted-Id Cache
//!
//! Remembers every primary key generated during the current run, keyed
//! by fully-qualified table name. Later FK resolutions draw from here
//! instead of going back to the database; picks are uniform over the
//! cached sequence so references spread across the created rows instead
//! of always reusing the first.

use std::collections::HashMap;

use rand::Rng;

use crate::catalog::types::TableRef;
use crate::synth::value::Value;

/// Append-only within a run; reset at the start of the next one.
#[derive(Debug, Default)]
pub struct IdCache {
    entries: HashMap<String, Vec<Value>>,
}

impl IdCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything. Called at the start of each run so ids from a
    /// previous target table never leak into a new one.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Record a generated key. Only called after a real successful
    /// insert into `table`.
    pub fn record(&mut self, table: &TableRef, value: Value) {
        self.entries.entry(table.qualified()).or_default().push(value);
    }

    /// Pick one cached id uniformly at random, or `None` when the table
    /// has no successful inserts yet.
    pub fn pick(&self, table: &TableRef, rng: &mut impl Rng) -> Option<Value> {
        self.entries.get(&table.qualified()).and_then(|ids| {
            if ids.is_empty() {
                None
            } else {
                Some(ids[rng.random_range(0..ids.len())].clone())
            }
        })
    }

    /// All ids recorded for a table so far.
    pub fn ids(&self, table: &TableRef) -> &[Value] {
        self.entries
            .get(&table.qualified())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of tables with at least one recorded id.
    pub fn table_count(&self) -> usize {
        self.entries.len()
    }
}
