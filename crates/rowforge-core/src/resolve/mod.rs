//! # Foreign-Key Resolver
//!
//! Decides, for a column that must be filled, where its value comes
//! from: an id generated earlier in the run, an existing row in the
//! target table, or nothing (the caller synthesizes). Resolution walks a
//! fixed chain of strategies; each returns no-match to fall through to
//! the next:
//!
//! 1. the pre-matched tree edge, when the caller supplies one;
//! 2. an exact `(schema, table, column)` search over the tree;
//! 3. a configured column rename, retried against the tree;
//! 4. identifier-suffix stripping, retried against the tree;
//! 5. the catalog's own constraint record for the column.
//!
//! A `None` result means the column is not actually backed by a foreign
//! key (or its target is empty) and the value is the synthesizer's
//! problem. This component never mutates the id cache.

pub mod mapping;

use rand::Rng;
use std::collections::VecDeque;

use crate::catalog::types::TableRef;
use crate::catalog::Catalog;
use crate::error::Result;
use crate::insert::cache::IdCache;
use crate::synth::value::Value;
use crate::tree::{find_edge, DependencyNode};
use mapping::ColumnMap;

pub struct FkResolver<'a, C: Catalog> {
    catalog: &'a C,
    mappings: &'a ColumnMap,
}

impl<'a, C: Catalog> FkResolver<'a, C> {
    pub fn new(catalog: &'a C, mappings: &'a ColumnMap) -> Self {
        Self { catalog, mappings }
    }

    /// Resolve one column on one table. `matched` is the tree edge whose
    /// source column equals `column`, when the caller already found it;
    /// `scope` is the subtree visible to heuristic lookups.
    pub async fn resolve(
        &self,
        column: &str,
        table: &TableRef,
        matched: Option<&DependencyNode>,
        scope: &[DependencyNode],
        cache: &IdCache,
        rng: &mut (impl Rng + Send),
    ) -> Result<Option<Value>> {
        if let Some(node) = matched {
            return self.pick_value(&node.edge.target, cache, rng).await;
        }

        if let Some(node) = find_edge(scope, table, column) {
            return self.pick_value(&node.edge.target, cache, rng).await;
        }

        if let Some(node) = self.match_mapped(column, table, scope) {
            return self.pick_value(&node.edge.target, cache, rng).await;
        }

        if let Some(node) = match_stripped(column, table, scope) {
            return self.pick_value(&node.edge.target, cache, rng).await;
        }

        if let Some(edge) = self.catalog.foreign_key_for(table, column).await? {
            return self.pick_value(&edge.target, cache, rng).await;
        }

        Ok(None)
    }

    /// Strategy 3: a configured rename, retried against the tree under
    /// the mapped name.
    fn match_mapped<'t>(
        &self,
        column: &str,
        table: &TableRef,
        scope: &'t [DependencyNode],
    ) -> Option<&'t DependencyNode> {
        let mapped = self.mappings.lookup(column)?;
        find_named(scope, table, mapped)
    }

    /// Cached id first, one live lookup otherwise. An empty target table
    /// resolves to `None` so the caller can synthesize or omit.
    async fn pick_value(
        &self,
        target: &TableRef,
        cache: &IdCache,
        rng: &mut (impl Rng + Send),
    ) -> Result<Option<Value>> {
        if let Some(value) = cache.pick(target, rng) {
            return Ok(Some(value));
        }
        self.catalog.sample_key(target).await
    }
}

/// Strategy 4: strip identifier suffixes and retry the tree under each
/// candidate, first hit wins. Candidates of two characters or fewer are
/// too ambiguous to trust.
fn match_stripped<'t>(
    column: &str,
    table: &TableRef,
    scope: &'t [DependencyNode],
) -> Option<&'t DependencyNode> {
    for candidate in strip_suffixes(column) {
        if let Some(node) = find_named(scope, table, &candidate) {
            return Some(node);
        }
    }
    None
}

/// Heuristic tree search for strategies 3 and 4: the name being retried
/// is not the column's literal spelling, so match it case-insensitively
/// against either the edge's source column or its target table name.
fn find_named<'t>(
    scope: &'t [DependencyNode],
    table: &TableRef,
    name: &str,
) -> Option<&'t DependencyNode> {
    let mut queue: VecDeque<&DependencyNode> = scope.iter().collect();
    while let Some(node) = queue.pop_front() {
        if node.edge.source == *table
            && (node.edge.source_column.eq_ignore_ascii_case(name)
                || node.edge.target.table.eq_ignore_ascii_case(name))
        {
            return Some(node);
        }
        queue.extend(node.children.iter());
    }
    None
}

/// Suffix-stripped candidates for a column name, most specific first:
/// `_id` (any case), then a bare trailing `id`. Candidates must stay
/// longer than two characters.
fn strip_suffixes(column: &str) -> Vec<String> {
    let lower = column.to_lowercase();
    let mut candidates = Vec::new();

    if lower.ends_with("_id") && column.len() > 3 + 2 {
        candidates.push(column[..column.len() - 3].to_string());
    }
    if lower.ends_with("id") && column.len() > 2 + 2 {
        let stripped = column[..column.len() - 2].trim_end_matches('_');
        if stripped.len() > 2 && !candidates.iter().any(|c| c == stripped) {
            candidates.push(stripped.to_string());
        }
    }

    candidates
}
