use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::catalog::types::TableRef;
use crate::catalog::{pick_id_column, Catalog};
use crate::error::{Result, RowForgeError};
use crate::insert::cache::IdCache;
use crate::insert::columns::{required_columns, ColumnRole};
use crate::insert::outcome::{InsertOutcome, RunReport};
use crate::insert::Inserter;
use crate::resolve::mapping::ColumnMap;
use crate::resolve::FkResolver;
use crate::synth::generator::synthesize;
use crate::synth::value::Value;
use crate::tree::DependencyNode;

/// Pause after each successful insert, bounding the request rate a
/// single run puts on the database.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(150);

/// Post-order insertion over a dependency forest. All run state lives
/// here; the id cache is reset when a run starts and shared by every
/// recursive call within it.
pub struct InsertEngine<'a, D: Catalog + Inserter> {
    db: &'a D,
    mappings: &'a ColumnMap,
    cache: IdCache,
    rng: StdRng,
    throttle: Duration,
}

impl<'a, D: Catalog + Inserter> InsertEngine<'a, D> {
    pub fn new(db: &'a D, mappings: &'a ColumnMap) -> Self {
        Self {
            db,
            mappings,
            cache: IdCache::new(),
            rng: StdRng::from_os_rng(),
            throttle: DEFAULT_THROTTLE,
        }
    }

    /// Fixed seed for reproducible picks.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn cache(&self) -> &IdCache {
        &self.cache
    }

    /// One full run: reset the cache, insert every dependency subtree
    /// post-order, then the target table itself, wiring the generated
    /// keys into its FK columns.
    pub async fn seed_table(
        &mut self,
        target: &TableRef,
        roots: &[DependencyNode],
    ) -> RunReport {
        self.cache.reset();
        let mut report = RunReport::default();
        for node in roots {
            report.extend(self.insert_subtree(node).await);
        }
        report.push(self.insert_row(target, roots).await);
        report
    }

    /// Insert a node's dependencies, then the node's own target table.
    /// Every descendant outcome precedes the node's own in the returned
    /// sequence.
    pub async fn insert_subtree(&mut self, node: &DependencyNode) -> Vec<InsertOutcome> {
        self.subtree(node).await
    }

    fn subtree<'b>(
        &'b mut self,
        node: &'b DependencyNode,
    ) -> Pin<Box<dyn Future<Output = Vec<InsertOutcome>> + Send + 'b>> {
        Box::pin(async move {
            let mut outcomes = Vec::new();
            for child in &node.children {
                outcomes.extend(self.subtree(child).await);
            }
            outcomes.push(self.insert_row(&node.edge.target, &node.children).await);
            outcomes
        })
    }

    /// Insert one row into `table`. `scope` holds the tree nodes whose
    /// edges leave this table, used to wire FK columns to rows created
    /// earlier in the run. Failures are captured, never propagated.
    pub async fn insert_row(
        &mut self,
        table: &TableRef,
        scope: &[DependencyNode],
    ) -> InsertOutcome {
        match self.try_insert_row(table, scope).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(table = %table, error = %err, "insert failed, continuing with the rest of the tree");
                InsertOutcome::failed(table.clone(), &err)
            }
        }
    }

    async fn try_insert_row(
        &mut self,
        table: &TableRef,
        scope: &[DependencyNode],
    ) -> Result<InsertOutcome> {
        let columns = self.db.columns(table).await?;
        let fks = self.db.foreign_keys(table).await?;
        let required = required_columns(&columns, &fks);
        if required.is_empty() {
            return Err(RowForgeError::NoRequiredColumns {
                table: table.qualified(),
            });
        }

        let resolver = FkResolver::new(self.db, self.mappings);
        let mut names: Vec<String> = Vec::with_capacity(required.len());
        let mut values: Vec<Value> = Vec::with_capacity(required.len());

        for col in &required {
            let value = if col.role == ColumnRole::ForeignKey {
                let matched = scope.iter().find(|node| {
                    node.edge.source == *table && node.edge.source_column == col.name
                });
                match resolver
                    .resolve(&col.name, table, matched, scope, &self.cache, &mut self.rng)
                    .await?
                {
                    Some(value) => value,
                    None if col.nullable => {
                        // Unresolvable and nullable: leave the column
                        // out so the database stores NULL.
                        debug!(table = %table, column = %col.name, "FK unresolved, leaving NULL");
                        continue;
                    }
                    None => synthesize(&col.data_type, col.max_length, &mut self.rng),
                }
            } else {
                synthesize(&col.data_type, col.max_length, &mut self.rng)
            };
            names.push(col.name.clone());
            values.push(value);
        }

        let inserted = self.db.insert_returning(table, &names, &values).await?;

        let generated_id = pick_id_column(inserted.row.keys().map(String::as_str))
            .and_then(|id_col| inserted.row.get(id_col))
            .filter(|v| !v.is_null())
            .cloned();
        if let Some(ref id) = generated_id {
            self.cache.record(table, id.clone());
        }

        if !self.throttle.is_zero() {
            tokio::time::sleep(self.throttle).await;
        }

        Ok(InsertOutcome::succeeded(
            table.clone(),
            inserted.sql,
            generated_id,
        ))
    }
}
