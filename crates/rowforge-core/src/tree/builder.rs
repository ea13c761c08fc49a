use std::future::Future;
use std::pin::Pin;

use tracing::{debug, warn};

use crate::catalog::types::TableRef;
use crate::catalog::Catalog;
use crate::error::Result;
use crate::tree::{DependencyNode, VisitedEdgeSet};

/// Branches deeper than this are truncated rather than failing the
/// whole build.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Walks foreign keys outward from a starting table and produces the
/// rooted dependency forest for one run.
pub struct TreeBuilder<'a, C: Catalog> {
    catalog: &'a C,
    max_depth: usize,
}

impl<'a, C: Catalog> TreeBuilder<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build the dependency forest for `table`. The roots are the
    /// table's direct foreign keys; a table with none yields an empty
    /// list, meaning the target can be inserted directly.
    pub async fn build(&self, table: &TableRef) -> Result<Vec<DependencyNode>> {
        let mut visited = VisitedEdgeSet::new();
        self.expand(table.clone(), 0, &mut visited).await
    }

    // Recursive async needs a boxed future; the depth cap and the
    // visited set both bound the recursion.
    fn expand<'b>(
        &'b self,
        table: TableRef,
        depth: usize,
        visited: &'b mut VisitedEdgeSet,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DependencyNode>>> + Send + 'b>> {
        Box::pin(async move {
            if depth > self.max_depth {
                warn!(
                    table = %table,
                    depth,
                    max_depth = self.max_depth,
                    "dependency branch exceeds depth cap, truncating"
                );
                return Ok(Vec::new());
            }

            // A failed lookup degrades to "no further FKs here" so one
            // unreadable table cannot sink the whole build.
            let edges = match self.catalog.foreign_keys(&table).await {
                Ok(edges) => edges,
                Err(err) => {
                    warn!(table = %table, error = %err, "foreign key lookup failed, treating as leaf");
                    return Ok(Vec::new());
                }
            };

            let mut nodes = Vec::new();
            for edge in edges {
                if !visited.mark(&edge) {
                    debug!(edge = %edge.identity(), "edge already expanded in this build, skipping");
                    continue;
                }
                let target = edge.target.clone();
                let mut node = DependencyNode::new(edge, depth);
                node.children = self.expand(target, depth + 1, visited).await?;
                nodes.push(node);
            }
            Ok(nodes)
        })
    }
}
