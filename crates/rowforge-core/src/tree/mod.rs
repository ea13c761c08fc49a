//! # Dependency Tree
//!
//! A rooted forest of foreign-key edges discovered by expanding a target
//! table's constraints outward. Nodes own their children; one tree build
//! never re-expands the same source-table/target-table pair, which keeps
//! the structure finite even when the schema graph has cycles.

pub mod builder;

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::catalog::types::{FkEdge, TableRef};

/// One foreign-key edge plus the target table's own dependencies.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyNode {
    pub edge: FkEdge,
    /// Distance from the root table (direct FKs sit at depth 0).
    pub depth: usize,
    pub children: Vec<DependencyNode>,
}

impl DependencyNode {
    pub fn new(edge: FkEdge, depth: usize) -> Self {
        Self {
            edge,
            depth,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }
}

/// Count every node in a forest.
pub fn forest_size(roots: &[DependencyNode]) -> usize {
    roots.iter().map(|n| n.node_count()).sum()
}

/// Edge identities seen during one tree build. Scoped to a single
/// `TreeBuilder::build` call.
#[derive(Debug, Default)]
pub struct VisitedEdgeSet {
    seen: HashSet<String>,
}

impl VisitedEdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an edge as visited. Returns false when its identity was
    /// already present, meaning the edge must not be expanded again.
    pub fn mark(&mut self, edge: &FkEdge) -> bool {
        self.seen.insert(edge.identity())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Find the node whose edge leaves `(table, column)`, searching the
/// forest breadth-first. An explicit queue bounds stack usage no matter
/// how deep the tree is.
pub fn find_edge<'t>(
    scope: &'t [DependencyNode],
    table: &TableRef,
    column: &str,
) -> Option<&'t DependencyNode> {
    let mut queue: VecDeque<&DependencyNode> = scope.iter().collect();
    while let Some(node) = queue.pop_front() {
        if node.edge.source == *table && node.edge.source_column == column {
            return Some(node);
        }
        queue.extend(node.children.iter());
    }
    None
}
