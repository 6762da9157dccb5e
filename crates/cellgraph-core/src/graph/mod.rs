//! Cell dependency graph.
//!
//! - [`GraphBuilder`] - Build a verified-acyclic graph from a [`Workbook`]
//! - [`assign_levels`] - Layer the graph into evaluation levels
//! - [`DependencyGraph`] - Read-only queries (reachability, calculation order, stats)
//!
//! Edges point from a referenced cell to the cell whose formula references
//! it, so following `dependents` walks in evaluation order.

mod build;
mod cycle;
mod levels;
mod node;
mod query;
mod stats;

pub use build::GraphBuilder;
pub use levels::assign_levels;
pub use node::CellNode;
pub use stats::GraphStats;

use std::collections::BTreeMap;

use crate::config::GraphConfig;
use crate::error::Result;
use crate::workbook::{NamedRange, Workbook};

/// Cells keyed by full address plus the edges between them.
///
/// Only [`GraphBuilder`] creates one, and only when the edge relation is
/// acyclic. After that, the only mutation is [`assign_levels`] writing levels.
#[derive(Clone, Debug)]
pub struct DependencyGraph {
    pub(crate) nodes: BTreeMap<String, CellNode>,
    pub(crate) named_ranges: BTreeMap<String, NamedRange>,
    pub(crate) edge_count: usize,
    pub(crate) levels_assigned: bool,
}

impl DependencyGraph {
    /// Build the graph and assign levels in one go.
    pub fn analyze(workbook: &Workbook, config: &GraphConfig) -> Result<DependencyGraph> {
        let mut graph = GraphBuilder::with_config(config.clone()).build(workbook)?;
        assign_levels(&mut graph)?;
        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, full_address: &str) -> bool {
        self.nodes.contains_key(full_address)
    }

    pub fn node(&self, full_address: &str) -> Option<&CellNode> {
        self.nodes.get(full_address)
    }

    /// All nodes, ordered by full address.
    pub fn nodes(&self) -> impl Iterator<Item = &CellNode> {
        self.nodes.values()
    }

    /// Every edge as `(referenced, referencing)`.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes.values().flat_map(|node| {
            node.dependents
                .iter()
                .map(move |dependent| (node.full_address.as_str(), dependent.as_str()))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether [`assign_levels`] completed on this graph.
    pub fn levels_assigned(&self) -> bool {
        self.levels_assigned
    }

    /// Level of every cell, for renderers.
    pub fn levels(&self) -> BTreeMap<String, usize> {
        self.nodes
            .iter()
            .map(|(address, node)| (address.clone(), node.level))
            .collect()
    }

    pub fn max_level(&self) -> usize {
        self.nodes.values().map(|n| n.level).max().unwrap_or(0)
    }

    /// Named ranges defined by the workbook (metadata only).
    pub fn named_ranges(&self) -> &BTreeMap<String, NamedRange> {
        &self.named_ranges
    }
}
