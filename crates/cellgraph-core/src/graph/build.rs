//! Graph construction.
//!
//! The build runs in three phases:
//!
//! 1. One [`CellNode`] per record, literal and formula cells alike.
//! 2. Every formula is analyzed on its own (optionally on the rayon pool),
//!    then all edges are committed in a single pass owned by this thread.
//! 3. The edge relation is checked for cycles; a cyclic graph is dropped and
//!    never returned.

use cellgraph_engine::engine::{CellAddress, CellRef, ParsedFormula};
use std::collections::{BTreeMap, BTreeSet};

use super::cycle::find_cycles;
use super::{CellNode, DependencyGraph};
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::workbook::Workbook;

#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    config: GraphConfig,
}

/// A formula cell waiting to be analyzed.
struct FormulaJob<'a> {
    address: &'a str,
    sheet: &'a str,
    formula: &'a str,
}

/// Per-cell result of phase 2, before any node is touched.
struct FormulaAnalysis {
    address: String,
    parsed: ParsedFormula,
    references: BTreeSet<String>,
}

impl FormulaJob<'_> {
    fn analyze(&self) -> FormulaAnalysis {
        let (parsed, references) = ParsedFormula::parse_with_references(self.formula, self.sheet);
        FormulaAnalysis {
            address: self.address.to_string(),
            parsed,
            references,
        }
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GraphConfig) -> Self {
        GraphBuilder { config }
    }

    /// Build a graph from a complete cell listing.
    ///
    /// References to cells absent from the listing are dropped. Fails with
    /// [`GraphError::CircularDependency`] if the references form a cycle.
    pub fn build(&self, workbook: &Workbook) -> Result<DependencyGraph> {
        log::info!(
            "Building dependency graph from {} cells on {} sheets",
            workbook.cell_count(),
            workbook.sheets.len()
        );

        let mut nodes = create_nodes(workbook)?;

        let analyses = {
            let jobs: Vec<FormulaJob<'_>> = nodes
                .values()
                .filter_map(|node| {
                    node.formula.as_deref().map(|formula| FormulaJob {
                        address: &node.full_address,
                        sheet: &node.sheet,
                        formula,
                    })
                })
                .collect();
            log::debug!("Analyzing {} formula cells", jobs.len());
            analyze_all(&jobs, self.config.parallel)
        };

        let edge_count = commit_edges(&mut nodes, analyses);

        let cycles = find_cycles(&nodes, self.config.cycle_sample_limit());
        if !cycles.is_empty() {
            log::warn!("Circular dependencies detected: {:?}", cycles);
            return Err(GraphError::CircularDependency { cycles });
        }

        log::info!(
            "Built dependency graph with {} nodes and {} edges",
            nodes.len(),
            edge_count
        );

        Ok(DependencyGraph {
            nodes,
            named_ranges: workbook.named_ranges.clone(),
            edge_count,
            levels_assigned: false,
        })
    }
}

/// Phase 1: one node per record, keyed by normalized full address.
fn create_nodes(workbook: &Workbook) -> Result<BTreeMap<String, CellNode>> {
    let mut nodes = BTreeMap::new();

    for sheet in &workbook.sheets {
        for record in &sheet.cells {
            let cell = CellRef::from_str(record.address.trim()).ok_or_else(|| {
                GraphError::InvalidAddress {
                    sheet: sheet.name.clone(),
                    address: record.address.clone(),
                }
            })?;
            let full_address = CellAddress::new(sheet.name.as_str(), cell.clone()).full_address();
            let node = CellNode::new(
                full_address.clone(),
                &sheet.name,
                cell,
                record.formula_text().map(str::to_string),
                record.value.clone(),
            );
            if nodes.insert(full_address.clone(), node).is_some() {
                log::warn!("Duplicate cell record {}; keeping the last one", full_address);
            }
        }
    }

    Ok(nodes)
}

#[cfg(feature = "parallel")]
fn analyze_all(jobs: &[FormulaJob<'_>], parallel: bool) -> Vec<FormulaAnalysis> {
    use rayon::prelude::*;

    if parallel {
        jobs.par_iter().map(FormulaJob::analyze).collect()
    } else {
        jobs.iter().map(FormulaJob::analyze).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn analyze_all(jobs: &[FormulaJob<'_>], _parallel: bool) -> Vec<FormulaAnalysis> {
    jobs.iter().map(FormulaJob::analyze).collect()
}

/// Phase 2 commit: apply every analysis to the node map. Returns the edge count.
fn commit_edges(nodes: &mut BTreeMap<String, CellNode>, analyses: Vec<FormulaAnalysis>) -> usize {
    let mut edge_count = 0;
    let mut dropped = 0;

    for analysis in analyses {
        let total = analysis.references.len();
        let resolved: BTreeSet<String> = analysis
            .references
            .into_iter()
            .filter(|address| nodes.contains_key(address))
            .collect();
        dropped += total - resolved.len();

        for dependency in &resolved {
            if let Some(dep_node) = nodes.get_mut(dependency) {
                dep_node.dependents.insert(analysis.address.clone());
            }
        }
        edge_count += resolved.len();

        if let Some(node) = nodes.get_mut(&analysis.address) {
            node.parsed = Some(analysis.parsed);
            node.dependencies = resolved;
        }
    }

    if dropped > 0 {
        log::debug!("Dropped {} references to cells outside the listing", dropped);
    }
    edge_count
}
