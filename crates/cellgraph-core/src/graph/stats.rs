use cellgraph_engine::engine::{FormulaType, Strategy};
use serde::Serialize;
use std::collections::BTreeMap;

use super::DependencyGraph;
use super::cycle::is_acyclic;

/// Aggregate diagnostics for a graph, serializable as a flat record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphStats {
    pub total_cells: usize,
    pub formula_cells: usize,
    pub input_cells: usize,
    pub output_cells: usize,
    pub edge_count: usize,
    pub max_level: usize,
    /// Formula cells per level, for every level up to `max_level`.
    pub cells_per_level: BTreeMap<usize, usize>,
    /// Mean dependency count over all cells.
    pub avg_dependencies: f64,
    pub max_dependencies: usize,
    pub is_dag: bool,
    pub levels_assigned: bool,
    pub formula_types: BTreeMap<FormulaType, usize>,
    pub strategies: BTreeMap<Strategy, usize>,
}

impl DependencyGraph {
    pub fn stats(&self) -> GraphStats {
        let total_cells = self.nodes.len();
        let total_dependencies: usize = self.nodes.values().map(|n| n.dependencies.len()).sum();

        let mut formula_types = BTreeMap::new();
        let mut strategies = BTreeMap::new();
        for parsed in self.nodes.values().filter_map(|n| n.parsed.as_ref()) {
            *formula_types.entry(parsed.formula_type).or_insert(0) += 1;
            *strategies.entry(parsed.strategy()).or_insert(0) += 1;
        }

        GraphStats {
            total_cells,
            formula_cells: self.nodes.values().filter(|n| n.has_formula()).count(),
            input_cells: self.input_cells().len(),
            output_cells: self.output_cells().len(),
            edge_count: self.edge_count,
            max_level: self.max_level(),
            cells_per_level: self
                .calculation_order()
                .iter()
                .enumerate()
                .map(|(level, cells)| (level, cells.len()))
                .collect(),
            avg_dependencies: if total_cells == 0 {
                0.0
            } else {
                total_dependencies as f64 / total_cells as f64
            },
            max_dependencies: self
                .nodes
                .values()
                .map(|n| n.dependencies.len())
                .max()
                .unwrap_or(0),
            is_dag: is_acyclic(&self.nodes),
            levels_assigned: self.levels_assigned,
            formula_types,
            strategies,
        }
    }
}
