//! Topological level assignment.
//!
//! Levels are computed layer by layer (Kahn's algorithm): layer 0 holds every
//! cell without dependencies, and a cell joins layer `k + 1` once its last
//! dependency has been placed in layer `k`. This gives
//! `level = 1 + max(level of dependencies)`, so for every edge `dep -> cell`,
//! `level(dep) < level(cell)`, and cells sharing a level never reach each other.

use std::collections::HashMap;

use super::DependencyGraph;
use crate::error::{GraphError, Result};

/// Write a topological level into every node of an acyclic graph.
///
/// If no complete order exists (which a graph from [`GraphBuilder`] rules
/// out) every level is reset to 0 and
/// [`GraphError::LevelingInvariantViolation`] is returned.
///
/// [`GraphBuilder`]: super::GraphBuilder
pub fn assign_levels(graph: &mut DependencyGraph) -> Result<()> {
    let levels = compute_levels(graph);

    match levels {
        Ok(levels) => {
            let max_level = levels.iter().copied().max().unwrap_or(0);
            for (node, level) in graph.nodes.values_mut().zip(levels) {
                node.level = level;
            }
            graph.levels_assigned = true;
            log::info!(
                "Assigned levels to {} cells (max level {})",
                graph.nodes.len(),
                max_level
            );
            Ok(())
        }
        Err(unresolved) => {
            for node in graph.nodes.values_mut() {
                node.level = 0;
            }
            graph.levels_assigned = false;
            log::error!(
                "No topological order for a verified graph: {} of {} cells never became ready; \
                 levels left at 0 and must not be trusted",
                unresolved,
                graph.nodes.len()
            );
            Err(GraphError::LevelingInvariantViolation { unresolved })
        }
    }
}

/// Levels in node-key order, or the number of cells left unplaced.
fn compute_levels(graph: &DependencyGraph) -> std::result::Result<Vec<usize>, usize> {
    let index: HashMap<&str, usize> = graph
        .nodes
        .keys()
        .enumerate()
        .map(|(i, address)| (address.as_str(), i))
        .collect();
    let nodes: Vec<_> = graph.nodes.values().collect();

    let mut waiting: Vec<usize> = nodes.iter().map(|n| n.dependencies.len()).collect();
    let mut levels = vec![0usize; nodes.len()];
    let mut placed = 0usize;

    let mut layer: Vec<usize> = (0..nodes.len()).filter(|&i| waiting[i] == 0).collect();
    let mut depth = 0usize;

    while !layer.is_empty() {
        let mut next_layer = Vec::new();
        for &i in &layer {
            levels[i] = depth;
            placed += 1;
            for dependent in &nodes[i].dependents {
                let Some(&j) = index.get(dependent.as_str()) else {
                    continue;
                };
                if waiting[j] > 0 {
                    waiting[j] -= 1;
                    if waiting[j] == 0 {
                        next_layer.push(j);
                    }
                }
            }
        }
        layer = next_layer;
        depth += 1;
    }

    if placed == nodes.len() {
        Ok(levels)
    } else {
        Err(nodes.len() - placed)
    }
}
