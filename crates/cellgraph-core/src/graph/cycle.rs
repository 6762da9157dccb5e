//! Circular dependency detection.
//!
//! A graph with a cycle has no evaluation order (e.g., A1 references B1,
//! B1 references C1, C1 references A1). This module walks the whole graph
//! depth-first and reports cycles as the path segment closed by each back
//! edge, up to a caller-supplied limit.

use std::collections::{BTreeMap, HashMap, btree_set};

use super::CellNode;

#[derive(Copy, Clone)]
enum Mark {
    /// On the current DFS path, at this position.
    OnPath(usize),
    Done,
}

/// Find up to `limit` cycles. Each cycle lists full addresses in edge order,
/// starting from the first node of the cycle reached by the search.
/// An empty result means the graph is acyclic.
pub(crate) fn find_cycles(nodes: &BTreeMap<String, CellNode>, limit: usize) -> Vec<Vec<String>> {
    let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(nodes.len());
    let mut cycles = Vec::new();

    for (root, root_node) in nodes {
        if marks.contains_key(root.as_str()) {
            continue;
        }

        // The walk is iterative: a long chain of formulas must not overflow the stack.
        let mut path: Vec<&str> = vec![root.as_str()];
        let mut stack: Vec<btree_set::Iter<'_, String>> = vec![root_node.dependents.iter()];
        marks.insert(root.as_str(), Mark::OnPath(0));

        while let Some(children) = stack.last_mut() {
            match children.next() {
                Some(next) => match marks.get(next.as_str()).copied() {
                    Some(Mark::OnPath(start)) => {
                        cycles.push(path[start..].iter().map(|s| s.to_string()).collect());
                        if cycles.len() >= limit {
                            return cycles;
                        }
                    }
                    Some(Mark::Done) => {}
                    None => {
                        if let Some(next_node) = nodes.get(next.as_str()) {
                            marks.insert(next.as_str(), Mark::OnPath(path.len()));
                            path.push(next.as_str());
                            stack.push(next_node.dependents.iter());
                        }
                    }
                },
                None => {
                    if let Some(done) = path.pop() {
                        marks.insert(done, Mark::Done);
                    }
                    stack.pop();
                }
            }
        }
    }

    cycles
}

pub(crate) fn is_acyclic(nodes: &BTreeMap<String, CellNode>) -> bool {
    find_cycles(nodes, 1).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgraph_engine::engine::CellAddress;
    use pretty_assertions::assert_eq;

    /// Build nodes from `(cell, referenced cells)` pairs on sheet `S`.
    fn graph(edges: &[(&str, &[&str])]) -> BTreeMap<String, CellNode> {
        let mut nodes = BTreeMap::new();
        for (cell, _) in edges {
            let address = CellAddress::parse(&format!("S!{cell}")).unwrap();
            nodes.insert(
                address.full_address(),
                CellNode::new(address.full_address(), "S", address.cell, Some("=".into()), None),
            );
        }
        for (cell, deps) in edges {
            let key = format!("S!{cell}");
            for dep in *deps {
                let dep_key = format!("S!{dep}");
                nodes.get_mut(&dep_key).unwrap().dependents.insert(key.clone());
                nodes.get_mut(&key).unwrap().dependencies.insert(dep_key);
            }
        }
        nodes
    }

    fn is_rotation(cycle: &[String], expected: &[&str]) -> bool {
        cycle.len() == expected.len()
            && (0..cycle.len()).any(|shift| {
                expected
                    .iter()
                    .enumerate()
                    .all(|(i, e)| cycle[(i + shift) % cycle.len()] == format!("S!{e}"))
            })
    }

    #[test]
    fn test_detect_cycle_no_cycle() {
        let nodes = graph(&[("A1", &[]), ("B1", &["A1"]), ("C1", &["A1", "B1"])]);
        assert!(find_cycles(&nodes, 5).is_empty());
        assert!(is_acyclic(&nodes));
    }

    #[test]
    fn test_detect_cycle_direct() {
        let nodes = graph(&[("A1", &["B1"]), ("B1", &["A1"])]);
        let cycles = find_cycles(&nodes, 5);
        assert_eq!(cycles.len(), 1);
        assert!(is_rotation(&cycles[0], &["A1", "B1"]));
    }

    #[test]
    fn test_detect_cycle_indirect() {
        let nodes = graph(&[("A1", &["C1"]), ("B1", &["A1"]), ("C1", &["B1"])]);
        let cycles = find_cycles(&nodes, 5);
        assert_eq!(cycles.len(), 1);
        assert!(is_rotation(&cycles[0], &["A1", "B1", "C1"]));
    }

    #[test]
    fn test_detect_cycle_self_reference() {
        let nodes = graph(&[("A1", &["A1"])]);
        assert_eq!(find_cycles(&nodes, 5), vec![vec!["S!A1".to_string()]]);
    }

    #[test]
    fn test_cycle_sample_is_bounded() {
        let nodes = graph(&[
            ("A1", &["A1"]),
            ("B1", &["B1"]),
            ("C1", &["C1"]),
            ("D1", &["D1"]),
        ]);
        assert_eq!(find_cycles(&nodes, 2).len(), 2);
        assert_eq!(find_cycles(&nodes, 5).len(), 4);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let mut nodes = BTreeMap::new();
        let count = 50_000;
        for row in 1..=count {
            let address = CellAddress::parse(&format!("S!A{row}")).unwrap();
            let mut node = CellNode::new(
                address.full_address(),
                "S",
                address.cell.clone(),
                Some("=".into()),
                None,
            );
            if row > 1 {
                node.dependencies.insert(format!("S!A{}", row - 1));
            }
            if row < count {
                node.dependents.insert(format!("S!A{}", row + 1));
            }
            nodes.insert(address.full_address(), node);
        }
        assert!(is_acyclic(&nodes));
    }
}
