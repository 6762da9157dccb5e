//! Read-only queries over a built graph.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::{CellNode, DependencyGraph};

impl DependencyGraph {
    /// Cells the given cell reads directly. Empty for unknown addresses.
    pub fn dependencies(&self, full_address: &str) -> BTreeSet<String> {
        self.nodes
            .get(full_address)
            .map(|n| n.dependencies.clone())
            .unwrap_or_default()
    }

    /// Cells that read the given cell directly. Empty for unknown addresses.
    pub fn dependents(&self, full_address: &str) -> BTreeSet<String> {
        self.nodes
            .get(full_address)
            .map(|n| n.dependents.clone())
            .unwrap_or_default()
    }

    /// Every cell the given cell reads, directly or through other formulas.
    pub fn transitive_dependencies(&self, full_address: &str) -> BTreeSet<String> {
        self.reachable(full_address, |node| &node.dependencies)
    }

    /// Every cell that reads the given cell, directly or through other formulas.
    pub fn transitive_dependents(&self, full_address: &str) -> BTreeSet<String> {
        self.reachable(full_address, |node| &node.dependents)
    }

    fn reachable<F>(&self, start: &str, neighbours: F) -> BTreeSet<String>
    where
        F: Fn(&CellNode) -> &BTreeSet<String>,
    {
        let mut seen = BTreeSet::new();
        let Some(start_node) = self.nodes.get(start) else {
            return seen;
        };

        let mut queue: VecDeque<&CellNode> = VecDeque::from([start_node]);
        while let Some(node) = queue.pop_front() {
            for next in neighbours(node) {
                if seen.insert(next.clone()) {
                    if let Some(next_node) = self.nodes.get(next) {
                        queue.push_back(next_node);
                    }
                }
            }
        }
        seen
    }

    /// Literal leaves: no formula and no dependencies.
    pub fn input_cells(&self) -> Vec<String> {
        self.nodes
            .values()
            .filter(|n| n.is_input())
            .map(|n| n.full_address.clone())
            .collect()
    }

    /// Computed cells that nothing else reads.
    pub fn output_cells(&self) -> Vec<String> {
        self.nodes
            .values()
            .filter(|n| n.is_output())
            .map(|n| n.full_address.clone())
            .collect()
    }

    /// Formula cells bucketed by level, from level 0 to the maximum level.
    ///
    /// Levels without formula cells stay as empty buckets, so bucket `i`
    /// always holds level `i`. Cells within a bucket can be evaluated in any
    /// order or concurrently once every earlier bucket is done.
    pub fn calculation_order(&self) -> Vec<Vec<String>> {
        let mut order = vec![Vec::new(); self.max_level() + 1];
        for node in self.nodes.values().filter(|n| n.has_formula()) {
            order[node.level].push(node.full_address.clone());
        }
        order
    }

    /// Workbook names mapped to the formula cells that appear to use them.
    ///
    /// Matching is by name against the heuristic named-range tokens of each
    /// formula, ignoring case. This never creates edges.
    pub fn named_range_usage(&self) -> BTreeMap<String, BTreeSet<String>> {
        let by_upper: BTreeMap<String, &str> = self
            .named_ranges
            .keys()
            .map(|name| (name.to_ascii_uppercase(), name.as_str()))
            .collect();

        let mut usage: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for node in self.nodes.values() {
            let Some(parsed) = &node.parsed else {
                continue;
            };
            for token in &parsed.named_ranges {
                if let Some(name) = by_upper.get(&token.to_ascii_uppercase()) {
                    usage
                        .entry(name.to_string())
                        .or_default()
                        .insert(node.full_address.clone());
                }
            }
        }
        usage
    }
}
