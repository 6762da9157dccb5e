use cellgraph_engine::engine::{CellRef, ParsedFormula};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::workbook::CellValue;

/// One cell of the dependency graph, keyed by its full address.
///
/// `dependencies` and `dependents` are kept symmetric by the builder: an edge
/// `dep -> cell` exists iff `dep` is in `cell.dependencies` and `cell` is in
/// `dep.dependents`. Literal cells never gain dependencies.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellNode {
    pub full_address: String,
    pub sheet: String,
    pub cell: CellRef,
    pub formula: Option<String>,
    pub value: Option<CellValue>,
    /// Structural breakdown of `formula`.
    pub parsed: Option<ParsedFormula>,
    /// Cells this one reads.
    pub dependencies: BTreeSet<String>,
    /// Cells that read this one.
    pub dependents: BTreeSet<String>,
    /// Topological level; meaningful once levels have been assigned.
    pub level: usize,
}

impl CellNode {
    pub(crate) fn new(
        full_address: String,
        sheet: &str,
        cell: CellRef,
        formula: Option<String>,
        value: Option<CellValue>,
    ) -> Self {
        CellNode {
            full_address,
            sheet: sheet.to_string(),
            cell,
            formula,
            value,
            parsed: None,
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            level: 0,
        }
    }

    pub fn has_formula(&self) -> bool {
        self.formula.is_some()
    }

    /// A literal leaf: no formula and nothing to depend on.
    pub fn is_input(&self) -> bool {
        !self.has_formula() && self.dependencies.is_empty()
    }

    /// A computed cell nothing else reads.
    pub fn is_output(&self) -> bool {
        self.has_formula() && self.dependents.is_empty()
    }
}
