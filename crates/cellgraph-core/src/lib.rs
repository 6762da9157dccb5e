//! cellgraph-core - Cell dependency graphs with a verified evaluation order.
//!
//! Takes a [`Workbook`] cell listing, links every formula cell to the cells it
//! references, rejects circular references and layers the result into
//! levels that can be evaluated one after another.

pub mod config;
pub mod error;
pub mod graph;
pub mod workbook;

pub use config::{GraphConfig, MAX_CYCLE_SAMPLES};
pub use error::{GraphError, Result};
pub use graph::{CellNode, DependencyGraph, GraphBuilder, GraphStats, assign_levels};
pub use workbook::{CellRecord, CellValue, NamedRange, Sheet, Workbook};

pub use cellgraph_engine::engine::{CellAddress, CellRef, FormulaType, ParsedFormula, Strategy};
