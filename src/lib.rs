//! cellgraph - Spreadsheet formula dependency graphs.
//!
//! Turns a workbook's cell listing into a directed dependency graph, verifies
//! it is acyclic, and assigns every cell a topological level so formulas can
//! be evaluated level by level.
//!
//! - [`cellgraph_engine`] - per-formula analysis (references, classification)
//! - [`cellgraph_core`] - graph construction, leveling and queries
//!
//! ```ignore
//! let graph = DependencyGraph::analyze(&workbook, &GraphConfig::default())?;
//! for bucket in graph.calculation_order() {
//!     // every cell in `bucket` can be computed concurrently
//! }
//! ```

pub use cellgraph_core::*;
pub use cellgraph_engine::engine::{
    Constant, RangeRef, classify, complexity_score, extract_named_ranges, extract_references,
    is_vectorizable, recommend_strategy,
};
