//! Formula analysis API.
//!
//! This module provides the per-cell, side-effect free half of the pipeline:
//!
//! - [`CellRef`], [`CellAddress`] - Cell reference parsing (A1 notation ↔ indices, full addresses)
//! - [`extract_references`] - Find the cells a formula refers to
//! - [`extract_named_ranges`] - Heuristic named-range detection
//! - [`ParsedFormula`] - Structural breakdown of one formula
//! - [`classify`], [`complexity_score`], [`recommend_strategy`] - Formula classification
//!
//! Every function here is pure and safe to call from many threads at once.

mod cell_ref;
mod classify;
mod deps;
mod formula;

pub use cell_ref::{CellAddress, CellRef, unquote_sheet};
pub use classify::{
    FormulaType, MAX_COMPLEXITY, Strategy, classify, complexity_score, is_vectorizable,
    recommend_strategy,
};
pub use deps::{RangeRef, ReferenceScan, extract_named_ranges, extract_references, scan_references};
pub use formula::{Constant, ParsedFormula};
