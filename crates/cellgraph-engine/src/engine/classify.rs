//! Formula classification and complexity scoring.
//!
//! A formula's [`FormulaType`] comes from the first function it calls. The
//! complexity score and the recommended [`Strategy`] are heuristics consumed
//! by code generators that reimplement the workbook.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::formula::ParsedFormula;
use crate::functions::{function_category, is_complex_function, is_vectorizable_function};

/// Upper bound of [`complexity_score`].
pub const MAX_COMPLEXITY: u32 = 100;

/// Scores above this recommend a hand-written implementation.
const CUSTOM_THRESHOLD: u32 = 50;

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaType {
    Arithmetic,
    Logical,
    Lookup,
    Text,
    Statistical,
    Financial,
    DateTime,
    Array,
    Unknown,
}

impl FormulaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaType::Arithmetic => "arithmetic",
            FormulaType::Logical => "logical",
            FormulaType::Lookup => "lookup",
            FormulaType::Text => "text",
            FormulaType::Statistical => "statistical",
            FormulaType::Financial => "financial",
            FormulaType::DateTime => "date_time",
            FormulaType::Array => "array",
            FormulaType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FormulaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a generator should implement a formula.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Element-wise array arithmetic.
    Vectorized,
    /// Dataframe-level operations (aggregates over ranges, joins for lookups).
    PandasMethod,
    /// A per-row loop.
    Iterative,
    /// A dedicated hand-written function.
    Custom,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Vectorized => "vectorized",
            Strategy::PandasMethod => "pandas_method",
            Strategy::Iterative => "iterative",
            Strategy::Custom => "custom",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of a formula given the functions it calls, in call order.
pub fn classify(functions: &[String]) -> FormulaType {
    match functions.first() {
        None => FormulaType::Arithmetic,
        Some(first) => function_category(first).unwrap_or(FormulaType::Unknown),
    }
}

/// Structural complexity in `0..=100`.
///
/// `functions` counts repeats; the reference and operator counts are of
/// distinct items.
pub fn complexity_score(
    functions: &[String],
    cell_refs: usize,
    range_refs: usize,
    operators: usize,
) -> u32 {
    let function_count = functions.len();
    let complex_count = functions.iter().filter(|f| is_complex_function(f)).count();

    let score = 5 * function_count
        + 10 * function_count.saturating_sub(1)
        + 2 * cell_refs
        + 5 * range_refs
        + 10 * complex_count
        + 2 * operators;

    score.min(MAX_COMPLEXITY as usize) as u32
}

/// Whether a formula maps onto array operations. Lookups never do.
pub fn is_vectorizable(parsed: &ParsedFormula) -> bool {
    match parsed.formula_type {
        FormulaType::Lookup => false,
        FormulaType::Arithmetic | FormulaType::Statistical => true,
        _ => parsed.functions.iter().any(|f| is_vectorizable_function(f)),
    }
}

pub fn recommend_strategy(parsed: &ParsedFormula) -> Strategy {
    if is_vectorizable(parsed) {
        if parsed.range_references.is_empty() {
            Strategy::Vectorized
        } else {
            Strategy::PandasMethod
        }
    } else if parsed.formula_type == FormulaType::Lookup {
        Strategy::PandasMethod
    } else if parsed.complexity_score > CUSTOM_THRESHOLD {
        Strategy::Custom
    } else {
        Strategy::Iterative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_uses_first_function() {
        assert_eq!(classify(&names(&["IF", "SUM"])), FormulaType::Logical);
        assert_eq!(classify(&names(&["SUM", "IF"])), FormulaType::Statistical);
        assert_eq!(classify(&names(&["NPV"])), FormulaType::Financial);
        assert_eq!(classify(&names(&["TODAY"])), FormulaType::DateTime);
    }

    #[test]
    fn test_classify_without_functions_is_arithmetic() {
        assert_eq!(classify(&[]), FormulaType::Arithmetic);
    }

    #[test]
    fn test_classify_unrecognized_function_is_unknown() {
        assert_eq!(classify(&names(&["MYUDF", "SUM"])), FormulaType::Unknown);
    }

    #[test]
    fn test_complexity_score_terms() {
        // 5*3 + 10*2 + 2*2 + 5*1 + 10*2 (VLOOKUP, MATCH) + 2*1
        let functions = names(&["VLOOKUP", "MATCH", "IF"]);
        assert_eq!(complexity_score(&functions, 2, 1, 1), 66);
        assert_eq!(complexity_score(&[], 2, 0, 1), 6);
    }

    #[test]
    fn test_complexity_score_is_capped() {
        let functions = names(&["INDIRECT"; 12]);
        assert_eq!(complexity_score(&functions, 40, 10, 5), MAX_COMPLEXITY);
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(Strategy::PandasMethod.to_string(), "pandas_method");
        assert_eq!(FormulaType::DateTime.to_string(), "date_time");
    }
}
