//! Structural parsing of a single formula.
//!
//! [`ParsedFormula::parse`] breaks a formula into the functions it calls, the
//! references it reads, named-range candidates, literal constants and
//! operators, then classifies and scores it. Parsing never fails: text with
//! nothing recognizable simply yields empty sets.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

use super::classify::{self, FormulaType, Strategy};
use super::deps::{
    ReferenceScan, formula_body, identifier_tokens, named_ranges_in_residual, scan_references,
    string_literals,
};
use crate::functions::{function_call_re, normalize_function_name};

/// A literal value appearing in formula text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constant {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedFormula {
    /// Formula text without the leading `=`.
    pub original: String,
    /// Uppercased function names in call order, repeats included.
    pub functions: Vec<String>,
    /// Single-cell references as written (normalized), range boundaries excluded.
    pub cell_references: BTreeSet<String>,
    /// Range references as written (normalized).
    pub range_references: BTreeSet<String>,
    /// Heuristic named-range candidates.
    pub named_ranges: BTreeSet<String>,
    /// Numbers, then strings, then booleans.
    pub constants: Vec<Constant>,
    pub operators: BTreeSet<String>,
    pub formula_type: FormulaType,
    pub complexity_score: u32,
}

impl ParsedFormula {
    pub fn parse(formula: &str) -> ParsedFormula {
        let scan = scan_references(formula, "");
        Self::from_scan(formula, &scan)
    }

    /// Parse a formula and also return the full addresses it refers to,
    /// qualifying unprefixed references with `current_sheet`.
    pub fn parse_with_references(
        formula: &str,
        current_sheet: &str,
    ) -> (ParsedFormula, BTreeSet<String>) {
        let scan = scan_references(formula, current_sheet);
        (Self::from_scan(formula, &scan), scan.full_addresses())
    }

    fn from_scan(formula: &str, scan: &ReferenceScan) -> ParsedFormula {
        let body = formula_body(formula);

        let functions: Vec<String> = function_call_re()
            .captures_iter(&scan.residual)
            .map(|caps| normalize_function_name(&caps[1]))
            .collect();
        let operators: BTreeSet<String> = operator_re()
            .find_iter(&scan.residual)
            .map(|m| m.as_str().to_string())
            .collect();

        let formula_type = classify::classify(&functions);
        let complexity_score = classify::complexity_score(
            &functions,
            scan.cell_tokens.len(),
            scan.range_tokens.len(),
            operators.len(),
        );

        ParsedFormula {
            original: body.to_string(),
            functions,
            cell_references: scan.cell_tokens.clone(),
            range_references: scan.range_tokens.clone(),
            named_ranges: named_ranges_in_residual(&scan.residual),
            constants: extract_constants(body, &scan.residual),
            operators,
            formula_type,
            complexity_score,
        }
    }

    pub fn is_vectorizable(&self) -> bool {
        classify::is_vectorizable(self)
    }

    pub fn strategy(&self) -> Strategy {
        classify::recommend_strategy(self)
    }
}

fn extract_constants(body: &str, residual: &str) -> Vec<Constant> {
    let without_calls = function_call_re().replace_all(residual, |caps: &regex::Captures<'_>| {
        " ".repeat(caps[0].len())
    });

    let mut constants: Vec<Constant> = number_re()
        .find_iter(&without_calls)
        .filter(|m| is_standalone_number(&without_calls, m.start(), m.end()))
        .filter_map(|m| parse_number(m.as_str()))
        .collect();

    constants.extend(string_literals(body).into_iter().map(Constant::Text));

    let mut seen_true = false;
    let mut seen_false = false;
    for word in identifier_tokens(residual) {
        seen_true |= word.eq_ignore_ascii_case("TRUE");
        seen_false |= word.eq_ignore_ascii_case("FALSE");
    }
    if seen_true {
        constants.push(Constant::Boolean(true));
    }
    if seen_false {
        constants.push(Constant::Boolean(false));
    }

    constants
}

fn parse_number(text: &str) -> Option<Constant> {
    if text.contains(['.', 'e', 'E']) {
        text.parse::<f64>().ok().map(Constant::Float)
    } else {
        text.parse::<i64>()
            .ok()
            .map(Constant::Integer)
            .or_else(|| text.parse::<f64>().ok().map(Constant::Float))
    }
}

fn is_standalone_number(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$')));
    let after_ok = text[end..]
        .chars()
        .next()
        .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'));
    before_ok && after_ok
}

fn number_re() -> &'static Regex {
    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    NUMBER_RE.get_or_init(|| {
        Regex::new(r"[0-9]+(?:\.[0-9]*)?(?:[eE][+-]?[0-9]+)?").expect("number regex must compile")
    })
}

fn operator_re() -> &'static Regex {
    static OP_RE: OnceLock<Regex> = OnceLock::new();
    OP_RE.get_or_init(|| Regex::new(r"[+\-*/^&<>=]+").expect("operator regex must compile"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_sum_over_range() {
        let parsed = ParsedFormula::parse("=SUM(A1:A10)");
        assert_eq!(parsed.original, "SUM(A1:A10)");
        assert_eq!(parsed.functions, vec!["SUM".to_string()]);
        assert!(parsed.cell_references.is_empty());
        assert_eq!(parsed.range_references, set(&["A1:A10"]));
        assert!(parsed.named_ranges.is_empty());
        assert!(parsed.operators.is_empty());
        assert_eq!(parsed.formula_type, FormulaType::Statistical);
        assert_eq!(parsed.complexity_score, 10);
        assert!(parsed.is_vectorizable());
        assert_eq!(parsed.strategy(), Strategy::PandasMethod);
    }

    #[test]
    fn test_parse_plain_arithmetic() {
        let parsed = ParsedFormula::parse("=A1*2+B1");
        assert!(parsed.functions.is_empty());
        assert_eq!(parsed.cell_references, set(&["A1", "B1"]));
        assert_eq!(parsed.operators, set(&["*", "+"]));
        assert_eq!(parsed.constants, vec![Constant::Integer(2)]);
        assert_eq!(parsed.formula_type, FormulaType::Arithmetic);
        // 2*2 refs + 2*2 operators
        assert_eq!(parsed.complexity_score, 8);
        assert_eq!(parsed.strategy(), Strategy::Vectorized);
    }

    #[test]
    fn test_parse_percent_is_not_an_operator() {
        let parsed = ParsedFormula::parse("=A1*10%");
        assert_eq!(parsed.operators, set(&["*"]));
        // 2*1 ref + 2*1 operator
        assert_eq!(parsed.complexity_score, 4);
    }

    #[test]
    fn test_parse_constants() {
        let parsed = ParsedFormula::parse(r#"=IF(A1>1.5,"yes",TRUE)+LOG10(100)"#);
        assert_eq!(
            parsed.constants,
            vec![
                Constant::Float(1.5),
                Constant::Integer(100),
                Constant::Text("yes".to_string()),
                Constant::Boolean(true),
            ]
        );
    }

    #[test]
    fn test_parse_keeps_call_order_and_repeats() {
        let parsed = ParsedFormula::parse("=IF(SUM(A1:A3)>0,SUM(B1:B3),0)");
        assert_eq!(parsed.functions, vec!["IF", "SUM", "SUM"]);
        assert_eq!(parsed.formula_type, FormulaType::Logical);
    }

    #[test]
    fn test_parse_lookup_is_never_vectorized() {
        let parsed = ParsedFormula::parse("=VLOOKUP(A1,Data!A1:C20,3,FALSE)");
        assert_eq!(parsed.formula_type, FormulaType::Lookup);
        assert_eq!(parsed.range_references, set(&["Data!A1:C20"]));
        assert!(!parsed.is_vectorizable());
        assert_eq!(parsed.strategy(), Strategy::PandasMethod);
        assert!(parsed.constants.contains(&Constant::Boolean(false)));
    }

    #[test]
    fn test_parse_vectorizable_function_inside_other_type() {
        let parsed = ParsedFormula::parse("=IF(A1>0,MAX(B1,C1),0)");
        assert_eq!(parsed.formula_type, FormulaType::Logical);
        assert!(parsed.is_vectorizable());
        assert_eq!(parsed.strategy(), Strategy::Vectorized);
    }

    #[test]
    fn test_parse_unknown_complex_formula_is_custom() {
        let parsed =
            ParsedFormula::parse("=MYFN(INDEX(A1:A9,MATCH(B1,C1:C9,0)),OFFSET(D1,1,1),E1&F1)");
        assert_eq!(parsed.formula_type, FormulaType::Unknown);
        assert!(parsed.complexity_score > 50);
        assert_eq!(parsed.strategy(), Strategy::Custom);
    }

    #[test]
    fn test_parse_small_text_formula_is_iterative() {
        let parsed = ParsedFormula::parse(r#"=LEFT(A1,3)&"-""#);
        assert_eq!(parsed.formula_type, FormulaType::Text);
        assert_eq!(parsed.strategy(), Strategy::Iterative);
    }

    #[test]
    fn test_parse_strips_storage_prefix() {
        let parsed = ParsedFormula::parse("=_xlfn.XLOOKUP(A1,B1:B5,C1:C5)");
        assert_eq!(parsed.functions, vec!["XLOOKUP"]);
        assert_eq!(parsed.formula_type, FormulaType::Lookup);
    }

    #[test]
    fn test_parse_with_references_qualifies_sheet() {
        let (parsed, refs) = ParsedFormula::parse_with_references("=SUM(A1:A3)+Rates!B2", "Model");
        assert_eq!(parsed.cell_references, set(&["Rates!B2"]));
        assert_eq!(refs, set(&["Model!A1", "Model!A3", "Rates!B2"]));
    }
}
