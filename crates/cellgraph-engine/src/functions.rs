//! Well-known spreadsheet functions and their metadata.
//!
//! Conventions:
//! - Names are stored ALL CAPS; lookups expect names already normalized by
//!   [`normalize_function_name`].
//! - The category of a function decides the [`FormulaType`] of a formula whose
//!   first call it is. If you add a function here, also decide whether it
//!   belongs in `COMPLEX_FUNCTIONS` or `VECTORIZABLE_FUNCTIONS`.

use crate::engine::FormulaType;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

pub struct KnownFunction {
    pub name: &'static str,
    pub category: FormulaType,
}

const fn known(name: &'static str, category: FormulaType) -> KnownFunction {
    KnownFunction { name, category }
}

pub const KNOWN_FUNCTIONS: &[KnownFunction] = &[
    known("SUM", FormulaType::Statistical),
    known("AVERAGE", FormulaType::Statistical),
    known("COUNT", FormulaType::Statistical),
    known("MAX", FormulaType::Statistical),
    known("MIN", FormulaType::Statistical),
    known("STDEV", FormulaType::Statistical),
    known("VAR", FormulaType::Statistical),
    known("SUMIF", FormulaType::Statistical),
    known("SUMIFS", FormulaType::Statistical),
    known("COUNTIF", FormulaType::Statistical),
    known("COUNTIFS", FormulaType::Statistical),
    known("AVERAGEIF", FormulaType::Statistical),
    known("AVERAGEIFS", FormulaType::Statistical),
    known("VLOOKUP", FormulaType::Lookup),
    known("HLOOKUP", FormulaType::Lookup),
    known("INDEX", FormulaType::Lookup),
    known("MATCH", FormulaType::Lookup),
    known("XLOOKUP", FormulaType::Lookup),
    known("OFFSET", FormulaType::Lookup),
    known("INDIRECT", FormulaType::Lookup),
    known("IF", FormulaType::Logical),
    known("IFS", FormulaType::Logical),
    known("IFERROR", FormulaType::Logical),
    known("AND", FormulaType::Logical),
    known("OR", FormulaType::Logical),
    known("NOT", FormulaType::Logical),
    known("CONCATENATE", FormulaType::Text),
    known("CONCAT", FormulaType::Text),
    known("LEFT", FormulaType::Text),
    known("RIGHT", FormulaType::Text),
    known("MID", FormulaType::Text),
    known("LEN", FormulaType::Text),
    known("TRIM", FormulaType::Text),
    known("UPPER", FormulaType::Text),
    known("LOWER", FormulaType::Text),
    known("NPV", FormulaType::Financial),
    known("IRR", FormulaType::Financial),
    known("PV", FormulaType::Financial),
    known("FV", FormulaType::Financial),
    known("PMT", FormulaType::Financial),
    known("XIRR", FormulaType::Financial),
    known("XNPV", FormulaType::Financial),
    known("DATE", FormulaType::DateTime),
    known("TODAY", FormulaType::DateTime),
    known("NOW", FormulaType::DateTime),
    known("YEAR", FormulaType::DateTime),
    known("MONTH", FormulaType::DateTime),
    known("DAY", FormulaType::DateTime),
    known("TRANSPOSE", FormulaType::Array),
    known("MMULT", FormulaType::Array),
    known("FILTER", FormulaType::Array),
    known("SORT", FormulaType::Array),
    known("UNIQUE", FormulaType::Array),
    known("SEQUENCE", FormulaType::Array),
    known("SUMPRODUCT", FormulaType::Array),
    known("ABS", FormulaType::Arithmetic),
    known("ROUND", FormulaType::Arithmetic),
    known("ROUNDUP", FormulaType::Arithmetic),
    known("ROUNDDOWN", FormulaType::Arithmetic),
    known("INT", FormulaType::Arithmetic),
    known("MOD", FormulaType::Arithmetic),
    known("POWER", FormulaType::Arithmetic),
    known("SQRT", FormulaType::Arithmetic),
];

/// Functions that are hard to reimplement faithfully (dynamic references, multi-criteria).
pub const COMPLEX_FUNCTIONS: &[&str] = &[
    "VLOOKUP", "INDEX", "MATCH", "OFFSET", "INDIRECT", "SUMIFS", "COUNTIFS",
];

/// Aggregates with a direct columnar equivalent.
pub const VECTORIZABLE_FUNCTIONS: &[&str] = &["SUM", "AVERAGE", "COUNT", "MAX", "MIN", "STDEV", "VAR"];

/// Bare identifiers that are never named ranges.
pub const RESERVED_WORDS: &[&str] = &["TRUE", "FALSE", "NULL", "AND", "OR", "NOT"];

/// Prefixes stored in front of functions added in later file-format versions.
const STORAGE_PREFIXES: &[&str] = &["_XLFN.", "_XLWS."];

fn category_table() -> &'static HashMap<&'static str, FormulaType> {
    static TABLE: OnceLock<HashMap<&'static str, FormulaType>> = OnceLock::new();
    TABLE.get_or_init(|| {
        KNOWN_FUNCTIONS
            .iter()
            .map(|f| (f.name, f.category))
            .collect()
    })
}

/// Category of a (normalized) function name, or None if the name is not well known.
pub fn function_category(name: &str) -> Option<FormulaType> {
    category_table().get(name).copied()
}

pub fn is_complex_function(name: &str) -> bool {
    COMPLEX_FUNCTIONS.contains(&name)
}

pub fn is_vectorizable_function(name: &str) -> bool {
    VECTORIZABLE_FUNCTIONS.contains(&name)
}

pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(word))
}

/// Uppercase a function name and drop any storage prefix (`_xlfn.XLOOKUP` -> `XLOOKUP`).
pub fn normalize_function_name(raw: &str) -> String {
    let upper = raw.to_ascii_uppercase();
    for prefix in STORAGE_PREFIXES {
        if let Some(rest) = upper.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    upper
}

/// Matches `NAME(` call sites; group 1 is the raw function name.
pub fn function_call_re() -> &'static Regex {
    static FN_RE: OnceLock<Regex> = OnceLock::new();
    FN_RE.get_or_init(|| {
        Regex::new(r"([A-Za-z_][A-Za-z0-9_.]*)\s*\(").expect("function call regex must compile")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_no_duplicates() {
        assert_eq!(category_table().len(), KNOWN_FUNCTIONS.len());
    }

    #[test]
    fn test_complex_and_vectorizable_functions_are_known() {
        for name in COMPLEX_FUNCTIONS.iter().chain(VECTORIZABLE_FUNCTIONS) {
            assert!(function_category(name).is_some(), "{name} missing from table");
        }
    }

    #[test]
    fn test_normalize_function_name() {
        assert_eq!(normalize_function_name("sum"), "SUM");
        assert_eq!(normalize_function_name("_xlfn.xlookup"), "XLOOKUP");
        assert_eq!(normalize_function_name("_xlws.FILTER"), "FILTER");
    }

    #[test]
    fn test_reserved_words_are_case_insensitive() {
        assert!(is_reserved_word("true"));
        assert!(is_reserved_word("Null"));
        assert!(!is_reserved_word("Revenue"));
    }
}
