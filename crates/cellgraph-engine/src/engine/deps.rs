//! Reference extraction from formula strings.
//!
//! Parses formula text to find every cell reference (e.g., `A1`, `$B$2`,
//! `Data!C3`, `'Q1 Plan'!D4`) and range reference (`A1:B10`) it contains.
//! This is used to build the dependency graph and to describe formulas to
//! downstream generators.
//!
//! Handles:
//! - Simple cell references, with or without absolute markers
//! - Sheet-qualified references, bare or quoted
//! - Range references; only the two boundary cells are captured, the cells
//!   between them are never enumerated
//! - Ignores references inside string literals
//!
//! Named ranges are detected heuristically from whatever identifiers remain
//! once references, function calls and punctuation are removed. They are
//! advisory metadata only.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use super::cell_ref::{CellAddress, CellRef, unquote_sheet};
use crate::functions::{function_call_re, is_reserved_word};

/// A rectangular range, kept as its two boundary cells.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RangeRef {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.sheet == self.end.sheet {
            write!(f, "{}:{}", self.start, self.end.cell)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

/// Everything the reference scanner found in one formula.
#[derive(Clone, Debug, Default)]
pub struct ReferenceScan {
    /// Single-cell references, qualified with their sheet.
    pub cells: BTreeSet<CellAddress>,
    /// Range references, qualified with their sheet.
    pub ranges: BTreeSet<RangeRef>,
    /// Single-cell references as written, normalized (`$` removed, uppercase).
    pub cell_tokens: BTreeSet<String>,
    /// Range references as written, normalized the same way.
    pub range_tokens: BTreeSet<String>,
    /// Formula body with string literals and references blanked out.
    pub residual: String,
}

impl ReferenceScan {
    /// Full addresses of every single cell plus both boundaries of every range.
    pub fn full_addresses(&self) -> BTreeSet<String> {
        let mut out: BTreeSet<String> = self.cells.iter().map(CellAddress::full_address).collect();
        for range in &self.ranges {
            out.insert(range.start.full_address());
            out.insert(range.end.full_address());
        }
        out
    }
}

/// Extract the full addresses a formula refers to, qualifying unprefixed
/// references with `current_sheet`.
pub fn extract_references(formula: &str, current_sheet: &str) -> BTreeSet<String> {
    scan_references(formula, current_sheet).full_addresses()
}

/// Scan a formula (with or without a leading `=`) for cell and range references.
pub fn scan_references(formula: &str, current_sheet: &str) -> ReferenceScan {
    let body = strip_string_literals(formula_body(formula));
    let mut scan = ReferenceScan::default();
    let mut residual = body.clone();

    for caps in reference_re().captures_iter(&body) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if !is_token_boundary(&body, whole.start(), whole.end()) {
            continue;
        }
        let Some(start) = CellRef::from_str(&caps["start"]) else {
            continue;
        };

        let written_sheet = caps.name("sheet").map(|m| unquote_sheet(m.as_str()));
        let sheet = written_sheet.clone().unwrap_or_else(|| current_sheet.to_string());
        let prefix = written_sheet.map(|s| format!("{}!", s)).unwrap_or_default();

        match caps.name("end") {
            Some(end_match) => {
                let Some(end) = CellRef::from_str(end_match.as_str()) else {
                    continue;
                };
                let end_sheet = caps
                    .name("end_sheet")
                    .map(|m| unquote_sheet(m.as_str()))
                    .unwrap_or_else(|| sheet.clone());
                let range = RangeRef {
                    start: CellAddress::new(sheet, start),
                    end: CellAddress::new(end_sheet, end),
                };
                scan.range_tokens.insert(range_token(&prefix, &range, &caps));
                scan.ranges.insert(range);
            }
            None => {
                scan.cell_tokens.insert(format!("{}{}", prefix, start));
                scan.cells.insert(CellAddress::new(sheet, start));
            }
        }

        residual.replace_range(whole.range(), &" ".repeat(whole.len()));
    }

    scan.residual = residual;
    scan
}

fn range_token(prefix: &str, range: &RangeRef, caps: &Captures<'_>) -> String {
    match caps.name("end_sheet") {
        Some(_) => format!("{}{}:{}", prefix, range.start.cell, range.end),
        None => format!("{}{}:{}", prefix, range.start.cell, range.end.cell),
    }
}

/// Heuristically detect named ranges in a formula.
///
/// Whatever bare identifiers survive the removal of string literals, cell and
/// range references, function calls, error literals and sheet prefixes are
/// treated as names, except for a small reserved set (`TRUE`, `FALSE`, ...).
/// Free text or unusual tokens can produce false positives.
pub fn extract_named_ranges(formula: &str) -> BTreeSet<String> {
    let scan = scan_references(formula, "");
    named_ranges_in_residual(&scan.residual)
}

pub(crate) fn named_ranges_in_residual(residual: &str) -> BTreeSet<String> {
    identifier_tokens(residual)
        .filter(|word| !is_reserved_word(word))
        .map(str::to_string)
        .collect()
}

/// Bare identifiers left in a residual once calls, errors and sheet prefixes are gone.
pub(crate) fn identifier_tokens(residual: &str) -> impl Iterator<Item = &str> {
    // Positions are preserved by blanking instead of removing, so the
    // returned slices borrow the caller's string.
    let blanked = blank_matches(residual, function_call_re());
    let blanked = blank_matches(&blanked, error_literal_re());
    let blanked = blank_matches(&blanked, sheet_prefix_re());

    word_re()
        .find_iter(residual)
        .filter(move |m| blanked.get(m.range()) == Some(m.as_str()))
        .map(|m| m.as_str())
        .filter(|word| word.starts_with(|c: char| c.is_alphabetic() || c == '_'))
}

fn blank_matches(text: &str, re: &Regex) -> String {
    let mut out = text.to_string();
    for m in re.find_iter(text) {
        out.replace_range(m.range(), &" ".repeat(m.len()));
    }
    out
}

/// Drop leading `=` signs and surrounding whitespace.
pub(crate) fn formula_body(formula: &str) -> &str {
    formula.trim().trim_start_matches('=')
}

fn is_token_boundary(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !(c.is_alphanumeric() || matches!(c, '_' | '.' | '$' | '\'' | '!')));
    let after_ok = text[end..]
        .chars()
        .next()
        .is_none_or(|c| !(c.is_alphanumeric() || matches!(c, '_' | '.' | '(' | '!' | '$')));
    before_ok && after_ok
}

fn reference_re() -> &'static Regex {
    static REF_RE: OnceLock<Regex> = OnceLock::new();
    REF_RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?:(?<sheet>'(?:[^']|'')+'|[\p{L}_][\p{L}\p{N}_.]*)!)?",
            r"(?<start>\$?[A-Za-z]{1,3}\$?[0-9]+)",
            r"(?::(?:(?<end_sheet>'(?:[^']|'')+'|[\p{L}_][\p{L}\p{N}_.]*)!)?",
            r"(?<end>\$?[A-Za-z]{1,3}\$?[0-9]+))?",
        ))
        .expect("reference regex must compile")
    })
}

fn sheet_prefix_re() -> &'static Regex {
    static SHEET_RE: OnceLock<Regex> = OnceLock::new();
    SHEET_RE.get_or_init(|| {
        Regex::new(r"(?:'(?:[^']|'')+'|[\p{L}_][\p{L}\p{N}_.]*)!")
            .expect("sheet prefix regex must compile")
    })
}

fn error_literal_re() -> &'static Regex {
    static ERR_RE: OnceLock<Regex> = OnceLock::new();
    ERR_RE.get_or_init(|| {
        Regex::new(r"#[A-Za-z0-9/]+[!?]?").expect("error literal regex must compile")
    })
}

fn word_re() -> &'static Regex {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    WORD_RE.get_or_init(|| Regex::new(r"[\p{L}\p{N}_.]+").expect("word regex must compile"))
}

/// Replace the contents of `"..."` literals with spaces, keeping the quotes.
/// A doubled quote inside a literal is an escaped quote.
pub(crate) fn strip_string_literals(formula: &str) -> String {
    let mut out = String::with_capacity(formula.len());
    let mut in_string = false;
    let mut chars = formula.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_string {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    out.push_str("  ");
                } else {
                    in_string = false;
                    out.push('"');
                }
            } else {
                out.push(' ');
            }
        } else if ch == '"' {
            in_string = true;
            out.push('"');
        } else {
            out.push(ch);
        }
    }

    out
}

/// The decoded contents of every `"..."` literal, in order of appearance.
pub(crate) fn string_literals(formula: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut chars = formula.chars().peekable();

    while let Some(ch) = chars.next() {
        if !in_string {
            in_string = ch == '"';
            continue;
        }
        if ch == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                current.push('"');
            } else {
                in_string = false;
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }

    out
}
