//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "$B$2", "AA100") and zero-indexed column/row coordinates, and
//! the sheet-qualified [`CellAddress`] whose canonical text form
//! (`Sheet!A1`, the *full address*) keys every node of the dependency graph.
//!
//! # Examples
//!
//! ```ignore
//! let cell = CellRef::from_str("$B3").unwrap();
//! assert_eq!(cell.col, 1);  // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//!
//! let addr = CellAddress::new("Sheet1", cell);
//! assert_eq!(addr.full_address(), "Sheet1!B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A reference to a cell by column and row indices (0-indexed).
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a cell reference from spreadsheet notation (e.g., "A1", "$B$2", "aa10").
    /// Absolute markers are accepted and discarded. Returns None if the input is invalid.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Option<CellRef> {
        Self::parse_a1(name)
    }

    fn parse_a1(name: &str) -> Option<CellRef> {
        let caps = a1_re().captures(name)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0usize;
        for c in letters.to_ascii_uppercase().bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;

        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellRef::new(col, row))
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

fn a1_re() -> &'static Regex {
    static A1_RE: OnceLock<Regex> = OnceLock::new();
    A1_RE.get_or_init(|| {
        Regex::new(r"^\$?(?<letters>[A-Za-z]+)\$?(?<numbers>[0-9]+)$")
            .expect("A1 reference regex must compile")
    })
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}

/// A cell qualified by the sheet that owns it.
///
/// Equality is structural over (sheet, column, row); absolute markers in the
/// source text never reach this type.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellAddress {
    pub sheet: String,
    pub cell: CellRef,
}

impl CellAddress {
    pub fn new(sheet: impl Into<String>, cell: CellRef) -> CellAddress {
        CellAddress {
            sheet: sheet.into(),
            cell,
        }
    }

    /// Canonical `Sheet!A1` key used for graph nodes.
    pub fn full_address(&self) -> String {
        self.to_string()
    }

    /// Parse a full address (`Sheet1!A1`, `'My Sheet'!$B$2`).
    ///
    /// The sheet is split at the last `!`, so sheet names may not contain one
    /// unless quoted.
    pub fn parse(text: &str) -> Option<CellAddress> {
        let (sheet, cell) = text.rsplit_once('!')?;
        let sheet = unquote_sheet(sheet);
        if sheet.is_empty() {
            return None;
        }
        Some(CellAddress::new(sheet, CellRef::from_str(cell)?))
    }
}

impl std::str::FromStr for CellAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid cell address: {}", s))
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, self.cell)
    }
}

/// Strip the surrounding quotes of a quoted sheet name, undoing `''` escapes.
pub fn unquote_sheet(sheet: &str) -> String {
    let trimmed = sheet.trim();
    match trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
    {
        Some(inner) => inner.replace("''", "'"),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_a1_overflow_returns_none() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(CellRef::from_str(&huge).is_none());
    }

    #[test]
    fn test_col_to_letters_handles_max_usize() {
        let letters = CellRef::col_to_letters(usize::MAX);
        assert!(!letters.is_empty());
        assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_absolute_markers_do_not_affect_identity() {
        let plain = CellRef::from_str("B2").unwrap();
        assert_eq!(CellRef::from_str("$B$2"), Some(plain.clone()));
        assert_eq!(CellRef::from_str("$B2"), Some(plain.clone()));
        assert_eq!(CellRef::from_str("b$2"), Some(plain));
        assert!(CellRef::from_str("$$B2").is_none());
    }

    #[test]
    fn test_full_address_round_trip() {
        let addr = CellAddress::parse("Sheet1!$c$10").unwrap();
        assert_eq!(addr.sheet, "Sheet1");
        assert_eq!(addr.cell, CellRef::new(2, 9));
        assert_eq!(addr.full_address(), "Sheet1!C10");
    }

    #[test]
    fn test_quoted_sheet_names() {
        let addr = CellAddress::parse("'Q1 Plan'!A1").unwrap();
        assert_eq!(addr.sheet, "Q1 Plan");
        assert_eq!(addr.full_address(), "Q1 Plan!A1");

        let escaped = CellAddress::parse("'Bob''s'!A1").unwrap();
        assert_eq!(escaped.sheet, "Bob's");
    }

    #[test]
    fn test_invalid_full_addresses() {
        assert!(CellAddress::parse("A1").is_none());
        assert!(CellAddress::parse("!A1").is_none());
        assert!(CellAddress::parse("Sheet1!").is_none());
        assert!("Sheet1!A0".parse::<CellAddress>().is_err());
    }
}
