//! Cell listing handed over by the spreadsheet reader.
//!
//! Reading the file container is not this crate's job; a reader produces a
//! [`Workbook`] (sheets in order, each with its cell records) and the graph
//! builder consumes it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A literal cell value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// One non-empty cell as emitted by the reader.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellRecord {
    /// A1-style address within the sheet (`B7`).
    pub address: String,
    pub value: Option<CellValue>,
    /// Formula text, with or without the leading `=`.
    pub formula: Option<String>,
    pub data_type: Option<String>,
    pub number_format: Option<String>,
    pub comment: Option<String>,
    pub is_merged: bool,
}

impl CellRecord {
    pub fn literal(address: impl Into<String>, value: impl Into<CellValue>) -> Self {
        CellRecord {
            address: address.into(),
            value: Some(value.into()),
            ..CellRecord::default()
        }
    }

    pub fn formula(address: impl Into<String>, formula: impl Into<String>) -> Self {
        CellRecord {
            address: address.into(),
            formula: Some(formula.into()),
            ..CellRecord::default()
        }
    }

    /// Formula text if the record holds a non-blank formula.
    pub fn formula_text(&self) -> Option<&str> {
        self.formula
            .as_deref()
            .filter(|f| !f.trim().trim_start_matches('=').trim().is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub cells: Vec<CellRecord>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            cells: Vec::new(),
        }
    }

    pub fn with_cell(mut self, cell: CellRecord) -> Self {
        self.cells.push(cell);
        self
    }
}

/// A workbook-defined name. Carried as metadata only; never expanded into cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRange {
    pub name: String,
    pub sheet: Option<String>,
    /// Target as written (`Sheet1!$A$1:$A$10`).
    pub address: String,
    /// `"workbook"` or the owning sheet name.
    pub scope: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    pub named_ranges: BTreeMap<String, NamedRange>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn with_named_range(mut self, named: NamedRange) -> Self {
        self.named_ranges.insert(named.name.clone(), named);
        self
    }

    pub fn cell_count(&self) -> usize {
        self.sheets.iter().map(|s| s.cells.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_text_ignores_blank_formulas() {
        assert_eq!(CellRecord::formula("A1", "=B1").formula_text(), Some("=B1"));
        assert_eq!(CellRecord::formula("A1", " = ").formula_text(), None);
        assert_eq!(CellRecord::literal("A1", 3.0).formula_text(), None);
    }

    #[test]
    fn test_workbook_deserializes_from_reader_output() {
        let json = r#"{
            "sheets": [
                {"name": "Sheet1", "cells": [
                    {"address": "A1", "value": 10},
                    {"address": "B1", "formula": "=A1*2", "number_format": "0.00"}
                ]}
            ],
            "named_ranges": {
                "Rate": {"name": "Rate", "sheet": null, "address": "Sheet1!$A$1", "scope": "workbook"}
            }
        }"#;
        let workbook: Workbook = serde_json::from_str(json).unwrap();
        assert_eq!(workbook.cell_count(), 2);
        assert_eq!(workbook.sheets[0].cells[0].value, Some(CellValue::Number(10.0)));
        assert_eq!(workbook.sheets[0].cells[1].formula_text(), Some("=A1*2"));
        assert!(workbook.named_ranges.contains_key("Rate"));
    }
}
