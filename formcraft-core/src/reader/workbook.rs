//! In-memory workbook model produced by the reader

use std::collections::HashMap;
use std::path::PathBuf;

/// A loaded workbook with all facts the pipeline needs
#[derive(Debug)]
pub struct Workbook {
    pub path: PathBuf,
    pub sheets: Vec<Sheet>,
    pub hidden_sheets: Vec<String>,
}

impl Workbook {
    /// Look up a sheet by name
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Names of sheets that are visible and should be analyzed
    pub fn visible_sheet_names(&self) -> Vec<&str> {
        self.sheets
            .iter()
            .filter(|s| !self.hidden_sheets.contains(&s.name))
            .map(|s| s.name.as_str())
            .collect()
    }
}

/// A single worksheet. All row/column indices are 0-based.
#[derive(Debug, Default)]
pub struct Sheet {
    pub name: String,
    pub cells: HashMap<(u32, u32), Cell>,
    /// (rows, cols) of the used range, if any cell exists
    pub used_range: Option<(u32, u32)>,
    pub merged_cells: Vec<MergedRange>,
    /// Explicit row heights in points, keyed by 0-based row
    pub row_heights: HashMap<u32, f64>,
    pub hidden_columns: Vec<u32>,
    pub hidden_rows: Vec<u32>,
    pub formula_parsing_error: Option<String>,
}

impl Sheet {
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Text content of a cell, if it holds text
    pub fn text_at(&self, row: u32, col: u32) -> Option<&str> {
        self.cell(row, col).and_then(|c| c.value.as_text())
    }

    /// Formula string of a cell, if one is attached
    pub fn formula_at(&self, row: u32, col: u32) -> Option<&str> {
        self.cell(row, col).and_then(|c| c.formula.as_deref())
    }

    pub fn max_row(&self) -> u32 {
        self.used_range.map(|(rows, _)| rows).unwrap_or(0)
    }

    pub fn max_col(&self) -> u32 {
        self.used_range.map(|(_, cols)| cols).unwrap_or(0)
    }

    /// Merged ranges whose top-left cell sits on `row`
    pub fn merges_starting_on_row(&self, row: u32) -> Vec<&MergedRange> {
        self.merged_cells
            .iter()
            .filter(|m| m.start_row == row)
            .collect()
    }
}

/// One cell: calculated value plus any formula and style facts
#[derive(Debug, Clone)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub value: CellValue,
    pub formula: Option<String>,
    pub num_fmt: Option<String>,
    pub font: Option<CellFont>,
    pub alignment: Option<CellAlignment>,
}

/// Calculated cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, CellValue::Text(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// A merged cell range, 0-based inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl MergedRange {
    pub fn colspan(&self) -> u32 {
        self.end_col - self.start_col + 1
    }

    pub fn rowspan(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }
}

/// Font name and size attached to a cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellFont {
    pub name: String,
    pub size: f64,
}

/// Alignment attached to a cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellAlignment {
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
}

impl CellAlignment {
    pub fn is_empty(&self) -> bool {
        self.horizontal.is_none() && self.vertical.is_none()
    }
}
