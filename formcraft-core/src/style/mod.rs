//! Per-column style extraction

pub mod heights;
pub mod number_format;

pub use heights::RowHeights;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::events::{EventLog, EventScope};
use crate::reader::{CellAlignment, Sheet};

/// How many rows below the first data row to probe when a cell is empty
const PROBE_ROWS: u32 = 3;

/// Style facts for one mapped column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
}

impl ColumnStyle {
    pub fn is_empty(&self) -> bool {
        self.number_format.is_none() && self.alignment.is_none()
    }
}

/// Alignment override carried into the output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
}

impl From<&CellAlignment> for Alignment {
    fn from(a: &CellAlignment) -> Self {
        Self {
            horizontal: a.horizontal.clone(),
            vertical: a.vertical.clone(),
        }
    }
}

/// Extracts number formats and alignments column by column
pub struct StyleExtractor;

impl StyleExtractor {
    /// Build `column_id_styles` for the given mapped columns.
    ///
    /// `columns` pairs each canonical id with its 1-based sheet column;
    /// `first_data_row` is 1-based. A column with no populated cell in the
    /// probe window is omitted, never an error.
    pub fn column_styles(
        sheet: &Sheet,
        columns: &[(String, u32)],
        first_data_row: u32,
        events: &mut EventLog,
    ) -> BTreeMap<String, ColumnStyle> {
        let mut styles = BTreeMap::new();

        for (id, excel_column) in columns {
            let col0 = excel_column - 1;
            let first_row0 = first_data_row - 1;

            let cell = (first_row0..=first_row0 + PROBE_ROWS)
                .filter_map(|row| sheet.cell(row, col0))
                .find(|c| !c.value.is_empty());

            let Some(cell) = cell else {
                events.info(
                    "style",
                    EventScope::Sheet(sheet.name.clone()),
                    format!("no populated data cell for '{}', style omitted", id),
                );
                continue;
            };

            let style = ColumnStyle {
                number_format: cell
                    .num_fmt
                    .as_deref()
                    .map(number_format::standardize)
                    .filter(|f| !f.is_empty()),
                alignment: cell
                    .alignment
                    .as_ref()
                    .filter(|a| !a.is_empty())
                    .map(Alignment::from),
            };

            if !style.is_empty() {
                styles.insert(id.clone(), style);
            }
        }

        styles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::workbook::{Cell, CellValue};

    fn cell(row: u32, col: u32, num_fmt: Option<&str>, alignment: Option<CellAlignment>) -> Cell {
        Cell {
            row,
            col,
            value: CellValue::Number(1.0),
            formula: None,
            num_fmt: num_fmt.map(str::to_string),
            font: None,
            alignment,
        }
    }

    fn sheet(cells: Vec<Cell>) -> Sheet {
        let mut s = Sheet {
            name: "Invoice".to_string(),
            used_range: Some((40, 10)),
            ..Sheet::default()
        };
        for c in cells {
            s.cells.insert((c.row, c.col), c);
        }
        s
    }

    #[test]
    fn test_accounting_format_standardized() {
        let raw = r#"_-* #,##0.00_-;-* #,##0.00_-;_-* "-"??_-;_-@_-"#;
        let s = sheet(vec![cell(11, 4, Some(raw), None)]);
        let mut events = EventLog::new();
        let styles = StyleExtractor::column_styles(
            &s,
            &[("col_amount".to_string(), 5)],
            12,
            &mut events,
        );
        assert_eq!(
            styles.get("col_amount").unwrap().number_format.as_deref(),
            Some("#,##0.00")
        );
    }

    #[test]
    fn test_probes_past_empty_rows() {
        let mut empty = cell(11, 2, None, None);
        empty.value = CellValue::Empty;
        let populated = cell(13, 2, Some("0.00"), None);
        let s = sheet(vec![empty, populated]);
        let mut events = EventLog::new();
        let styles =
            StyleExtractor::column_styles(&s, &[("col_qty_sf".to_string(), 3)], 12, &mut events);
        assert_eq!(
            styles.get("col_qty_sf").unwrap().number_format.as_deref(),
            Some("#,##0.00")
        );
    }

    #[test]
    fn test_empty_column_omitted() {
        let s = sheet(vec![]);
        let mut events = EventLog::new();
        let styles =
            StyleExtractor::column_styles(&s, &[("col_desc".to_string(), 2)], 12, &mut events);
        assert!(styles.is_empty());
        assert!(events.events().iter().any(|e| e.message.contains("col_desc")));
    }

    #[test]
    fn test_alignment_carried_without_fallback() {
        let alignment = CellAlignment {
            horizontal: Some("center".to_string()),
            vertical: None,
        };
        let s = sheet(vec![
            cell(11, 0, None, Some(alignment)),
            cell(11, 1, Some("General"), None),
        ]);
        let mut events = EventLog::new();
        let styles = StyleExtractor::column_styles(
            &s,
            &[
                ("col_static".to_string(), 1),
                ("col_po".to_string(), 2),
            ],
            12,
            &mut events,
        );
        let mark = styles.get("col_static").unwrap();
        assert_eq!(
            mark.alignment.as_ref().unwrap().horizontal.as_deref(),
            Some("center")
        );
        assert!(mark.number_format.is_none());
        // General format and no alignment leaves nothing to record
        assert!(!styles.contains_key("col_po"));
    }
}
