//! Header descriptor assembly and column-overlap resolution

use serde::{Deserialize, Serialize};

use crate::error::AnalyzeError;
use crate::events::{EventLevel, EventLog, EventScope, InferenceEvent};
use crate::scanner::WorksheetFacts;
use crate::spans::HeaderSpanFact;

/// Hard bound for overlap resolution; shifting a header this far right means
/// the span facts are inconsistent and the sheet is abandoned
const MAX_HEADER_COLUMN: u32 = 256;

fn is_one(value: &u32) -> bool {
    *value == 1
}

/// One header cell as written into the final configuration.
/// `row` and `col` are 0-based within the header block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderDescriptor {
    pub row: u32,
    pub col: u32,
    pub text: String,
    pub id: Option<String>,
    #[serde(default = "default_span", skip_serializing_if = "is_one")]
    pub colspan: u32,
    #[serde(default = "default_span", skip_serializing_if = "is_one")]
    pub rowspan: u32,
}

fn default_span() -> u32 {
    1
}

impl HeaderDescriptor {
    /// Column range `[col, col + colspan)` occupied on its row
    pub fn col_range(&self) -> (u32, u32) {
        (self.col, self.col + self.colspan)
    }
}

/// Builds resolved header descriptors out of scan, span and mapping facts
pub struct LayoutAssembler;

impl LayoutAssembler {
    /// Merge facts into descriptors, preserving source column order.
    ///
    /// `ids` runs parallel to `facts.header_cells`. Unmapped leaves (no id,
    /// no span) are dropped; spanning parents survive without an id.
    pub fn assemble(
        facts: &WorksheetFacts,
        spans: &[HeaderSpanFact],
        ids: &[Option<String>],
        events: &mut EventLog,
    ) -> Result<Vec<HeaderDescriptor>, AnalyzeError> {
        let base_row = facts.header_cells.iter().map(|c| c.row).min().unwrap_or(1);
        let base_col = facts
            .header_cells
            .iter()
            .map(|c| c.column)
            .min()
            .unwrap_or(1);

        let mut descriptors: Vec<HeaderDescriptor> = Vec::new();

        for (cell, id) in facts.header_cells.iter().zip(ids.iter()) {
            let span = spans
                .iter()
                .find(|s| s.row == cell.row && s.excel_column == cell.column);
            let (colspan, rowspan) = span.map(|s| (s.colspan, s.rowspan)).unwrap_or((1, 1));

            let rel_row = cell.row - base_row;

            // Deduplicate second-row repeats of the same (column, keyword)
            let duplicate = descriptors.iter().any(|d| {
                d.row == rel_row
                    && d.col == cell.column - base_col
                    && d.text.eq_ignore_ascii_case(&cell.keyword)
            });
            if duplicate {
                continue;
            }

            if id.is_none() && colspan == 1 {
                events.warn(
                    "layout",
                    EventScope::Sheet(facts.sheet_name.clone()),
                    format!("dropping unmapped header '{}'", cell.keyword),
                );
                continue;
            }

            descriptors.push(HeaderDescriptor {
                row: rel_row,
                col: cell.column - base_col,
                text: cell.keyword.clone(),
                id: id.clone(),
                colspan,
                rowspan,
            });
        }

        Self::resolve_overlaps(&facts.sheet_name, descriptors, events)
    }

    /// Cascading shift: walk each row left to right and push any header that
    /// collides with the span of the one before it
    pub fn resolve_overlaps(
        sheet_name: &str,
        mut descriptors: Vec<HeaderDescriptor>,
        events: &mut EventLog,
    ) -> Result<Vec<HeaderDescriptor>, AnalyzeError> {
        descriptors.sort_by_key(|d| (d.row, d.col));

        let mut rows: Vec<u32> = descriptors.iter().map(|d| d.row).collect();
        rows.dedup();

        for row in rows {
            let indices: Vec<usize> = descriptors
                .iter()
                .enumerate()
                .filter(|(_, d)| d.row == row)
                .map(|(i, _)| i)
                .collect();

            for pair in indices.windows(2) {
                let (current_idx, next_idx) = (pair[0], pair[1]);
                let current_end = descriptors[current_idx].col + descriptors[current_idx].colspan - 1;
                if current_end >= descriptors[next_idx].col {
                    let shifted = descriptors[current_idx].col + descriptors[current_idx].colspan;
                    if shifted >= MAX_HEADER_COLUMN {
                        return Err(AnalyzeError::OverlapUnresolvable {
                            sheet: sheet_name.to_string(),
                            col: shifted,
                        });
                    }
                    events.push(
                        InferenceEvent::new(
                            "layout",
                            EventScope::Sheet(sheet_name.to_string()),
                            format!(
                                "shifted header '{}' from col {} to col {}",
                                descriptors[next_idx].text, descriptors[next_idx].col, shifted
                            ),
                            EventLevel::Info,
                        )
                        .with_context("row", row.to_string()),
                    );
                    descriptors[next_idx].col = shifted;
                }
            }
        }

        debug_assert!(find_overlap(&descriptors).is_none());
        Ok(descriptors)
    }
}

/// First overlapping pair on any row, if one exists
pub fn find_overlap(descriptors: &[HeaderDescriptor]) -> Option<(&HeaderDescriptor, &HeaderDescriptor)> {
    for (i, a) in descriptors.iter().enumerate() {
        for b in descriptors.iter().skip(i + 1) {
            if a.row != b.row {
                continue;
            }
            let (a_start, a_end) = a.col_range();
            let (b_start, b_end) = b.col_range();
            if a_start < b_end && b_start < a_end {
                return Some((a, b));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{FontSpec, HeaderCell};

    fn descriptor(row: u32, col: u32, text: &str, colspan: u32) -> HeaderDescriptor {
        HeaderDescriptor {
            row,
            col,
            text: text.to_string(),
            id: Some(format!("col_{}", text.to_lowercase())),
            colspan,
            rowspan: 1,
        }
    }

    fn facts(cells: Vec<HeaderCell>) -> WorksheetFacts {
        let font = FontSpec {
            name: "Times New Roman".to_string(),
            size: 12.0,
        };
        WorksheetFacts {
            sheet_name: "Invoice".to_string(),
            header_cells: cells,
            header_font: font.clone(),
            data_font: font,
            start_row: 12,
            header_row_count: 1,
        }
    }

    #[test]
    fn test_cascading_shift() {
        // col 3 spans two columns, so col 4 moves to 5
        let input = vec![
            descriptor(0, 3, "Quantity", 2),
            descriptor(0, 4, "Amount", 1),
        ];
        let mut events = EventLog::new();
        let resolved = LayoutAssembler::resolve_overlaps("Invoice", input, &mut events).unwrap();
        let amount = resolved.iter().find(|d| d.text == "Amount").unwrap();
        assert_eq!(amount.col, 5);
        assert!(find_overlap(&resolved).is_none());
    }

    #[test]
    fn test_shift_cascades_rightward() {
        let input = vec![
            descriptor(0, 0, "Mark", 3),
            descriptor(0, 1, "PO", 1),
            descriptor(0, 2, "Item", 1),
        ];
        let mut events = EventLog::new();
        let resolved = LayoutAssembler::resolve_overlaps("Invoice", input, &mut events).unwrap();
        let cols: Vec<u32> = resolved.iter().map(|d| d.col).collect();
        assert_eq!(cols, vec![0, 3, 4]);
        assert!(find_overlap(&resolved).is_none());
    }

    #[test]
    fn test_no_shift_when_disjoint() {
        let input = vec![
            descriptor(0, 0, "PO", 1),
            descriptor(0, 1, "Item", 1),
            descriptor(1, 0, "PCS", 1),
        ];
        let mut events = EventLog::new();
        let resolved = LayoutAssembler::resolve_overlaps("Invoice", input, &mut events).unwrap();
        assert!(events.is_empty());
        assert_eq!(resolved.len(), 3);
    }

    #[test]
    fn test_unresolvable_overlap() {
        let input = vec![
            descriptor(0, 0, "Huge", 256),
            descriptor(0, 1, "Next", 1),
        ];
        let mut events = EventLog::new();
        let err = LayoutAssembler::resolve_overlaps("Invoice", input, &mut events).unwrap_err();
        assert!(matches!(err, AnalyzeError::OverlapUnresolvable { .. }));
    }

    #[test]
    fn test_assemble_drops_unmapped_leaves() {
        let cells = vec![
            HeaderCell {
                keyword: "P.O Nº".to_string(),
                row: 10,
                column: 1,
            },
            HeaderCell {
                keyword: "Mystery".to_string(),
                row: 10,
                column: 2,
            },
        ];
        let facts = facts(cells);
        let spans = vec![
            HeaderSpanFact {
                keyword: "P.O Nº".to_string(),
                row: 10,
                excel_column: 1,
                colspan: 1,
                rowspan: 1,
            },
            HeaderSpanFact {
                keyword: "Mystery".to_string(),
                row: 10,
                excel_column: 2,
                colspan: 1,
                rowspan: 1,
            },
        ];
        let ids = vec![Some("col_po".to_string()), None];
        let mut events = EventLog::new();
        let resolved = LayoutAssembler::assemble(&facts, &spans, &ids, &mut events).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id.as_deref(), Some("col_po"));
        assert_eq!(resolved[0].row, 0);
        assert_eq!(resolved[0].col, 0);
    }

    #[test]
    fn test_spanning_parent_survives_without_id() {
        let cells = vec![HeaderCell {
            keyword: "Quantity".to_string(),
            row: 10,
            column: 5,
        }];
        let facts = facts(cells);
        let spans = vec![HeaderSpanFact {
            keyword: "Quantity".to_string(),
            row: 10,
            excel_column: 5,
            colspan: 2,
            rowspan: 1,
        }];
        let ids = vec![None];
        let mut events = EventLog::new();
        let resolved = LayoutAssembler::assemble(&facts, &spans, &ids, &mut events).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, None);
        assert_eq!(resolved[0].colspan, 2);
    }
}
