//! Header span inference: colspan from column gaps, rowspan from missing
//! sub-headers, parent/child splits across two header rows

use crate::error::AnalyzeError;
use crate::events::{EventLog, EventScope, EventLevel, InferenceEvent};
use crate::scanner::HeaderCell;

/// Derived footprint of one header cell (1-based coordinates)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpanFact {
    pub keyword: String,
    pub row: u32,
    pub excel_column: u32,
    pub colspan: u32,
    pub rowspan: u32,
}

/// A parent keyword split into child columns on the following header row
#[derive(Debug, Clone)]
pub struct ParentSplit {
    pub parent: String,
    pub children: Vec<String>,
}

impl ParentSplit {
    pub fn new(parent: &str, children: &[&str]) -> Self {
        Self {
            parent: parent.to_string(),
            children: children.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Resolves header spans for one sheet
pub struct SpanResolver {
    splits: Vec<ParentSplit>,
}

impl SpanResolver {
    pub fn new(splits: Vec<ParentSplit>) -> Self {
        Self { splits }
    }

    /// Resolve spans for all header cells of one sheet.
    ///
    /// Cells are grouped by row and walked in column order. Defaults are
    /// 1x1; gaps widen colspan, parent/child splits override gaps, and a
    /// first-row header with nothing beneath it spans both header rows.
    pub fn resolve(
        &self,
        sheet_name: &str,
        header_cells: &[HeaderCell],
        events: &mut EventLog,
    ) -> Vec<HeaderSpanFact> {
        if header_cells.is_empty() {
            return Vec::new();
        }

        let first_row = header_cells.iter().map(|c| c.row).min().unwrap_or(1);
        let mut top: Vec<&HeaderCell> =
            header_cells.iter().filter(|c| c.row == first_row).collect();
        let mut sub: Vec<&HeaderCell> =
            header_cells.iter().filter(|c| c.row == first_row + 1).collect();
        top.sort_by_key(|c| c.column);
        sub.sort_by_key(|c| c.column);

        let mut facts = Vec::new();

        for (idx, cell) in top.iter().enumerate() {
            let mut colspan = 1u32;
            let mut rowspan = 1u32;

            let gap_span = top
                .get(idx + 1)
                .map(|next| next.column - cell.column)
                .filter(|gap| *gap > 1);

            let child_count = self.child_count(cell, &sub);

            match (child_count, gap_span) {
                (Some(children), gap) => {
                    // Parent/child split wins over the gap signal
                    if let Some(gap) = gap {
                        if gap != children {
                            let err = AnalyzeError::AmbiguousSpan {
                                sheet: sheet_name.to_string(),
                                text: cell.keyword.clone(),
                            };
                            events.push(
                                InferenceEvent::new(
                                    "spans",
                                    EventScope::Sheet(sheet_name.to_string()),
                                    err.to_string(),
                                    EventLevel::Warning,
                                )
                                .with_context("gap", gap.to_string())
                                .with_context("children", children.to_string())
                                .with_context("resolution", "keeping child split"),
                            );
                        }
                    }
                    colspan = children;
                }
                (None, Some(gap)) => {
                    colspan = gap;
                    // A gap-spanning header with no sub-header still spans down
                    if !sub.is_empty() && !self.has_cell_below(cell, &sub) {
                        rowspan = 2;
                    }
                }
                (None, None) => {
                    if !sub.is_empty() && !self.has_cell_below(cell, &sub) {
                        rowspan = 2;
                    }
                }
            }

            facts.push(HeaderSpanFact {
                keyword: cell.keyword.clone(),
                row: cell.row,
                excel_column: cell.column,
                colspan,
                rowspan,
            });
        }

        // Second-row cells: 1x1, widened only by same-row gaps
        for (idx, cell) in sub.iter().enumerate() {
            let colspan = sub
                .get(idx + 1)
                .map(|next| next.column - cell.column)
                .filter(|gap| *gap > 1)
                .unwrap_or(1);
            facts.push(HeaderSpanFact {
                keyword: cell.keyword.clone(),
                row: cell.row,
                excel_column: cell.column,
                colspan,
                rowspan: 1,
            });
        }

        facts
    }

    /// Number of known child headers sitting directly beneath a parent cell
    fn child_count(&self, cell: &HeaderCell, sub: &[&HeaderCell]) -> Option<u32> {
        let split = self
            .splits
            .iter()
            .find(|s| s.parent.eq_ignore_ascii_case(&cell.keyword))?;

        let mut count = 0u32;
        let mut expected_col = cell.column;
        for child in sub.iter().filter(|c| c.column >= cell.column) {
            if child.column != expected_col {
                break;
            }
            let known = split
                .children
                .iter()
                .any(|k| k.eq_ignore_ascii_case(&child.keyword));
            if !known {
                break;
            }
            count += 1;
            expected_col += 1;
        }

        if count > 0 { Some(count) } else { None }
    }

    fn has_cell_below(&self, cell: &HeaderCell, sub: &[&HeaderCell]) -> bool {
        sub.iter().any(|c| c.column == cell.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(keyword: &str, row: u32, column: u32) -> HeaderCell {
        HeaderCell {
            keyword: keyword.to_string(),
            row,
            column,
        }
    }

    fn resolver() -> SpanResolver {
        SpanResolver::new(vec![ParentSplit::new("Quantity", &["PCS", "SF"])])
    }

    fn fact<'a>(facts: &'a [HeaderSpanFact], keyword: &str) -> &'a HeaderSpanFact {
        facts.iter().find(|f| f.keyword == keyword).unwrap()
    }

    #[test]
    fn test_flat_row_stays_unit() {
        // No gaps, single row: everything 1x1
        let cells = vec![
            cell("PO", 10, 1),
            cell("Item", 10, 2),
            cell("Description", 10, 3),
        ];
        let mut events = EventLog::new();
        let facts = resolver().resolve("Invoice", &cells, &mut events);
        assert!(facts.iter().all(|f| f.colspan == 1 && f.rowspan == 1));
    }

    #[test]
    fn test_quantity_parent_with_children() {
        let cells = vec![
            cell("PO", 10, 1),
            cell("Item", 10, 2),
            cell("Quantity", 10, 5),
            cell("PCS", 11, 5),
            cell("SF", 11, 6),
        ];
        let mut events = EventLog::new();
        let facts = resolver().resolve("Packing list", &cells, &mut events);

        let quantity = fact(&facts, "Quantity");
        assert_eq!(quantity.colspan, 2);
        assert_eq!(quantity.rowspan, 1);

        assert_eq!(fact(&facts, "PO").rowspan, 2);
        assert_eq!(fact(&facts, "Item").rowspan, 2);
        assert_eq!(fact(&facts, "PCS").rowspan, 1);
        assert_eq!(fact(&facts, "SF").rowspan, 1);
    }

    #[test]
    fn test_gap_widens_colspan() {
        let cells = vec![cell("Mark", 5, 1), cell("Amount", 5, 4)];
        let mut events = EventLog::new();
        let facts = resolver().resolve("Invoice", &cells, &mut events);
        assert_eq!(fact(&facts, "Mark").colspan, 3);
        assert_eq!(fact(&facts, "Amount").colspan, 1);
    }

    #[test]
    fn test_split_beats_gap() {
        // Quantity has both a gap to the next header and a child split; the
        // split decides and the conflict is logged
        let cells = vec![
            cell("Quantity", 10, 2),
            cell("Amount", 10, 6),
            cell("PCS", 11, 2),
            cell("SF", 11, 3),
        ];
        let mut events = EventLog::new();
        let facts = resolver().resolve("Packing list", &cells, &mut events);
        assert_eq!(fact(&facts, "Quantity").colspan, 2);
        assert!(events
            .events()
            .iter()
            .any(|e| e.message.contains("conflicting span signals")));
    }

    #[test]
    fn test_unknown_children_ignored() {
        let cells = vec![
            cell("Quantity", 10, 2),
            cell("Remarks", 11, 2),
        ];
        let mut events = EventLog::new();
        let facts = resolver().resolve("Invoice", &cells, &mut events);
        // "Remarks" is not a known child, so no split applies
        assert_eq!(fact(&facts, "Quantity").colspan, 1);
        assert_eq!(fact(&facts, "Quantity").rowspan, 1);
    }
}
