//! Footer detection: aggregation formulas first, total labels as fallback

use std::collections::BTreeMap;

use regex::Regex;

use crate::config::ToolConfig;
use crate::error::AnalyzeError;
use crate::events::{EventLevel, EventLog, EventScope, InferenceEvent};
use crate::reader::Sheet;

/// Labels that mark a text-only footer row
const TOTAL_LABELS: &[&str] = &["TOTAL OF:", "TOTAL"];

/// A merge anchored on the footer row (1-based coordinates)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterMerge {
    pub colspan: u32,
    pub rowspan: u32,
    pub start_row: u32,
    pub end_row: u32,
}

/// Everything learned about a sheet's footer (1-based coordinates)
#[derive(Debug, Clone, PartialEq)]
pub struct FooterDescriptor {
    pub row: u32,
    pub has_formulas: bool,
    /// Ordered, unique 1-based columns holding aggregation formulas
    pub formula_columns: Vec<u32>,
    pub total_text_column: Option<u32>,
    pub total_text_value: Option<String>,
    pub pallet_count_column: Option<u32>,
    pub pallet_count_value: Option<String>,
    /// Keyed by 1-based start column
    pub merged_cells: BTreeMap<u32, FooterMerge>,
}

enum ScanState {
    FormulaColumns,
    FormulaRow { columns: Vec<u32> },
    FallbackTextScan,
    FooterLabels { row0: u32, has_formulas: bool, columns: Vec<u32> },
    Done(Option<FooterDescriptor>),
}

/// Locates the footer row and its label cells
pub struct FooterLocator {
    search_window: u32,
    label_columns: u32,
    count_patterns: Vec<Regex>,
}

impl FooterLocator {
    pub fn new(config: &ToolConfig) -> Self {
        let count_patterns = [
            r"\d+\s*PALLETS?",
            r"PALLETS?\s*:\s*\d+",
            r"\d+\s*CTNS?",
            r"\d+\s*BOXES?",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("count pattern"))
        .collect();
        Self {
            search_window: config.footer_search_window(),
            label_columns: config.footer_label_columns(),
            count_patterns,
        }
    }

    /// Walk the footer state machine for one sheet.
    ///
    /// `header_row` is 1-based. Returns None when neither an aggregation
    /// formula nor a total label shows up in the window; the caller treats
    /// that as a recoverable per-sheet warning.
    pub fn locate(
        &self,
        sheet: &Sheet,
        header_row: u32,
        events: &mut EventLog,
    ) -> Option<FooterDescriptor> {
        let first_row0 = header_row; // first row below the header, 0-based
        let last_row0 = (first_row0 + self.search_window).min(sheet.max_row());

        let mut state = ScanState::FormulaColumns;

        loop {
            state = match state {
                ScanState::FormulaColumns => {
                    let columns = self.formula_columns(sheet, first_row0, last_row0);
                    if columns.is_empty() {
                        ScanState::FallbackTextScan
                    } else {
                        ScanState::FormulaRow { columns }
                    }
                }
                ScanState::FormulaRow { columns } => {
                    let probe_col0 = columns[0] - 1;
                    let row0 = (first_row0..last_row0).find(|&row| {
                        self.is_aggregation_formula(sheet.formula_at(row, probe_col0))
                    });
                    match row0 {
                        Some(row0) => ScanState::FooterLabels {
                            row0,
                            has_formulas: true,
                            columns,
                        },
                        None => ScanState::FallbackTextScan,
                    }
                }
                ScanState::FallbackTextScan => {
                    let found = (first_row0..last_row0).find_map(|row| {
                        (0..sheet.max_col()).find_map(|col| {
                            let text = sheet.text_at(row, col)?;
                            let upper = text.trim().to_uppercase();
                            TOTAL_LABELS
                                .iter()
                                .any(|label| upper.contains(label))
                                .then_some(row)
                        })
                    });
                    match found {
                        Some(row0) => ScanState::FooterLabels {
                            row0,
                            has_formulas: false,
                            columns: Vec::new(),
                        },
                        None => ScanState::Done(None),
                    }
                }
                ScanState::FooterLabels {
                    row0,
                    has_formulas,
                    columns,
                } => {
                    let descriptor = self.describe_footer(sheet, row0, has_formulas, columns);
                    events.push(
                        InferenceEvent::new(
                            "footer",
                            EventScope::Sheet(sheet.name.clone()),
                            format!(
                                "footer row {} ({})",
                                descriptor.row,
                                if descriptor.has_formulas {
                                    "formula match"
                                } else {
                                    "label match"
                                }
                            ),
                            EventLevel::Info,
                        )
                        .with_context("formula_columns", format!("{:?}", descriptor.formula_columns)),
                    );
                    ScanState::Done(Some(descriptor))
                }
                ScanState::Done(result) => {
                    if result.is_none() {
                        let err = AnalyzeError::FooterNotFound {
                            sheet: sheet.name.clone(),
                        };
                        events.warn(
                            "footer",
                            EventScope::Sheet(sheet.name.clone()),
                            err.to_string(),
                        );
                    }
                    return result;
                }
            };
        }
    }

    /// Columns holding an aggregation formula anywhere in the window,
    /// ordered, unique, 1-based
    fn formula_columns(&self, sheet: &Sheet, first_row0: u32, last_row0: u32) -> Vec<u32> {
        let mut columns = Vec::new();
        for row in first_row0..last_row0 {
            for col in 0..sheet.max_col() {
                if self.is_aggregation_formula(sheet.formula_at(row, col)) {
                    let col1 = col + 1;
                    if !columns.contains(&col1) {
                        columns.push(col1);
                    }
                }
            }
        }
        columns.sort_unstable();
        columns
    }

    fn is_aggregation_formula(&self, formula: Option<&str>) -> bool {
        formula
            .map(|f| f.to_lowercase().contains("sum("))
            .unwrap_or(false)
    }

    fn describe_footer(
        &self,
        sheet: &Sheet,
        row0: u32,
        has_formulas: bool,
        formula_columns: Vec<u32>,
    ) -> FooterDescriptor {
        let mut descriptor = FooterDescriptor {
            row: row0 + 1,
            has_formulas,
            formula_columns,
            total_text_column: None,
            total_text_value: None,
            pallet_count_column: None,
            pallet_count_value: None,
            merged_cells: BTreeMap::new(),
        };

        // Labels sit within one row of the footer, in the leading columns
        let label_rows = [row0.checked_sub(1), Some(row0), Some(row0 + 1)];
        for row in label_rows.into_iter().flatten() {
            for col in 0..self.label_columns.min(sheet.max_col()) {
                let Some(text) = sheet.text_at(row, col) else {
                    continue;
                };
                let trimmed = text.trim();
                let upper = trimmed.to_uppercase();

                if descriptor.total_text_column.is_none()
                    && TOTAL_LABELS.iter().any(|label| upper.contains(label))
                {
                    descriptor.total_text_column = Some(col + 1);
                    descriptor.total_text_value = Some(trimmed.to_string());
                }

                if descriptor.pallet_count_column.is_none()
                    && self.count_patterns.iter().any(|re| re.is_match(&upper))
                {
                    descriptor.pallet_count_column = Some(col + 1);
                    descriptor.pallet_count_value = Some(trimmed.to_string());
                }
            }
        }

        // Only merges anchored on the footer row; cross-row merges are
        // ambiguous and ignored
        for merge in sheet.merges_starting_on_row(row0) {
            descriptor.merged_cells.insert(
                merge.start_col + 1,
                FooterMerge {
                    colspan: merge.colspan(),
                    rowspan: merge.rowspan(),
                    start_row: merge.start_row + 1,
                    end_row: merge.end_row + 1,
                },
            );
        }

        descriptor
    }
}
