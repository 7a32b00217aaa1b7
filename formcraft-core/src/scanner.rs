//! Structural scanning: header row, header cells, fonts, start row

use crate::config::ToolConfig;
use crate::error::AnalyzeError;
use crate::events::{CellReference, EventLog, EventScope};
use crate::mapping::matcher::char_similarity;
use crate::reader::Sheet;
use regex::Regex;

/// Default keyword vocabulary for header detection
const HEADER_KEYWORDS: &[&str] = &[
    "ITEM",
    "DESCRIPTION",
    "QUANTITY",
    "QTY",
    "PRICE",
    "UNIT PRICE",
    "AMOUNT",
    "P.O",
    "PALLET",
    "MARK",
    "PCS",
    "SF",
    "N.W",
    "G.W",
    "CBM",
    "HS CODE",
    "CTNS",
];

/// Tokens that mark a second header row beneath the main one
const SUB_HEADER_TOKENS: &[&str] = &["PCS", "SF", "KGS", "USD", "UNIT", "QTY"];

/// Words that disqualify a cell from being a header
const AGGREGATE_WORDS: &[&str] = &["TOTAL", "SUBTOTAL"];

/// A header cell as found in the source sheet (1-based coordinates)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub keyword: String,
    pub row: u32,
    pub column: u32,
}

/// Font name and size used for one role (header or data)
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub name: String,
    pub size: f64,
}

/// Everything the scanner learns about one worksheet
#[derive(Debug, Clone)]
pub struct WorksheetFacts {
    pub sheet_name: String,
    /// Ordered by (row, column), 1-based
    pub header_cells: Vec<HeaderCell>,
    pub header_font: FontSpec,
    pub data_font: FontSpec,
    /// First data row, 1-based, always > 0
    pub start_row: u32,
    /// 1 or 2 depending on sub-header detection
    pub header_row_count: u32,
}

impl WorksheetFacts {
    /// 1-based row of the main header line
    pub fn header_row(&self) -> u32 {
        self.header_cells.first().map(|c| c.row).unwrap_or(1)
    }
}

/// Scans a worksheet for its header block and representative fonts
pub struct StructuralScanner {
    keywords: Vec<String>,
    search_window: u32,
    similarity_threshold: f64,
    default_font: FontSpec,
    currency_re: Regex,
    date_re: Regex,
}

impl StructuralScanner {
    pub fn new(config: &ToolConfig) -> Self {
        let keywords = config
            .header_keywords()
            .unwrap_or_else(|| HEADER_KEYWORDS.iter().map(|k| k.to_string()).collect());
        Self {
            keywords,
            search_window: config.header_search_window(),
            similarity_threshold: config.keyword_similarity(),
            default_font: FontSpec {
                name: config.default_font_name(),
                size: config.default_font_size(),
            },
            currency_re: Regex::new(r"^[\$€¥£]\s*[\d,.]+$").unwrap(),
            date_re: Regex::new(r"^\d{1,4}[-/.]\d{1,2}[-/.]\d{1,4}$").unwrap(),
        }
    }

    /// Scan one sheet, producing header facts or `MissingHeaderRow`
    pub fn scan(&self, sheet: &Sheet, events: &mut EventLog) -> Result<WorksheetFacts, AnalyzeError> {
        let header_row = self.find_header_row(sheet).ok_or_else(|| {
            AnalyzeError::MissingHeaderRow {
                sheet: sheet.name.clone(),
                window: self.search_window,
            }
        })?;

        let mut header_cells = self.collect_header_cells(sheet, header_row);
        let header_row_count = self.detect_header_row_count(sheet, header_row, &header_cells);
        if header_row_count == 2 {
            header_cells.extend(self.collect_sub_header_cells(sheet, header_row + 1));
        }
        header_cells.sort_by_key(|c| (c.row, c.column));

        events.push(
            crate::events::InferenceEvent::new(
                "scanner",
                EventScope::Sheet(sheet.name.clone()),
                format!(
                    "header row {} with {} header cells",
                    header_row + 1,
                    header_cells.len()
                ),
                crate::events::EventLevel::Info,
            )
            .with_context("header_row_count", header_row_count.to_string()),
        );

        let start_row = self.find_start_row(sheet, header_row, header_row_count);
        let (header_font, data_font) = self.extract_fonts(sheet, &header_cells, events);

        Ok(WorksheetFacts {
            sheet_name: sheet.name.clone(),
            header_cells,
            header_font,
            data_font,
            start_row,
            header_row_count,
        })
    }

    /// First row in the window with at least 2 keyword matches and 3 text cells
    fn find_header_row(&self, sheet: &Sheet) -> Option<u32> {
        let last_row = sheet.max_row().min(self.search_window);
        for row in 0..last_row {
            let mut keyword_matches = 0usize;
            let mut text_cells = 0usize;
            for col in 0..sheet.max_col() {
                if let Some(text) = sheet.text_at(row, col) {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    text_cells += 1;
                    if !self.looks_like_data(trimmed) && self.matches_keyword(trimmed) {
                        keyword_matches += 1;
                    }
                }
            }
            if keyword_matches >= 2 && text_cells >= 3 {
                return Some(row);
            }
        }
        None
    }

    fn collect_header_cells(&self, sheet: &Sheet, header_row: u32) -> Vec<HeaderCell> {
        let mut cells = Vec::new();
        for col in 0..sheet.max_col() {
            if let Some(text) = sheet.text_at(header_row, col) {
                let trimmed = text.trim();
                if !trimmed.is_empty() && !self.looks_like_data(trimmed) {
                    cells.push(HeaderCell {
                        keyword: trimmed.to_string(),
                        row: header_row + 1,
                        column: col + 1,
                    });
                }
            }
        }
        cells
    }

    fn collect_sub_header_cells(&self, sheet: &Sheet, sub_row: u32) -> Vec<HeaderCell> {
        let mut cells = Vec::new();
        for col in 0..sheet.max_col() {
            if let Some(text) = sheet.text_at(sub_row, col) {
                let trimmed = text.trim();
                if !trimmed.is_empty() && !self.looks_like_data(trimmed) {
                    cells.push(HeaderCell {
                        keyword: trimmed.to_string(),
                        row: sub_row + 1,
                        column: col + 1,
                    });
                }
            }
        }
        cells
    }

    /// The row under the header is a second header row when it carries known
    /// sub-header tokens or at least two further text cells
    fn detect_header_row_count(
        &self,
        sheet: &Sheet,
        header_row: u32,
        header_cells: &[HeaderCell],
    ) -> u32 {
        if header_cells.is_empty() {
            return 1;
        }
        let below = header_row + 1;
        let mut text_cells = 0usize;
        for col in 0..sheet.max_col() {
            if let Some(text) = sheet.text_at(below, col) {
                let trimmed = text.trim();
                if trimmed.is_empty() || self.looks_like_data(trimmed) {
                    continue;
                }
                let upper = trimmed.to_uppercase();
                if SUB_HEADER_TOKENS.iter().any(|t| upper == *t) {
                    return 2;
                }
                text_cells += 1;
            }
        }
        if text_cells >= 2 { 2 } else { 1 }
    }

    /// First row after the header block with any content, 1-based
    fn find_start_row(&self, sheet: &Sheet, header_row: u32, header_row_count: u32) -> u32 {
        let first_candidate = header_row + header_row_count;
        for row in first_candidate..sheet.max_row() {
            let has_content = (0..sheet.max_col()).any(|col| {
                sheet
                    .cell(row, col)
                    .map(|c| !c.value.is_empty() || c.formula.is_some())
                    .unwrap_or(false)
            });
            if has_content {
                return row + 1;
            }
        }
        first_candidate + 1
    }

    /// Fonts from the first header cell and the cell two rows beneath it
    fn extract_fonts(
        &self,
        sheet: &Sheet,
        header_cells: &[HeaderCell],
        events: &mut EventLog,
    ) -> (FontSpec, FontSpec) {
        let Some(first) = header_cells.first() else {
            return (self.default_font.clone(), self.default_font.clone());
        };
        let header_row = first.row - 1;
        let col = first.column - 1;

        let header_font = self.font_at(sheet, header_row, col, events);
        let data_font = self.font_at(sheet, header_row + 2, col, events);

        if header_font.is_none() {
            events.warn(
                "scanner",
                EventScope::Cell(sheet.name.clone(), CellReference::new(header_row, col)),
                format!(
                    "no explicit header font, defaulting to {} {}pt",
                    self.default_font.name, self.default_font.size
                ),
            );
        }

        (
            header_font.unwrap_or_else(|| self.default_font.clone()),
            data_font.unwrap_or_else(|| self.default_font.clone()),
        )
    }

    /// Font attached to a cell; present-but-unreadable font data is reported
    /// and treated as absent
    fn font_at(&self, sheet: &Sheet, row: u32, col: u32, events: &mut EventLog) -> Option<FontSpec> {
        let font = sheet.cell(row, col).and_then(|c| c.font.as_ref())?;
        if font.name.is_empty() || font.size <= 0.0 {
            let err = AnalyzeError::InvalidFontData {
                sheet: sheet.name.clone(),
                cell: CellReference::new(row, col).to_excel_ref(),
            };
            events.warn(
                "scanner",
                EventScope::Cell(sheet.name.clone(), CellReference::new(row, col)),
                err.to_string(),
            );
            return None;
        }
        Some(FontSpec {
            name: font.name.clone(),
            size: font.size,
        })
    }

    fn matches_keyword(&self, text: &str) -> bool {
        let upper = text.to_uppercase();
        self.keywords.iter().any(|kw| {
            let kw_upper = kw.to_uppercase();
            upper == kw_upper
                || upper.split_whitespace().any(|word| word == kw_upper)
                || upper.contains(&kw_upper)
                || char_similarity(&upper, &kw_upper) >= self.similarity_threshold
        })
    }

    /// Reject cells that read like data rather than labels
    fn looks_like_data(&self, text: &str) -> bool {
        let cleaned = text.replace(',', "");
        if cleaned.trim().parse::<f64>().is_ok() {
            return true;
        }
        if self.currency_re.is_match(text.trim()) {
            return true;
        }
        if self.date_re.is_match(text.trim()) {
            return true;
        }
        let upper = text.to_uppercase();
        AGGREGATE_WORDS.iter().any(|w| upper.contains(w))
    }
}
