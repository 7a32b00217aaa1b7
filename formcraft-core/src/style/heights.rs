//! Row height extraction and font-based estimation

use serde::{Deserialize, Serialize};

use crate::reader::Sheet;
use crate::scanner::FontSpec;

const HEADER_RANGE: (f64, f64) = (10.0, 80.0);
const DATA_RANGE: (f64, f64) = (10.0, 60.0);
const FOOTER_RANGE: (f64, f64) = (10.0, 70.0);
const BEFORE_FOOTER_RANGE: (f64, f64) = (10.0, 60.0);

/// Row heights written into a sheet configuration, in points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowHeights {
    pub header: f64,
    pub data_default: f64,
    pub footer: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_footer: Option<f64>,
}

impl RowHeights {
    /// Heights for one sheet. Rows are 1-based; `footer_row` is None when no
    /// footer was found, in which case the footer height is estimated anyway
    /// so the configuration stays complete.
    pub fn extract(
        sheet: &Sheet,
        header_row: u32,
        start_row: u32,
        footer_row: Option<u32>,
        header_font: &FontSpec,
        data_font: &FontSpec,
    ) -> Self {
        let header = actual_or(sheet, header_row, estimate_header(header_font.size));
        let data_default = actual_or(sheet, start_row, estimate_data(data_font.size));
        let footer = match footer_row {
            Some(row) => actual_or(sheet, row, estimate_footer(data_font.size)),
            None => clamp(estimate_footer(data_font.size), FOOTER_RANGE),
        };

        Self {
            header: clamp(header, HEADER_RANGE),
            data_default: clamp(data_default, DATA_RANGE),
            footer: clamp(footer, FOOTER_RANGE),
            before_footer: None,
        }
    }

    /// Height of the row just above the footer, defaulting to the data height
    pub fn with_before_footer(mut self, sheet: &Sheet, footer_row: Option<u32>) -> Self {
        let height = footer_row
            .and_then(|row| row.checked_sub(2))
            .and_then(|row0| sheet.row_heights.get(&row0).copied())
            .unwrap_or(self.data_default);
        self.before_footer = Some(clamp(height, BEFORE_FOOTER_RANGE));
        self
    }
}

fn actual_or(sheet: &Sheet, row_1based: u32, estimate: f64) -> f64 {
    sheet
        .row_heights
        .get(&(row_1based - 1))
        .copied()
        .unwrap_or(estimate)
}

fn estimate_header(font_size: f64) -> f64 {
    (font_size * 1.8).max(25.0)
}

fn estimate_data(font_size: f64) -> f64 {
    (font_size * 1.6).max(20.0)
}

fn estimate_footer(font_size: f64) -> f64 {
    (font_size * 2.0).max(30.0)
}

fn clamp(value: f64, (lo, hi): (f64, f64)) -> f64 {
    value.clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font(size: f64) -> FontSpec {
        FontSpec {
            name: "Times New Roman".to_string(),
            size,
        }
    }

    fn sheet_with_heights(pairs: &[(u32, f64)]) -> Sheet {
        let mut sheet = Sheet {
            name: "Invoice".to_string(),
            ..Sheet::default()
        };
        for (row, h) in pairs {
            sheet.row_heights.insert(*row, *h);
        }
        sheet
    }

    #[test]
    fn test_actual_heights_win() {
        // Heights stored 0-based; rows passed 1-based
        let sheet = sheet_with_heights(&[(9, 42.0), (11, 18.5), (30, 35.0)]);
        let heights = RowHeights::extract(&sheet, 10, 12, Some(31), &font(12.0), &font(10.0));
        assert_eq!(heights.header, 42.0);
        assert_eq!(heights.data_default, 18.5);
        assert_eq!(heights.footer, 35.0);
    }

    #[test]
    fn test_font_estimates_with_minimums() {
        let sheet = sheet_with_heights(&[]);
        let heights = RowHeights::extract(&sheet, 10, 12, None, &font(12.0), &font(10.0));
        // 12 * 1.8 = 21.6, below the 25pt floor
        assert_eq!(heights.header, 25.0);
        // 10 * 1.6 = 16, below the 20pt floor
        assert_eq!(heights.data_default, 20.0);
        // 10 * 2.0 = 20, below the 30pt floor
        assert_eq!(heights.footer, 30.0);
    }

    #[test]
    fn test_large_font_estimate() {
        let sheet = sheet_with_heights(&[]);
        let heights = RowHeights::extract(&sheet, 10, 12, None, &font(20.0), &font(18.0));
        assert_eq!(heights.header, 36.0);
        assert!((heights.data_default - 28.8).abs() < 1e-9);
        assert_eq!(heights.footer, 36.0);
    }

    #[test]
    fn test_clamping() {
        let sheet = sheet_with_heights(&[(9, 120.0), (11, 4.0)]);
        let heights = RowHeights::extract(&sheet, 10, 12, None, &font(12.0), &font(12.0));
        assert_eq!(heights.header, 80.0);
        assert_eq!(heights.data_default, 10.0);
    }

    #[test]
    fn test_before_footer_defaults_to_data_height() {
        let sheet = sheet_with_heights(&[]);
        let heights = RowHeights::extract(&sheet, 10, 12, Some(31), &font(12.0), &font(12.0))
            .with_before_footer(&sheet, Some(31));
        assert_eq!(heights.before_footer, Some(heights.data_default));
    }

    #[test]
    fn test_before_footer_actual_height() {
        // Row 30 (1-based) is one above the footer at 31; stored 0-based as 29
        let sheet = sheet_with_heights(&[(29, 44.0)]);
        let heights = RowHeights::extract(&sheet, 10, 12, Some(31), &font(12.0), &font(12.0))
            .with_before_footer(&sheet, Some(31));
        assert_eq!(heights.before_footer, Some(44.0));
    }
}
