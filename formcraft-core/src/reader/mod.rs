//! Workbook reader built on calamine plus a raw-XML pass
//!
//! Calamine supplies calculated values and formulas. For xlsx input the same
//! file is reopened as a zip archive so merged ranges, row heights, hidden
//! rows/columns, number formats, fonts and alignments can be lifted from the
//! underlying XML. Other formats load values and formulas only; downstream
//! steps fall back to their defaults for the missing style facts.

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use std::collections::HashMap;
use std::path::Path;

pub mod workbook;
pub mod xml_parser;

pub use workbook::{Cell, CellAlignment, CellFont, CellValue, MergedRange, Sheet, Workbook};

/// Read a workbook from a file path
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path = path.as_ref();
    let mut excel: Sheets<_> = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let is_xlsx = matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("xlsx") | Some("xlsm")
    );

    let mut archive = if is_xlsx {
        use std::fs::File;
        use std::io::BufReader;
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let reader = BufReader::new(file);
        Some(zip::ZipArchive::new(reader)?)
    } else {
        None
    };

    let styles = if let Some(ref mut archive_ref) = archive {
        xml_parser::parse_styles(archive_ref).unwrap_or_default()
    } else {
        xml_parser::StyleTables::default()
    };

    let sheet_names = excel.sheet_names();
    let mut sheets = Vec::new();

    for (index, sheet_name) in sheet_names.iter().enumerate() {
        let range = excel.worksheet_range(sheet_name).ok();

        let (formula_range, formula_error) = match excel.worksheet_formula(sheet_name) {
            Ok(range) => (Some(range), None),
            Err(e) => (None, Some(format!("{:?}", e))),
        };

        let mut sheet = parse_sheet(
            sheet_name,
            range.as_ref(),
            formula_range.as_ref(),
            formula_error,
        );

        if let Some(ref mut archive_ref) = archive {
            if let Ok(facts) = xml_parser::extract_sheet_facts(archive_ref, index) {
                sheet.merged_cells = facts.merged_cells;
                sheet.row_heights = facts.row_heights;
                sheet.hidden_rows = facts.hidden_rows;
                sheet.hidden_columns = facts.hidden_columns;

                if !styles.is_empty() {
                    apply_styles(&mut sheet, &facts.cell_styles, &styles);
                }
            }
        }

        sheets.push(sheet);
    }

    let hidden_sheets = if let Some(ref mut archive_ref) = archive {
        xml_parser::extract_hidden_sheets(archive_ref)?
    } else {
        Vec::new()
    };

    Ok(Workbook {
        path: path.to_path_buf(),
        sheets,
        hidden_sheets,
    })
}

fn apply_styles(
    sheet: &mut Sheet,
    cell_styles: &HashMap<(u32, u32), usize>,
    styles: &xml_parser::StyleTables,
) {
    for (&(row, col), &style_idx) in cell_styles {
        if let Some(cell) = sheet.cells.get_mut(&(row, col)) {
            if let Some(fmt) = styles.num_fmts.get(style_idx) {
                cell.num_fmt = Some(fmt.clone());
            }
            if let Some(font) = styles.fonts.get(style_idx) {
                cell.font = font.clone();
            }
            if let Some(alignment) = styles.alignments.get(style_idx) {
                cell.alignment = alignment.clone();
            }
        }
    }
}

fn parse_sheet(
    name: &str,
    range: Option<&Range<Data>>,
    formula_range: Option<&Range<String>>,
    formula_parsing_error: Option<String>,
) -> Sheet {
    let mut cells = HashMap::new();

    let (r_start, r_end) = if let Some(r) = range {
        (r.start().unwrap_or((0, 0)), r.end().unwrap_or((0, 0)))
    } else {
        ((u32::MAX, u32::MAX), (0, 0))
    };

    let (f_start, f_end) = if let Some(f) = formula_range {
        (f.start().unwrap_or((0, 0)), f.end().unwrap_or((0, 0)))
    } else {
        ((u32::MAX, u32::MAX), (0, 0))
    };

    // Bounding box over values and formulas together
    let min_row = r_start.0.min(f_start.0);
    let min_col = r_start.1.min(f_start.1);
    let max_row = r_end.0.max(f_end.0);
    let max_col = r_end.1.max(f_end.1);

    if min_row > max_row || min_col > max_col {
        return Sheet {
            name: name.to_string(),
            formula_parsing_error,
            ..Sheet::default()
        };
    }

    for row in min_row..=max_row {
        for col in min_col..=max_col {
            let mut cell_value = None;
            let mut formula = None;

            if let Some(r) = range {
                let (r_rows, r_cols) = r.get_size();
                if row >= r_start.0
                    && row < r_start.0 + r_rows as u32
                    && col >= r_start.1
                    && col < r_start.1 + r_cols as u32
                {
                    let rel_row = (row - r_start.0) as usize;
                    let rel_col = (col - r_start.1) as usize;

                    if let Some(cell_data) = r.get((rel_row, rel_col)) {
                        if !matches!(cell_data, Data::Empty) {
                            cell_value = Some(parse_cell_value(cell_data));
                        }
                    }
                }
            }

            if let Some(f) = formula_range {
                let (f_rows, f_cols) = f.get_size();
                if row >= f_start.0
                    && row < f_start.0 + f_rows as u32
                    && col >= f_start.1
                    && col < f_start.1 + f_cols as u32
                {
                    let rel_row = (row - f_start.0) as usize;
                    let rel_col = (col - f_start.1) as usize;

                    if let Some(formula_str) = f.get((rel_row, rel_col)) {
                        if !formula_str.is_empty() {
                            formula = Some(formula_str.clone());
                        }
                    }
                }
            }

            if cell_value.is_some() || formula.is_some() {
                let cell = Cell {
                    row,
                    col,
                    value: cell_value.unwrap_or(CellValue::Empty),
                    formula,
                    num_fmt: None,
                    font: None,
                    alignment: None,
                };
                cells.insert((row, col), cell);
            }
        }
    }

    Sheet {
        name: name.to_string(),
        cells,
        used_range: Some((max_row + 1, max_col + 1)),
        formula_parsing_error,
        ..Sheet::default()
    }
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
