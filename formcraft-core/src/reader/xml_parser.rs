//! Raw XML extraction for facts calamine does not expose
//!
//! The xlsx archive is opened a second time as a zip and walked with
//! quick-xml: merged ranges, explicit row heights, hidden rows/columns and
//! per-cell style indices come from the sheet XML; number formats, fonts and
//! alignments come from `xl/styles.xml`.

use anyhow::Result;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::BufReader;
use zip::ZipArchive;

use super::workbook::{CellAlignment, CellFont, MergedRange};

/// Style facts resolved per cell-format record (`xf`), in order
#[derive(Debug, Default)]
pub struct StyleTables {
    pub num_fmts: Vec<String>,
    pub fonts: Vec<Option<CellFont>>,
    pub alignments: Vec<Option<CellAlignment>>,
}

impl StyleTables {
    pub fn is_empty(&self) -> bool {
        self.num_fmts.is_empty()
    }
}

/// Per-sheet facts gathered in a single pass over the sheet XML
#[derive(Debug, Default)]
pub struct SheetXmlFacts {
    pub merged_cells: Vec<MergedRange>,
    /// 0-based row -> explicit height in points
    pub row_heights: HashMap<u32, f64>,
    pub hidden_rows: Vec<u32>,
    pub hidden_columns: Vec<u32>,
    /// (row, col) -> xf index
    pub cell_styles: HashMap<(u32, u32), usize>,
}

/// Extract sheet names whose state is hidden or veryHidden
pub fn extract_hidden_sheets(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
) -> Result<Vec<String>> {
    let mut hidden_sheets = Vec::new();

    let workbook_xml = match archive.by_name("xl/workbook.xml") {
        Ok(file) => file,
        Err(_) => return Ok(hidden_sheets),
    };

    let buf_reader = BufReader::new(workbook_xml);
    let mut reader = Reader::from_reader(buf_reader);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_sheets = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"sheets" => in_sheets = true,
                b"sheet" if in_sheets => {
                    let mut name = String::new();
                    let mut state = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = String::from_utf8_lossy(&attr.value).to_string();
                            }
                            b"state" => {
                                state = String::from_utf8_lossy(&attr.value).to_string();
                            }
                            _ => {}
                        }
                    }
                    if !name.is_empty() && (state == "hidden" || state == "veryHidden") {
                        hidden_sheets.push(name);
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"sheets" {
                    in_sheets = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(hidden_sheets)
}

/// Walk one worksheet's XML and gather merges, heights, hidden ranges and
/// per-cell style indices
pub fn extract_sheet_facts(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
    sheet_index: usize,
) -> Result<SheetXmlFacts> {
    let mut facts = SheetXmlFacts::default();

    // Sheet files are named sheet1.xml, sheet2.xml, etc. (1-indexed)
    let sheet_path = format!("xl/worksheets/sheet{}.xml", sheet_index + 1);
    let sheet_xml = match archive.by_name(&sheet_path) {
        Ok(file) => file,
        Err(_) => return Ok(facts),
    };

    let buf_reader = BufReader::new(sheet_xml);
    let mut reader = Reader::from_reader(buf_reader);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"col" => {
                    let mut min_col = 0u32;
                    let mut max_col = 0u32;
                    let mut hidden = false;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"min" => {
                                if let Ok(val) = String::from_utf8_lossy(&attr.value).parse::<u32>()
                                {
                                    min_col = val.saturating_sub(1);
                                }
                            }
                            b"max" => {
                                if let Ok(val) = String::from_utf8_lossy(&attr.value).parse::<u32>()
                                {
                                    max_col = val.saturating_sub(1);
                                }
                            }
                            b"hidden" => {
                                let v = String::from_utf8_lossy(&attr.value);
                                hidden = v == "1" || v.to_lowercase() == "true";
                            }
                            _ => {}
                        }
                    }
                    if hidden {
                        for col in min_col..=max_col {
                            facts.hidden_columns.push(col);
                        }
                    }
                }
                b"row" => {
                    let mut row_num = 0u32;
                    let mut hidden = false;
                    let mut height = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"r" => {
                                if let Ok(val) = String::from_utf8_lossy(&attr.value).parse::<u32>()
                                {
                                    row_num = val.saturating_sub(1);
                                }
                            }
                            b"hidden" => {
                                let v = String::from_utf8_lossy(&attr.value);
                                hidden = v == "1" || v.to_lowercase() == "true";
                            }
                            b"ht" => {
                                height = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                            }
                            _ => {}
                        }
                    }
                    if hidden {
                        facts.hidden_rows.push(row_num);
                    }
                    if let Some(ht) = height {
                        facts.row_heights.insert(row_num, ht);
                    }
                }
                b"c" => {
                    let mut row = 0u32;
                    let mut col = 0u32;
                    let mut style_index = 0usize;
                    let mut has_style = false;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"r" => {
                                let r_str = String::from_utf8_lossy(&attr.value);
                                if let Some((r, c)) = parse_cell_ref(&r_str) {
                                    row = r;
                                    col = c;
                                }
                            }
                            b"s" => {
                                if let Ok(val) =
                                    String::from_utf8_lossy(&attr.value).parse::<usize>()
                                {
                                    style_index = val;
                                    has_style = true;
                                }
                            }
                            _ => {}
                        }
                    }
                    if has_style {
                        facts.cell_styles.insert((row, col), style_index);
                    }
                }
                b"mergeCell" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"ref" {
                            let ref_str = String::from_utf8_lossy(&attr.value);
                            if let Some(range) = parse_cell_range(&ref_str) {
                                facts.merged_cells.push(range);
                            }
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(facts)
}

/// Parse `xl/styles.xml` into per-xf number formats, fonts and alignments
pub fn parse_styles(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
) -> Result<StyleTables> {
    let mut num_fmts = builtin_num_fmts();

    let styles_xml = match archive.by_name("xl/styles.xml") {
        Ok(file) => file,
        Err(_) => return Ok(StyleTables::default()),
    };

    let buf_reader = BufReader::new(styles_xml);
    let mut reader = Reader::from_reader(buf_reader);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut tables = StyleTables::default();
    let mut fonts: Vec<CellFont> = Vec::new();

    let mut in_fonts = false;
    let mut in_cell_xfs = false;
    let mut current_font: Option<CellFont> = None;
    // Alignment lives in a child element of the open xf
    let mut open_xf = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                match e.name().as_ref() {
                    b"fonts" => in_fonts = true,
                    b"font" if in_fonts => {
                        current_font = Some(CellFont {
                            name: String::new(),
                            size: 0.0,
                        });
                    }
                    b"name" if in_fonts => {
                        if let Some(font) = current_font.as_mut() {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"val" {
                                    font.name = String::from_utf8_lossy(&attr.value).to_string();
                                }
                            }
                        }
                    }
                    b"sz" if in_fonts => {
                        if let Some(font) = current_font.as_mut() {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"val" {
                                    if let Ok(val) =
                                        String::from_utf8_lossy(&attr.value).parse::<f64>()
                                    {
                                        font.size = val;
                                    }
                                }
                            }
                        }
                    }
                    b"numFmt" => {
                        let mut id = 0u32;
                        let mut code = String::new();
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"numFmtId" => {
                                    if let Ok(val) =
                                        String::from_utf8_lossy(&attr.value).parse::<u32>()
                                    {
                                        id = val;
                                    }
                                }
                                b"formatCode" => {
                                    code = attr.unescape_value().unwrap_or_default().into();
                                }
                                _ => {}
                            }
                        }
                        if !code.is_empty() {
                            num_fmts.insert(id, code);
                        }
                    }
                    b"cellXfs" => in_cell_xfs = true,
                    b"xf" if in_cell_xfs => {
                        let mut num_fmt_id = 0u32;
                        let mut font_id = 0usize;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"numFmtId" => {
                                    if let Ok(val) =
                                        String::from_utf8_lossy(&attr.value).parse::<u32>()
                                    {
                                        num_fmt_id = val;
                                    }
                                }
                                b"fontId" => {
                                    if let Ok(val) =
                                        String::from_utf8_lossy(&attr.value).parse::<usize>()
                                    {
                                        font_id = val;
                                    }
                                }
                                _ => {}
                            }
                        }
                        let format_code = num_fmts
                            .get(&num_fmt_id)
                            .cloned()
                            .unwrap_or_else(|| "General".to_string());
                        tables.num_fmts.push(format_code);
                        tables.fonts.push(fonts.get(font_id).cloned());
                        tables.alignments.push(None);
                        open_xf = true;
                    }
                    b"alignment" if in_cell_xfs && open_xf => {
                        let mut alignment = CellAlignment::default();
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"horizontal" => {
                                    alignment.horizontal =
                                        Some(String::from_utf8_lossy(&attr.value).to_string());
                                }
                                b"vertical" => {
                                    alignment.vertical =
                                        Some(String::from_utf8_lossy(&attr.value).to_string());
                                }
                                _ => {}
                            }
                        }
                        if !alignment.is_empty() {
                            if let Some(slot) = tables.alignments.last_mut() {
                                *slot = Some(alignment);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"fonts" => in_fonts = false,
                b"font" if in_fonts => {
                    if let Some(mut font) = current_font.take() {
                        if font.name.is_empty() {
                            font.name = "Calibri".to_string();
                        }
                        if font.size == 0.0 {
                            font.size = 11.0;
                        }
                        fonts.push(font);
                    }
                }
                b"cellXfs" => in_cell_xfs = false,
                b"xf" => open_xf = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(tables)
}

/// Built-in number formats (simplified subset)
fn builtin_num_fmts() -> HashMap<u32, String> {
    let mut num_fmts = HashMap::new();
    num_fmts.insert(0, "General".to_string());
    num_fmts.insert(1, "0".to_string());
    num_fmts.insert(2, "0.00".to_string());
    num_fmts.insert(3, "#,##0".to_string());
    num_fmts.insert(4, "#,##0.00".to_string());
    num_fmts.insert(9, "0%".to_string());
    num_fmts.insert(10, "0.00%".to_string());
    num_fmts.insert(11, "0.00E+00".to_string());
    num_fmts.insert(12, "# ?/?".to_string());
    num_fmts.insert(13, "# ??/??".to_string());
    num_fmts.insert(14, "mm-dd-yy".to_string());
    num_fmts.insert(15, "d-mmm-yy".to_string());
    num_fmts.insert(16, "d-mmm".to_string());
    num_fmts.insert(17, "mmm-yy".to_string());
    num_fmts.insert(18, "h:mm AM/PM".to_string());
    num_fmts.insert(19, "h:mm:ss AM/PM".to_string());
    num_fmts.insert(20, "h:mm".to_string());
    num_fmts.insert(21, "h:mm:ss".to_string());
    num_fmts.insert(22, "m/d/yy h:mm".to_string());
    num_fmts.insert(37, "#,##0 ;(#,##0)".to_string());
    num_fmts.insert(38, "#,##0 ;[Red](#,##0)".to_string());
    num_fmts.insert(39, "#,##0.00;(#,##0.00)".to_string());
    num_fmts.insert(40, "#,##0.00;[Red](#,##0.00)".to_string());
    num_fmts.insert(45, "mm:ss".to_string());
    num_fmts.insert(46, "[h]:mm:ss".to_string());
    num_fmts.insert(47, "mmss.0".to_string());
    num_fmts.insert(48, "##0.0E+0".to_string());
    num_fmts.insert(49, "@".to_string());
    num_fmts
}

/// Parse a cell range like "A1:B2" into a 0-based merged range
pub fn parse_cell_range(range: &str) -> Option<MergedRange> {
    let parts: Vec<&str> = range.split(':').collect();
    if parts.len() != 2 {
        return None;
    }

    let (start_row, start_col) = parse_cell_ref(parts[0])?;
    let (end_row, end_col) = parse_cell_ref(parts[1])?;

    Some(MergedRange {
        start_row,
        start_col,
        end_row,
        end_col,
    })
}

/// Parse a cell reference like "A1" into (row, col) as 0-based indices
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let mut col = 0u32;
    let mut row_str = String::new();

    for ch in cell_ref.chars() {
        if ch.is_ascii_alphabetic() {
            col = col * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        } else if ch.is_ascii_digit() {
            row_str.push(ch);
        }
    }

    if row_str.is_empty() {
        return None;
    }

    let row = row_str.parse::<u32>().ok()?;

    Some((row.saturating_sub(1), col.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("B2"), Some((1, 1)));
        assert_eq!(parse_cell_ref("AA10"), Some((9, 26)));
        assert_eq!(parse_cell_ref(""), None);
    }

    #[test]
    fn test_parse_cell_range() {
        let range = parse_cell_range("A1:C1").unwrap();
        assert_eq!(range.start_row, 0);
        assert_eq!(range.start_col, 0);
        assert_eq!(range.end_row, 0);
        assert_eq!(range.end_col, 2);
        assert_eq!(range.colspan(), 3);
        assert_eq!(range.rowspan(), 1);
        assert_eq!(parse_cell_range("A1"), None);
    }
}
