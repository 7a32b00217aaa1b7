//! Summary toggle: a marker phrase in the sheet body enables the summary block

use super::{body_contains, HeuristicContext, HeuristicRule, SheetProfile};
use crate::artifact::SheetConfiguration;
use crate::events::{EventLog, EventScope};

pub struct SummaryText;

impl HeuristicRule for SummaryText {
    fn id(&self) -> &'static str {
        "summary-text"
    }

    fn name(&self) -> &'static str {
        "Summary block toggle"
    }

    fn applies(&self, ctx: &HeuristicContext) -> bool {
        ctx.profile == SheetProfile::PackingList
    }

    fn apply(&self, ctx: &HeuristicContext, config: &mut SheetConfiguration, events: &mut EventLog) {
        let pattern = ctx.config.summary_pattern();
        if body_contains(ctx.sheet, ctx.facts.start_row - 1, &pattern) {
            config.summary_enabled = Some(true);
            events.info(
                "heuristics",
                EventScope::Sheet(ctx.sheet.name.clone()),
                format!("summary marker '{}' found, summary enabled", pattern),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolConfig;
    use crate::reader::workbook::{Cell, CellValue};
    use crate::reader::Sheet;
    use crate::scanner::{FontSpec, WorksheetFacts};
    use crate::style::RowHeights;
    use std::collections::BTreeMap;

    fn sheet_with_text(row: u32, col: u32, text: &str) -> Sheet {
        let mut sheet = Sheet {
            name: "Packing list".to_string(),
            used_range: Some((row + 1, col + 1)),
            ..Sheet::default()
        };
        sheet.cells.insert(
            (row, col),
            Cell {
                row,
                col,
                value: CellValue::Text(text.to_string()),
                formula: None,
                num_fmt: None,
                font: None,
                alignment: None,
            },
        );
        sheet
    }

    fn facts() -> WorksheetFacts {
        let font = FontSpec {
            name: "Times New Roman".to_string(),
            size: 12.0,
        };
        WorksheetFacts {
            sheet_name: "Packing list".to_string(),
            header_cells: Vec::new(),
            header_font: font.clone(),
            data_font: font,
            start_row: 12,
            header_row_count: 1,
        }
    }

    fn empty_config() -> SheetConfiguration {
        SheetConfiguration {
            start_row: 12,
            header_to_write: Vec::new(),
            data_cell_merging_rule: BTreeMap::new(),
            footer_configurations: Default::default(),
            styling: crate::artifact::Styling {
                column_id_styles: BTreeMap::new(),
                row_heights: RowHeights {
                    header: 25.0,
                    data_default: 20.0,
                    footer: 30.0,
                    before_footer: None,
                },
            },
            summary_enabled: None,
            weight_summary_enabled: None,
            description_fallback: None,
        }
    }

    #[test]
    fn test_marker_in_body_enables_summary() {
        let sheet = sheet_with_text(20, 1, "WATER BUFFALO LEATHER");
        let facts = facts();
        let config = ToolConfig::default();
        let columns = Vec::new();
        let ctx = HeuristicContext {
            sheet: &sheet,
            profile: SheetProfile::PackingList,
            facts: &facts,
            footer: None,
            columns: &columns,
            config: &config,
        };
        let mut cfg = empty_config();
        let mut events = EventLog::new();
        SummaryText.apply(&ctx, &mut cfg, &mut events);
        assert_eq!(cfg.summary_enabled, Some(true));
    }

    #[test]
    fn test_marker_above_start_row_ignored() {
        let sheet = sheet_with_text(5, 1, "buffalo");
        let facts = facts();
        let config = ToolConfig::default();
        let columns = Vec::new();
        let ctx = HeuristicContext {
            sheet: &sheet,
            profile: SheetProfile::PackingList,
            facts: &facts,
            footer: None,
            columns: &columns,
            config: &config,
        };
        let mut cfg = empty_config();
        let mut events = EventLog::new();
        SummaryText.apply(&ctx, &mut cfg, &mut events);
        assert_eq!(cfg.summary_enabled, None);
    }
}
