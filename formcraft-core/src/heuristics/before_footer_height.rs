//! Before-footer row height for packing-list sheets

use super::{HeuristicContext, HeuristicRule, SheetProfile};
use crate::artifact::SheetConfiguration;
use crate::events::{EventLog, EventScope};

/// Packing lists carry a visually distinct row just above the footer; its
/// height is recorded so the writer can reproduce it.
pub struct BeforeFooterHeight;

impl HeuristicRule for BeforeFooterHeight {
    fn id(&self) -> &'static str {
        "before-footer-height"
    }

    fn name(&self) -> &'static str {
        "Before-footer row height"
    }

    fn applies(&self, ctx: &HeuristicContext) -> bool {
        ctx.profile == SheetProfile::PackingList
    }

    fn apply(&self, ctx: &HeuristicContext, config: &mut SheetConfiguration, events: &mut EventLog) {
        let footer_row = ctx.footer.map(|f| f.row);
        config.styling.row_heights = config
            .styling
            .row_heights
            .clone()
            .with_before_footer(ctx.sheet, footer_row);

        if let Some(height) = config.styling.row_heights.before_footer {
            events.info(
                "heuristics",
                EventScope::Sheet(ctx.sheet.name.clone()),
                format!("before-footer row height {}", height),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolConfig;
    use crate::reader::Sheet;
    use crate::scanner::{FontSpec, WorksheetFacts};
    use crate::style::RowHeights;
    use std::collections::BTreeMap;

    fn context_parts() -> (Sheet, WorksheetFacts, ToolConfig) {
        let sheet = Sheet {
            name: "Packing list".to_string(),
            ..Sheet::default()
        };
        let font = FontSpec {
            name: "Times New Roman".to_string(),
            size: 12.0,
        };
        let facts = WorksheetFacts {
            sheet_name: "Packing list".to_string(),
            header_cells: Vec::new(),
            header_font: font.clone(),
            data_font: font,
            start_row: 12,
            header_row_count: 1,
        };
        (sheet, facts, ToolConfig::default())
    }

    fn base_config() -> SheetConfiguration {
        SheetConfiguration {
            start_row: 12,
            header_to_write: Vec::new(),
            data_cell_merging_rule: BTreeMap::new(),
            footer_configurations: Default::default(),
            styling: crate::artifact::Styling {
                column_id_styles: BTreeMap::new(),
                row_heights: RowHeights {
                    header: 25.0,
                    data_default: 22.0,
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
    fn test_applies_to_packing_list_only() {
        let (sheet, facts, config) = context_parts();
        let columns = Vec::new();
        let mut ctx = HeuristicContext {
            sheet: &sheet,
            profile: SheetProfile::PackingList,
            facts: &facts,
            footer: None,
            columns: &columns,
            config: &config,
        };
        assert!(BeforeFooterHeight.applies(&ctx));
        ctx.profile = SheetProfile::Invoice;
        assert!(!BeforeFooterHeight.applies(&ctx));
    }

    #[test]
    fn test_defaults_to_data_height() {
        let (sheet, facts, config) = context_parts();
        let columns = Vec::new();
        let ctx = HeuristicContext {
            sheet: &sheet,
            profile: SheetProfile::PackingList,
            facts: &facts,
            footer: None,
            columns: &columns,
            config: &config,
        };
        let mut cfg = base_config();
        let mut events = EventLog::new();
        BeforeFooterHeight.apply(&ctx, &mut cfg, &mut events);
        assert_eq!(cfg.styling.row_heights.before_footer, Some(22.0));
    }
}
