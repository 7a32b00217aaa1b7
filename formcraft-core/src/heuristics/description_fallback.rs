//! Description fallback text from merged description cells

use super::{HeuristicContext, HeuristicRule, SheetProfile};
use crate::artifact::SheetConfiguration;
use crate::events::{EventLog, EventScope};

/// Packing lists often merge the description column across all item rows and
/// write one shared text. That text is recorded so the writer can fall back
/// to it when an item carries no description of its own.
pub struct DescriptionFallback;

impl HeuristicRule for DescriptionFallback {
    fn id(&self) -> &'static str {
        "description-fallback"
    }

    fn name(&self) -> &'static str {
        "Description fallback text"
    }

    fn applies(&self, ctx: &HeuristicContext) -> bool {
        ctx.profile == SheetProfile::PackingList
    }

    fn apply(&self, ctx: &HeuristicContext, config: &mut SheetConfiguration, events: &mut EventLog) {
        let Some((_, excel_column)) = ctx.columns.iter().find(|(id, _)| id == "col_desc") else {
            return;
        };
        let col0 = excel_column - 1;
        let start_row0 = ctx.facts.start_row - 1;

        let text = ctx
            .sheet
            .merged_cells
            .iter()
            .filter(|m| m.start_row >= start_row0 && m.start_col == col0)
            .find_map(|m| ctx.sheet.text_at(m.start_row, m.start_col))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        if let Some(text) = text {
            events.info(
                "heuristics",
                EventScope::Sheet(ctx.sheet.name.clone()),
                format!("description fallback '{}'", text),
            );
            config.description_fallback = Some(text);
        }
    }
}
