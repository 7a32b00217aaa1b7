//! Weight-summary toggle for invoice sheets

use super::{body_contains, HeuristicContext, HeuristicRule, SheetProfile};
use crate::artifact::SheetConfiguration;
use crate::events::{EventLog, EventScope};

pub struct WeightSummary;

impl HeuristicRule for WeightSummary {
    fn id(&self) -> &'static str {
        "weight-summary"
    }

    fn name(&self) -> &'static str {
        "Weight summary toggle"
    }

    fn applies(&self, ctx: &HeuristicContext) -> bool {
        ctx.profile == SheetProfile::Invoice
    }

    fn apply(&self, ctx: &HeuristicContext, config: &mut SheetConfiguration, events: &mut EventLog) {
        let pattern = ctx.config.weight_summary_pattern();
        if body_contains(ctx.sheet, ctx.facts.start_row - 1, &pattern) {
            config.weight_summary_enabled = Some(true);
            events.info(
                "heuristics",
                EventScope::Sheet(ctx.sheet.name.clone()),
                format!("weight marker '{}' found, weight summary enabled", pattern),
            );
        }
    }
}
