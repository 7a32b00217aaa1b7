//! Pluggable per-sheet heuristics
//!
//! Sheet-specific behavior lives behind `HeuristicRule` implementations,
//! registered centrally and evaluated in priority order. Rules fire by
//! sheet profile, never by company-specific sheet names.

pub mod before_footer_height;
pub mod description_fallback;
pub mod quantity_split;
pub mod registry;
pub mod summary_text;
pub mod weight_summary;

pub use registry::{all_rule_ids, create_enabled_rules};

use crate::artifact::SheetConfiguration;
use crate::config::ToolConfig;
use crate::events::EventLog;
use crate::footer::FooterDescriptor;
use crate::reader::Sheet;
use crate::scanner::WorksheetFacts;
use crate::spans::ParentSplit;

/// Broad sheet category inferred from the canonical sheet name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetProfile {
    Invoice,
    PackingList,
    Contract,
    Generic,
}

impl SheetProfile {
    pub fn infer(canonical_name: &str) -> Self {
        let lower = canonical_name.to_lowercase();
        if lower.contains("invoice") {
            Self::Invoice
        } else if lower.contains("packing") {
            Self::PackingList
        } else if lower.contains("contract") {
            Self::Contract
        } else {
            Self::Generic
        }
    }
}

/// Read-only facts a rule may consult
pub struct HeuristicContext<'a> {
    pub sheet: &'a Sheet,
    pub profile: SheetProfile,
    pub facts: &'a WorksheetFacts,
    pub footer: Option<&'a FooterDescriptor>,
    /// Canonical id and 1-based sheet column of every mapped header
    pub columns: &'a [(String, u32)],
    pub config: &'a ToolConfig,
}

/// One special-case behavior, individually deactivatable via tool config
pub trait HeuristicRule {
    /// Stable kebab-case id used in enabled_rules/disabled_rules
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Parent/children splits this rule contributes to span resolution
    fn span_parents(&self) -> Vec<ParentSplit> {
        Vec::new()
    }

    fn applies(&self, ctx: &HeuristicContext) -> bool;

    /// Mutate the sheet configuration; called only when `applies` is true
    fn apply(&self, ctx: &HeuristicContext, config: &mut SheetConfiguration, events: &mut EventLog);
}

/// Case-insensitive substring scan over the sheet body from `first_row0` on
pub(crate) fn body_contains(sheet: &Sheet, first_row0: u32, pattern: &str) -> bool {
    let needle = pattern.to_lowercase();
    for ((row, _), cell) in &sheet.cells {
        if *row < first_row0 {
            continue;
        }
        if let Some(text) = cell.value.as_text() {
            if text.to_lowercase().contains(&needle) {
                return true;
            }
        }
    }
    false
}

/// Run every applicable rule against one sheet configuration
pub fn apply_rules(
    rules: &[Box<dyn HeuristicRule>],
    ctx: &HeuristicContext,
    config: &mut SheetConfiguration,
    events: &mut EventLog,
) {
    for rule in rules {
        if rule.applies(ctx) {
            rule.apply(ctx, config, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_inference() {
        assert_eq!(SheetProfile::infer("Invoice"), SheetProfile::Invoice);
        assert_eq!(SheetProfile::infer("Packing list"), SheetProfile::PackingList);
        assert_eq!(SheetProfile::infer("Contract"), SheetProfile::Contract);
        assert_eq!(SheetProfile::infer("Shipping Marks"), SheetProfile::Generic);
    }
}
