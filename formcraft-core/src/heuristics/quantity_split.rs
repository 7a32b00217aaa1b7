//! Quantity parent split: "Quantity" spanning PCS and SF children

use super::{HeuristicContext, HeuristicRule};
use crate::artifact::SheetConfiguration;
use crate::events::EventLog;
use crate::spans::ParentSplit;

/// Declares the Quantity -> PCS/SF parent split consumed during span
/// resolution; the rule itself leaves the configuration alone.
pub struct QuantitySplit;

impl HeuristicRule for QuantitySplit {
    fn id(&self) -> &'static str {
        "quantity-split"
    }

    fn name(&self) -> &'static str {
        "Quantity parent split"
    }

    fn span_parents(&self) -> Vec<ParentSplit> {
        vec![ParentSplit {
            parent: "Quantity".to_string(),
            children: vec!["PCS".to_string(), "SF".to_string()],
        }]
    }

    fn applies(&self, _ctx: &HeuristicContext) -> bool {
        false
    }

    fn apply(&self, _ctx: &HeuristicContext, _config: &mut SheetConfiguration, _events: &mut EventLog) {}
}
