//! Central rule registry

use std::collections::HashSet;

use super::before_footer_height::BeforeFooterHeight;
use super::description_fallback::DescriptionFallback;
use super::quantity_split::QuantitySplit;
use super::summary_text::SummaryText;
use super::weight_summary::WeightSummary;
use super::HeuristicRule;
use crate::config::ToolConfig;

fn all_rules() -> Vec<Box<dyn HeuristicRule>> {
    vec![
        Box::new(QuantitySplit),
        Box::new(BeforeFooterHeight),
        Box::new(SummaryText),
        Box::new(WeightSummary),
        Box::new(DescriptionFallback),
    ]
}

/// Rules active under the given configuration, in priority order
pub fn create_enabled_rules(config: &ToolConfig) -> Vec<Box<dyn HeuristicRule>> {
    all_rules()
        .into_iter()
        .filter(|rule| config.is_rule_enabled(rule.id()))
        .collect()
}

/// Every registered rule id, for config validation
pub fn all_rule_ids() -> HashSet<String> {
    all_rules().iter().map(|rule| rule.id().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_enabled_by_default() {
        let config = ToolConfig::default();
        let rules = create_enabled_rules(&config);
        assert_eq!(rules.len(), 5);
    }

    #[test]
    fn test_disabling_a_rule() {
        let mut config = ToolConfig::default();
        config
            .global
            .disabled_rules
            .insert("summary-text".to_string());
        let rules = create_enabled_rules(&config);
        assert!(rules.iter().all(|r| r.id() != "summary-text"));
        assert_eq!(rules.len(), 4);
    }

    #[test]
    fn test_rule_ids_are_kebab_case() {
        for id in all_rule_ids() {
            assert!(id.chars().all(|c| c.is_ascii_lowercase() || c == '-'));
        }
    }

    #[test]
    fn test_config_validation_against_registry() {
        let mut config = ToolConfig::default();
        config
            .global
            .enabled_rules
            .insert("quantity-split".to_string());
        assert!(config.validate_rules(&all_rule_ids()).is_ok());

        config.global.enabled_rules.insert("no-such-rule".to_string());
        assert!(config.validate_rules(&all_rule_ids()).is_err());
    }
}
