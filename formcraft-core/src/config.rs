//! Tool configuration: heuristic activation, thresholds and skeleton defaults

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Main tool configuration, loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    /// Per-canonical-sheet skeleton defaults and overrides
    #[serde(default)]
    pub sheets: HashMap<String, SheetDefaults>,
}

impl ToolConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ToolConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check if a heuristic rule is enabled globally
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        if self.global.disabled_rules.contains(rule_id) {
            return false;
        }
        if self.global.enabled_rules.is_empty() {
            return true;
        }
        self.global.enabled_rules.contains(rule_id)
    }

    /// Validate configured rule names against the registry's known ids
    pub fn validate_rules(&self, valid_ids: &HashSet<String>) -> Result<()> {
        for rule in &self.global.disabled_rules {
            if !valid_ids.contains(rule) {
                anyhow::bail!(
                    "Configuration error: Unknown heuristic rule '{}' in disabled_rules",
                    rule
                );
            }
        }
        for rule in &self.global.enabled_rules {
            if !valid_ids.contains(rule) {
                anyhow::bail!(
                    "Configuration error: Unknown heuristic rule '{}' in enabled_rules",
                    rule
                );
            }
        }
        Ok(())
    }

    /// Get a parameter with fallback chain: sheet -> global
    pub fn get_param_int(&self, key: &str, sheet_name: Option<&str>) -> Option<i64> {
        if let Some(sheet) = sheet_name.and_then(|name| self.sheets.get(name)) {
            if let Some(value) = sheet.params.get(key).and_then(|v| v.as_integer()) {
                return Some(value);
            }
        }
        self.global.params.get(key).and_then(|v| v.as_integer())
    }

    /// Get a string parameter with fallback chain: sheet -> global
    pub fn get_param_str<'a>(&'a self, key: &str, sheet_name: Option<&str>) -> Option<&'a str> {
        if let Some(sheet) = sheet_name.and_then(|name| self.sheets.get(name)) {
            if let Some(value) = sheet.params.get(key).and_then(|v| v.as_str()) {
                return Some(value);
            }
        }
        self.global.params.get(key).and_then(|v| v.as_str())
    }

    /// Get a float parameter with fallback chain: sheet -> global
    pub fn get_param_float(&self, key: &str, sheet_name: Option<&str>) -> Option<f64> {
        if let Some(sheet) = sheet_name.and_then(|name| self.sheets.get(name)) {
            if let Some(value) = sheet
                .params
                .get(key)
                .and_then(|v| v.as_float().or(v.as_integer().map(|i| i as f64)))
            {
                return Some(value);
            }
        }
        self.global
            .params
            .get(key)
            .and_then(|v| v.as_float().or(v.as_integer().map(|i| i as f64)))
    }

    /// Get a string-array parameter with fallback chain: sheet -> global
    pub fn get_param_array(&self, key: &str, sheet_name: Option<&str>) -> Option<Vec<String>> {
        let collect = |v: &toml::Value| {
            v.as_array().map(|arr| {
                arr.iter()
                    .filter_map(|item| item.as_str().map(|s| s.to_string()))
                    .collect()
            })
        };
        if let Some(sheet) = sheet_name.and_then(|name| self.sheets.get(name)) {
            if let Some(arr) = sheet.params.get(key).and_then(collect) {
                return Some(arr);
            }
        }
        self.global.params.get(key).and_then(collect)
    }

    // Named accessors for the pipeline's tunables, each with its default.

    pub fn header_search_window(&self) -> u32 {
        self.get_param_int("header_search_window", None).unwrap_or(30) as u32
    }

    pub fn footer_search_window(&self) -> u32 {
        self.get_param_int("footer_search_window", None).unwrap_or(50) as u32
    }

    pub fn footer_label_columns(&self) -> u32 {
        self.get_param_int("footer_label_columns", None).unwrap_or(15) as u32
    }

    pub fn fuzzy_threshold(&self) -> f64 {
        self.get_param_float("fuzzy_threshold", None).unwrap_or(0.8)
    }

    pub fn keyword_similarity(&self) -> f64 {
        self.get_param_float("keyword_similarity", None).unwrap_or(0.6)
    }

    pub fn default_font_name(&self) -> String {
        self.get_param_str("default_font_name", None)
            .unwrap_or("Times New Roman")
            .to_string()
    }

    pub fn default_font_size(&self) -> f64 {
        self.get_param_float("default_font_size", None).unwrap_or(12.0)
    }

    pub fn header_keywords(&self) -> Option<Vec<String>> {
        self.get_param_array("header_keywords", None)
    }

    pub fn summary_pattern(&self) -> String {
        self.get_param_str("summary_pattern", None)
            .unwrap_or("buffalo")
            .to_string()
    }

    pub fn weight_summary_pattern(&self) -> String {
        self.get_param_str("weight_summary_pattern", None)
            .unwrap_or("NW(KGS):")
            .to_string()
    }

    /// Columns that merge downward by default when a sheet shows no merges
    pub fn default_merge_columns(&self, sheet_name: &str) -> Vec<String> {
        self.get_param_array("default_merge_columns", Some(sheet_name))
            .unwrap_or_default()
    }
}

/// Global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Heuristic rules enabled (empty means all default-active rules)
    #[serde(default)]
    pub enabled_rules: HashSet<String>,
    /// Heuristic rules disabled
    #[serde(default)]
    pub disabled_rules: HashSet<String>,
    #[serde(flatten)]
    pub params: HashMap<String, toml::Value>,
}

/// Per-canonical-sheet defaults (skeleton values the synthesizer starts from)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetDefaults {
    #[serde(flatten)]
    pub params: HashMap<String, toml::Value>,
}
