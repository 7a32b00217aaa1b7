//! Output configuration artifact
//!
//! The schema is a compatibility contract with downstream form writers:
//! existing keys keep their names and shapes, new keys are optional.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AnalyzeError;
use crate::layout::{find_overlap, HeaderDescriptor};
use crate::style::{ColumnStyle, RowHeights};

/// Top-level artifact: one configuration per canonical sheet name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigArtifact {
    pub data_mapping: BTreeMap<String, SheetConfiguration>,
}

impl ConfigArtifact {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Everything the writer needs to reproduce one sheet's layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfiguration {
    /// First data row, 1-based
    pub start_row: u32,
    pub header_to_write: Vec<HeaderDescriptor>,
    #[serde(default)]
    pub data_cell_merging_rule: BTreeMap<String, MergeRule>,
    #[serde(default)]
    pub footer_configurations: FooterConfig,
    pub styling: Styling,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_summary_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_fallback: Option<String>,
}

impl SheetConfiguration {
    /// Schema checks applied before the configuration joins the artifact
    pub fn validate(&self, sheet_name: &str) -> Result<(), AnalyzeError> {
        if self.start_row == 0 {
            return Err(AnalyzeError::ConfigValidation {
                sheet: sheet_name.to_string(),
                reason: "start_row must be 1-based".to_string(),
            });
        }
        if self.header_to_write.is_empty() {
            return Err(AnalyzeError::ConfigValidation {
                sheet: sheet_name.to_string(),
                reason: "no headers to write".to_string(),
            });
        }
        if let Some((a, b)) = find_overlap(&self.header_to_write) {
            return Err(AnalyzeError::ConfigValidation {
                sheet: sheet_name.to_string(),
                reason: format!("headers '{}' and '{}' overlap", a.text, b.text),
            });
        }

        let known_ids: Vec<&str> = self
            .header_to_write
            .iter()
            .filter_map(|h| h.id.as_deref())
            .collect();
        for id in self.data_cell_merging_rule.keys() {
            if !known_ids.contains(&id.as_str()) {
                return Err(AnalyzeError::ConfigValidation {
                    sheet: sheet_name.to_string(),
                    reason: format!("merge rule targets unknown column '{}'", id),
                });
            }
        }

        Ok(())
    }
}

/// Downward/sideways merge applied to a data column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rowspan: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colspan: Option<u32>,
}

/// Footer cell positions, 0-based raw indices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FooterConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_text_column_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pallet_count_column_id: Option<u32>,
}

/// Style block of a sheet configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Styling {
    #[serde(default)]
    pub column_id_styles: BTreeMap<String, ColumnStyle>,
    pub row_heights: RowHeights,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heights() -> RowHeights {
        RowHeights {
            header: 25.0,
            data_default: 20.0,
            footer: 30.0,
            before_footer: None,
        }
    }

    fn header(col: u32, text: &str, id: Option<&str>) -> HeaderDescriptor {
        HeaderDescriptor {
            row: 0,
            col,
            text: text.to_string(),
            id: id.map(str::to_string),
            colspan: 1,
            rowspan: 1,
        }
    }

    fn config(headers: Vec<HeaderDescriptor>) -> SheetConfiguration {
        SheetConfiguration {
            start_row: 12,
            header_to_write: headers,
            data_cell_merging_rule: BTreeMap::new(),
            footer_configurations: FooterConfig::default(),
            styling: Styling {
                column_id_styles: BTreeMap::new(),
                row_heights: heights(),
            },
            summary_enabled: None,
            weight_summary_enabled: None,
            description_fallback: None,
        }
    }

    #[test]
    fn test_valid_configuration() {
        let cfg = config(vec![header(0, "P.O Nº", Some("col_po"))]);
        assert!(cfg.validate("Invoice").is_ok());
    }

    #[test]
    fn test_rejects_empty_headers() {
        let cfg = config(vec![]);
        assert!(matches!(
            cfg.validate("Invoice"),
            Err(AnalyzeError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_rejects_merge_rule_for_unknown_column() {
        let mut cfg = config(vec![header(0, "P.O Nº", Some("col_po"))]);
        cfg.data_cell_merging_rule.insert(
            "col_ghost".to_string(),
            MergeRule {
                rowspan: Some(2),
                colspan: None,
            },
        );
        assert!(cfg.validate("Invoice").is_err());
    }

    #[test]
    fn test_serialization_omits_empty_options() {
        let cfg = config(vec![header(0, "P.O Nº", Some("col_po"))]);
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("summary_enabled"));
        assert!(!json.contains("colspan"));
        assert!(!json.contains("before_footer"));
        assert!(json.contains("\"start_row\":12"));
    }

    #[test]
    fn test_roundtrip() {
        let mut artifact = ConfigArtifact::default();
        let mut cfg = config(vec![header(0, "Amount", Some("col_amount"))]);
        cfg.summary_enabled = Some(true);
        cfg.footer_configurations.total_text_column_id = Some(0);
        cfg.footer_configurations.total_text = Some("TOTAL OF:".to_string());
        artifact.data_mapping.insert("Invoice".to_string(), cfg);

        let json = artifact.to_json().unwrap();
        let back: ConfigArtifact = serde_json::from_str(&json).unwrap();
        let sheet = back.data_mapping.get("Invoice").unwrap();
        assert_eq!(sheet.summary_enabled, Some(true));
        assert_eq!(
            sheet.footer_configurations.total_text.as_deref(),
            Some("TOTAL OF:")
        );
    }
}
