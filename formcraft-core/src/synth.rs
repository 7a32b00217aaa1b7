//! Configuration synthesis: one pass per sheet, in fixed step order

use std::collections::BTreeMap;

use crate::artifact::{ConfigArtifact, FooterConfig, MergeRule, SheetConfiguration, Styling};
use crate::config::ToolConfig;
use crate::error::AnalyzeError;
use crate::events::{EventLog, EventScope};
use crate::footer::{FooterDescriptor, FooterLocator};
use crate::heuristics::{
    apply_rules, create_enabled_rules, HeuristicContext, HeuristicRule, SheetProfile,
};
use crate::layout::LayoutAssembler;
use crate::mapping::{map_sheet_name, ColumnIdMapper, ConfirmationPort, MappingStore};
use crate::reader::{Sheet, Workbook};
use crate::scanner::{StructuralScanner, WorksheetFacts};
use crate::spans::SpanResolver;
use crate::style::{RowHeights, StyleExtractor};

/// Drives the full pipeline over a workbook and assembles the artifact
pub struct ConfigSynthesizer<'a> {
    config: &'a ToolConfig,
    rules: Vec<Box<dyn HeuristicRule>>,
    mapper: ColumnIdMapper,
}

impl<'a> ConfigSynthesizer<'a> {
    pub fn new(config: &'a ToolConfig, interactive: bool) -> Self {
        Self {
            config,
            rules: create_enabled_rules(config),
            mapper: ColumnIdMapper::new(config.fuzzy_threshold(), interactive),
        }
    }

    /// Analyze every visible sheet. Sheet-level failures are logged and the
    /// sheet is left out of the artifact; siblings continue.
    pub fn synthesize(
        &self,
        workbook: &Workbook,
        store: &mut MappingStore,
        port: &mut dyn ConfirmationPort,
        events: &mut EventLog,
    ) -> ConfigArtifact {
        let scanner = StructuralScanner::new(self.config);
        let locator = FooterLocator::new(self.config);
        let splits = self.rules.iter().flat_map(|r| r.span_parents()).collect();
        let resolver = SpanResolver::new(splits);

        let mut artifact = ConfigArtifact::default();

        for name in workbook.visible_sheet_names() {
            let Some(sheet) = workbook.sheet(name) else {
                continue;
            };
            match self.synthesize_sheet(sheet, &scanner, &locator, &resolver, store, port, events) {
                Ok((canonical, configuration)) => {
                    artifact.data_mapping.insert(canonical, configuration);
                }
                Err(err) => {
                    events.error(
                        "synth",
                        EventScope::Sheet(name.to_string()),
                        err.to_string(),
                    );
                }
            }
        }

        artifact
    }

    #[allow(clippy::too_many_arguments)]
    fn synthesize_sheet(
        &self,
        sheet: &Sheet,
        scanner: &StructuralScanner,
        locator: &FooterLocator,
        resolver: &SpanResolver,
        store: &mut MappingStore,
        port: &mut dyn ConfirmationPort,
        events: &mut EventLog,
    ) -> Result<(String, SheetConfiguration), AnalyzeError> {
        let canonical = map_sheet_name(&sheet.name, store, events);
        let profile = SheetProfile::infer(&canonical);

        // Header text and layout
        let facts = scanner.scan(sheet, events)?;
        let spans = resolver.resolve(&facts.sheet_name, &facts.header_cells, events);
        let ids: Vec<Option<String>> = facts
            .header_cells
            .iter()
            .map(|cell| self.mapper.map(&cell.keyword, store, port, events))
            .collect();
        let header_to_write = LayoutAssembler::assemble(&facts, &spans, &ids, events)?;

        // Canonical id paired with its 1-based sheet column
        let columns: Vec<(String, u32)> = facts
            .header_cells
            .iter()
            .zip(&ids)
            .filter_map(|(cell, id)| id.clone().map(|id| (id, cell.column)))
            .collect();

        // Footer is optional; everything downstream tolerates its absence
        let footer = locator.locate(sheet, facts.header_row(), events);

        // Row heights, then footer raw-index fields
        let styling = Styling {
            column_id_styles: StyleExtractor::column_styles(
                sheet,
                &columns,
                facts.header_row() + facts.header_row_count,
                events,
            ),
            row_heights: RowHeights::extract(
                sheet,
                facts.header_row(),
                facts.start_row,
                footer.as_ref().map(|f| f.row),
                &facts.header_font,
                &facts.data_font,
            ),
        };

        let footer_configurations = footer
            .as_ref()
            .map(|f| FooterConfig {
                total_text_column_id: f.total_text_column.map(|c| c - 1),
                total_text: f.total_text_value.clone(),
                pallet_count_column_id: f.pallet_count_column.map(|c| c - 1),
            })
            .unwrap_or_default();

        let data_cell_merging_rule = self.merge_rules(
            sheet,
            &canonical,
            &facts,
            footer.as_ref(),
            &columns,
            &header_to_write,
        );

        let mut configuration = SheetConfiguration {
            start_row: facts.start_row,
            header_to_write,
            data_cell_merging_rule,
            footer_configurations,
            styling,
            summary_enabled: None,
            weight_summary_enabled: None,
            description_fallback: None,
        };

        let ctx = HeuristicContext {
            sheet,
            profile,
            facts: &facts,
            footer: footer.as_ref(),
            columns: &columns,
            config: self.config,
        };
        apply_rules(&self.rules, &ctx, &mut configuration, events);

        configuration.validate(&canonical)?;
        Ok((canonical, configuration))
    }

    /// Merge rules: detected data-region merges, else configured defaults,
    /// then colspan-derived rowspan entries for spanning headers
    fn merge_rules(
        &self,
        sheet: &Sheet,
        canonical: &str,
        facts: &WorksheetFacts,
        footer: Option<&FooterDescriptor>,
        columns: &[(String, u32)],
        header_to_write: &[crate::layout::HeaderDescriptor],
    ) -> BTreeMap<String, MergeRule> {
        let start_row0 = facts.start_row - 1;
        let end_row0 = footer.map(|f| f.row - 1).unwrap_or(u32::MAX);

        let mut rules: BTreeMap<String, MergeRule> = BTreeMap::new();

        for (id, excel_column) in columns {
            let col0 = excel_column - 1;
            let merge = sheet.merged_cells.iter().find(|m| {
                m.start_col == col0
                    && m.start_row >= start_row0
                    && m.start_row < end_row0
                    && (m.rowspan() > 1 || m.colspan() > 1)
            });
            if let Some(merge) = merge {
                rules.insert(
                    id.clone(),
                    MergeRule {
                        rowspan: (merge.rowspan() > 1).then(|| merge.rowspan()),
                        colspan: (merge.colspan() > 1).then(|| merge.colspan()),
                    },
                );
            }
        }

        if rules.is_empty() {
            for id in self.config.default_merge_columns(canonical) {
                if columns.iter().any(|(known, _)| *known == id) {
                    rules.insert(
                        id,
                        MergeRule {
                            rowspan: Some(2),
                            colspan: None,
                        },
                    );
                }
            }
        }

        // A header spanning N columns merges its data cells N rows deep
        for descriptor in header_to_write {
            if descriptor.colspan > 1 {
                if let Some(id) = &descriptor.id {
                    rules.insert(
                        id.clone(),
                        MergeRule {
                            rowspan: Some(descriptor.colspan),
                            colspan: None,
                        },
                    );
                }
            }
        }

        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::AutoConfirm;
    use crate::reader::workbook::{Cell, CellValue};
    use std::collections::HashMap;

    fn text_cell(row: u32, col: u32, text: &str) -> ((u32, u32), Cell) {
        (
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
        )
    }

    fn number_cell(row: u32, col: u32, value: f64) -> ((u32, u32), Cell) {
        (
            (row, col),
            Cell {
                row,
                col,
                value: CellValue::Number(value),
                formula: None,
                num_fmt: Some("0.00".to_string()),
                font: None,
                alignment: None,
            },
        )
    }

    fn formula_cell(row: u32, col: u32, formula: &str) -> ((u32, u32), Cell) {
        (
            (row, col),
            Cell {
                row,
                col,
                value: CellValue::Number(0.0),
                formula: Some(formula.to_string()),
                num_fmt: None,
                font: None,
                alignment: None,
            },
        )
    }

    /// A minimal invoice-shaped sheet: header at row 10 (1-based), data from
    /// row 12, SUM footer at row 20
    fn invoice_sheet() -> Sheet {
        let mut cells: HashMap<(u32, u32), Cell> = HashMap::new();
        for (key, cell) in [
            text_cell(9, 0, "P.O Nº"),
            text_cell(9, 1, "ITEM Nº"),
            text_cell(9, 2, "Description"),
            text_cell(9, 3, "Quantity"),
            text_cell(9, 4, "Amount"),
            text_cell(11, 0, "PO-1001"),
            text_cell(11, 1, "A-1"),
            text_cell(11, 2, "LEATHER"),
            number_cell(11, 3, 120.0),
            number_cell(11, 4, 960.0),
            formula_cell(19, 4, "SUM(E12:E19)"),
        ] {
            cells.insert(key, cell);
        }
        Sheet {
            name: "Invoice".to_string(),
            cells,
            used_range: Some((25, 6)),
            ..Sheet::default()
        }
    }

    fn workbook(sheet: Sheet) -> Workbook {
        Workbook {
            path: "test.xlsx".into(),
            sheets: vec![sheet],
            hidden_sheets: Vec::new(),
        }
    }

    #[test]
    fn test_full_pipeline_on_invoice_sheet() {
        let config = ToolConfig::default();
        let synthesizer = ConfigSynthesizer::new(&config, false);
        let workbook = workbook(invoice_sheet());
        let mut store = MappingStore::in_memory();
        let mut port = AutoConfirm::rejecting();
        let mut events = EventLog::new();

        let artifact = synthesizer.synthesize(&workbook, &mut store, &mut port, &mut events);

        let sheet_cfg = artifact.data_mapping.get("Invoice").expect("invoice config");
        assert_eq!(sheet_cfg.start_row, 12);
        assert!(sheet_cfg
            .header_to_write
            .iter()
            .any(|h| h.id.as_deref() == Some("col_po")));
        assert!(sheet_cfg
            .header_to_write
            .iter()
            .any(|h| h.id.as_deref() == Some("col_amount")));
        // Footer at row 20, formula in column E
        assert_eq!(
            sheet_cfg
                .styling
                .column_id_styles
                .get("col_amount")
                .and_then(|s| s.number_format.as_deref()),
            Some("#,##0.00")
        );
        assert!(!events.has_errors());
    }

    #[test]
    fn test_sheet_without_header_is_skipped() {
        let mut blank = Sheet {
            name: "Notes".to_string(),
            used_range: Some((5, 3)),
            ..Sheet::default()
        };
        let (key, cell) = text_cell(0, 0, "internal notes");
        blank.cells.insert(key, cell);

        let config = ToolConfig::default();
        let synthesizer = ConfigSynthesizer::new(&config, false);
        let workbook = workbook(blank);
        let mut store = MappingStore::in_memory();
        let mut port = AutoConfirm::rejecting();
        let mut events = EventLog::new();

        let artifact = synthesizer.synthesize(&workbook, &mut store, &mut port, &mut events);
        assert!(artifact.data_mapping.is_empty());
        assert!(events.has_errors());
    }

    #[test]
    fn test_sibling_sheets_survive_a_failure() {
        let mut blank = Sheet {
            name: "Notes".to_string(),
            used_range: Some((5, 3)),
            ..Sheet::default()
        };
        let (key, cell) = text_cell(0, 0, "internal notes");
        blank.cells.insert(key, cell);

        let config = ToolConfig::default();
        let synthesizer = ConfigSynthesizer::new(&config, false);
        let workbook = Workbook {
            path: "test.xlsx".into(),
            sheets: vec![blank, invoice_sheet()],
            hidden_sheets: Vec::new(),
        };
        let mut store = MappingStore::in_memory();
        let mut port = AutoConfirm::rejecting();
        let mut events = EventLog::new();

        let artifact = synthesizer.synthesize(&workbook, &mut store, &mut port, &mut events);
        assert_eq!(artifact.data_mapping.len(), 1);
        assert!(artifact.data_mapping.contains_key("Invoice"));
    }

    #[test]
    fn test_spanning_header_adds_merge_rule() {
        // Quantity spans PCS/SF; the mapped parent id gets a rowspan rule
        let mut sheet = invoice_sheet();
        for (key, cell) in [
            text_cell(9, 3, "Quantity"),
            text_cell(10, 3, "PCS"),
            text_cell(10, 4, "SF"),
        ] {
            sheet.cells.insert(key, cell);
        }
        // Second header row shifts Amount out of the way for this shape
        sheet.cells.remove(&(9, 4));

        let config = ToolConfig::default();
        let synthesizer = ConfigSynthesizer::new(&config, false);
        let workbook = workbook(sheet);
        let mut store = MappingStore::in_memory();
        let mut port = AutoConfirm::rejecting();
        let mut events = EventLog::new();

        let artifact = synthesizer.synthesize(&workbook, &mut store, &mut port, &mut events);
        let sheet_cfg = artifact.data_mapping.get("Invoice").expect("invoice config");
        let rule = sheet_cfg
            .data_cell_merging_rule
            .get("col_qty_sf")
            .expect("merge rule for quantity");
        assert_eq!(rule.rowspan, Some(2));
    }
}
