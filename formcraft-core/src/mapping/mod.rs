//! Canonical column-id mapping
//!
//! Resolution order: persisted store, built-in fallback table, then (in
//! interactive mode only) fuzzy matching against the store and pattern
//! rules, each gated by the confirmation port.

pub mod confirm;
pub mod matcher;
pub mod report;
pub mod store;

pub use confirm::{AutoConfirm, Confirmation, ConfirmationPort};
pub use store::MappingStore;

use crate::error::AnalyzeError;
use crate::events::{EventLevel, EventLog, EventScope, InferenceEvent};

/// Maps free-text headers onto canonical column ids
pub struct ColumnIdMapper {
    fuzzy_threshold: f64,
    interactive: bool,
}

impl ColumnIdMapper {
    pub fn new(fuzzy_threshold: f64, interactive: bool) -> Self {
        Self {
            fuzzy_threshold,
            interactive,
        }
    }

    /// Map one header text to a column id, or None when it stays unmapped.
    ///
    /// Deterministic for a given text and store state: the store and the
    /// fallback table are consulted in a fixed order, and fuzzy candidates
    /// are ranked by score with ties broken by store order.
    pub fn map(
        &self,
        text: &str,
        store: &mut MappingStore,
        port: &mut dyn ConfirmationPort,
        events: &mut EventLog,
    ) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(id) = store.header_id(trimmed) {
            return Some(id.to_string());
        }

        if let Some(id) = matcher::fallback_lookup(trimmed) {
            return Some(id.to_string());
        }

        if !self.interactive {
            let err = AnalyzeError::UnmappedHeader {
                text: trimmed.to_string(),
            };
            store.note_unrecognized(format!("Header: {}", trimmed));
            events.warn(
                "mapper",
                EventScope::Book,
                format!("{}, dropped in strict mode", err),
            );
            return None;
        }

        if let Some(id) = self.fuzzy_from_store(trimmed, store, port, events) {
            return Some(id);
        }

        if let Some(id) = matcher::pattern_match(trimmed) {
            match port.propose(trimmed, id) {
                Confirmation::Accept => {
                    events.info(
                        "mapper",
                        EventScope::Book,
                        format!("pattern match '{}' -> {} accepted", trimmed, id),
                    );
                    return Some(id.to_string());
                }
                Confirmation::AcceptAndPersist => {
                    store.add_header_mapping(trimmed, id);
                    events.info(
                        "mapper",
                        EventScope::Book,
                        format!("pattern match '{}' -> {} accepted and persisted", trimmed, id),
                    );
                    return Some(id.to_string());
                }
                Confirmation::Reject => {}
            }
        }

        store.note_unrecognized(format!("Header: {}", trimmed));
        events.warn(
            "mapper",
            EventScope::Book,
            format!("header '{}' left unmapped", trimmed),
        );
        None
    }

    /// Best fuzzy candidate from the store, above threshold and confirmed
    fn fuzzy_from_store(
        &self,
        text: &str,
        store: &mut MappingStore,
        port: &mut dyn ConfirmationPort,
        events: &mut EventLog,
    ) -> Option<String> {
        let normalized_text = matcher::normalize_header(text);
        let mut best: Option<(f64, String, String)> = None;
        for (normalized, raw, id) in store.normalized_header_entries() {
            let score = matcher::fuzzy_score_normalized(&normalized_text, &normalized);
            if score >= self.fuzzy_threshold {
                let better = best.as_ref().map(|(s, _, _)| score > *s).unwrap_or(true);
                if better {
                    best = Some((score, raw.to_string(), id.to_string()));
                }
            }
        }

        let (score, raw, id) = best?;
        match port.propose(text, &id) {
            Confirmation::Accept => {
                events.push(
                    InferenceEvent::new(
                        "mapper",
                        EventScope::Book,
                        format!("fuzzy match '{}' ~ '{}' -> {} accepted", text, raw, id),
                        EventLevel::Info,
                    )
                    .with_context("score", format!("{:.2}", score)),
                );
                Some(id)
            }
            Confirmation::AcceptAndPersist => {
                store.add_header_mapping(text, &id);
                events.push(
                    InferenceEvent::new(
                        "mapper",
                        EventScope::Book,
                        format!(
                            "fuzzy match '{}' ~ '{}' -> {} accepted and persisted",
                            text, raw, id
                        ),
                        EventLevel::Info,
                    )
                    .with_context("score", format!("{:.2}", score)),
                );
                Some(id)
            }
            Confirmation::Reject => None,
        }
    }
}

/// Map a raw sheet name to its canonical name.
///
/// Exact store match, then case-insensitive, then a similarity suggestion
/// recorded for the report; unmapped names pass through unchanged.
pub fn map_sheet_name(raw: &str, store: &mut MappingStore, events: &mut EventLog) -> String {
    if let Some(canonical) = store.canonical_sheet(raw) {
        return canonical.to_string();
    }
    if let Some(canonical) = store.canonical_sheet_ci(raw) {
        return canonical.to_string();
    }

    let mut best: Option<(f64, String)> = None;
    for (known, canonical) in store.sheet_name_mappings() {
        let score = matcher::char_similarity(raw, known);
        if score >= 0.7 {
            let better = best.as_ref().map(|(s, _)| score > *s).unwrap_or(true);
            if better {
                best = Some((score, canonical.clone()));
            }
        }
    }
    if let Some((score, suggestion)) = best {
        store.note_unrecognized(format!("Suggestion: sheet '{}' -> '{}'", raw, suggestion));
        events.push(
            InferenceEvent::new(
                "mapper",
                EventScope::Sheet(raw.to_string()),
                format!("sheet name '{}' unmapped, closest known is '{}'", raw, suggestion),
                EventLevel::Warning,
            )
            .with_context("score", format!("{:.2}", score)),
        );
    } else {
        store.note_unrecognized(format!("Sheet: {}", raw));
    }

    raw.to_string()
}
