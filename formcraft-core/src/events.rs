//! Structured event log for inference decisions
//!
//! Every heuristic decision, fallback and per-sheet failure is recorded as an
//! event so downstream tooling can aggregate what the pipeline inferred and
//! why a sheet was skipped.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Severity level of an inference event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventLevel {
    Info,
    Warning,
    Error,
}

/// Scope of an event (book, sheet, or cell level)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventScope {
    Book,
    Sheet(String),
    Cell(String, CellReference),
}

impl EventScope {
    /// Get the sheet name if this is a sheet or cell scope
    pub fn sheet_name(&self) -> Option<&str> {
        match self {
            EventScope::Book => None,
            EventScope::Sheet(name) => Some(name),
            EventScope::Cell(name, _) => Some(name),
        }
    }
}

impl PartialOrd for EventScope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventScope {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (EventScope::Book, EventScope::Book) => Ordering::Equal,
            (EventScope::Book, _) => Ordering::Less,
            (_, EventScope::Book) => Ordering::Greater,
            (EventScope::Sheet(a), EventScope::Sheet(b)) => a.cmp(b),
            (EventScope::Sheet(_), EventScope::Cell(_, _)) => Ordering::Less,
            (EventScope::Cell(_, _), EventScope::Sheet(_)) => Ordering::Greater,
            (EventScope::Cell(sheet_a, cell_a), EventScope::Cell(sheet_b, cell_b)) => {
                sheet_a.cmp(sheet_b).then_with(|| cell_a.cmp(cell_b))
            }
        }
    }
}

/// Cell reference (e.g., A1, B2), 0-based internally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellReference {
    pub row: u32,
    pub col: u32,
}

impl CellReference {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Convert to Excel-style reference (e.g., "A1")
    pub fn to_excel_ref(&self) -> String {
        format!("{}{}", Self::col_to_letter(self.col), self.row + 1)
    }

    /// Convert column number to letter (0 -> A, 1 -> B, etc.)
    fn col_to_letter(mut col: u32) -> String {
        let mut result = String::new();
        loop {
            result.insert(0, (b'A' + (col % 26) as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

impl PartialOrd for CellReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellReference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row).then_with(|| self.col.cmp(&other.col))
    }
}

impl std::fmt::Display for CellReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_excel_ref())
    }
}

/// One recorded inference decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceEvent {
    /// Component that produced the event (e.g., "scanner", "footer")
    pub component: String,
    pub scope: EventScope,
    pub message: String,
    pub level: EventLevel,
    /// Optional key/value context (row numbers, matched text, scores)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl InferenceEvent {
    pub fn new(
        component: impl Into<String>,
        scope: EventScope,
        message: impl Into<String>,
        level: EventLevel,
    ) -> Self {
        Self {
            component: component.into(),
            scope,
            message: message.into(),
            level,
            context: BTreeMap::new(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

impl PartialOrd for InferenceEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InferenceEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.scope
            .cmp(&other.scope)
            .then_with(|| self.component.cmp(&other.component))
            .then_with(|| self.message.cmp(&other.message))
    }
}

/// Accumulates events across a pipeline run
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<InferenceEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InferenceEvent) {
        self.events.push(event);
    }

    pub fn info(&mut self, component: &str, scope: EventScope, message: impl Into<String>) {
        self.push(InferenceEvent::new(component, scope, message, EventLevel::Info));
    }

    pub fn warn(&mut self, component: &str, scope: EventScope, message: impl Into<String>) {
        self.push(InferenceEvent::new(
            component,
            scope,
            message,
            EventLevel::Warning,
        ));
    }

    pub fn error(&mut self, component: &str, scope: EventScope, message: impl Into<String>) {
        self.push(InferenceEvent::new(
            component,
            scope,
            message,
            EventLevel::Error,
        ));
    }

    pub fn events(&self) -> &[InferenceEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.events.iter().any(|e| e.level == EventLevel::Error)
    }

    /// Events recorded for one sheet, in insertion order
    pub fn for_sheet<'a>(&'a self, sheet: &str) -> Vec<&'a InferenceEvent> {
        self.events
            .iter()
            .filter(|e| e.scope.sheet_name() == Some(sheet))
            .collect()
    }
}
