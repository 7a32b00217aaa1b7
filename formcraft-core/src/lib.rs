//! Core analysis library for formcraft.
//!
//! Reads a filled-in shipping workbook (invoice, packing list, contract),
//! infers its structure — header rows, column spans, footer location, number
//! formats, fonts, row heights — and synthesizes a declarative layout
//! configuration a form writer can replay onto a blank template.

pub mod artifact;
pub mod config;
pub mod error;
pub mod events;
pub mod footer;
pub mod heuristics;
pub mod layout;
pub mod mapping;
pub mod reader;
pub mod scanner;
pub mod spans;
pub mod style;
pub mod synth;

pub use artifact::{ConfigArtifact, SheetConfiguration};
pub use config::ToolConfig;
pub use error::AnalyzeError;
pub use events::{EventLevel, EventLog, EventScope, InferenceEvent};
pub use mapping::{AutoConfirm, Confirmation, ConfirmationPort, MappingStore};
pub use reader::{read_workbook, Workbook};
pub use synth::ConfigSynthesizer;
