//! Error taxonomy for the inference pipeline

use thiserror::Error;

/// Errors raised while inferring structure or synthesizing a configuration.
///
/// Most variants are recoverable at the sheet boundary: the orchestrator logs
/// them and moves on to the next sheet.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("no header keywords found in sheet '{sheet}' within rows 1-{window}")]
    MissingHeaderRow { sheet: String, window: u32 },

    #[error("no aggregation formula or total label found in sheet '{sheet}'")]
    FooterNotFound { sheet: String },

    #[error("header '{text}' has no column-id mapping")]
    UnmappedHeader { text: String },

    #[error("conflicting span signals for header '{text}' in sheet '{sheet}'")]
    AmbiguousSpan { sheet: String, text: String },

    #[error(
        "overlap resolution in sheet '{sheet}' pushed a header to column {col}, past the supported width"
    )]
    OverlapUnresolvable { sheet: String, col: u32 },

    #[error("unreadable font data at {cell} in sheet '{sheet}'")]
    InvalidFontData { sheet: String, cell: String },

    #[error("configuration for sheet '{sheet}' failed validation: {reason}")]
    ConfigValidation { sheet: String, reason: String },
}
