use std::path::PathBuf;
use thiserror::Error;

use crate::convert::ConversionReport;
use crate::validation::ValidationReport;

/// The main error type for iiifconv operations.
#[derive(Debug, Error)]
pub enum IiifError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse IIIF JSON from {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write IIIF JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse config from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Cannot derive v3 id from '{id}': {message}")]
    IdDerivation { id: String, message: String },

    #[error("Conversion of {} would lose information (use --allow-lossy to proceed)", report.source_id)]
    LossyConversion { report: Box<ConversionReport> },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("Batch finished with {failed} failed file(s)")]
    BatchFailed { failed: usize },

    #[error("Failed to traverse {path}: {message}")]
    Traversal { path: PathBuf, message: String },

    #[error("Unsupported document kind: {0}")]
    UnsupportedKind(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
