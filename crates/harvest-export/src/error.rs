//! Export error types.

use harvest_core::HarvestError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while writing harvested records.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Output file could not be created or written
    #[error("failed to write {path}: {source}")]
    Io {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The CSV encoder failed
    #[error("failed to write CSV to {path}: {source}")]
    Csv {
        /// Destination path
        path: PathBuf,
        /// Underlying csv error
        #[source]
        source: csv::Error,
    },

    /// A row could not be serialized
    #[error("failed to serialize row {row}: {source}")]
    Serialization {
        /// Zero-based row index
        row: usize,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },
}

impl From<ExportError> for HarvestError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Io { source, .. } => HarvestError::Io(source),
            ExportError::Csv { .. } | ExportError::Serialization { .. } => {
                HarvestError::Export(err.to_string())
            }
        }
    }
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
