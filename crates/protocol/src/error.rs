//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while decoding a snapshot message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Json(#[source] serde_json::Error),

    #[error("Column {field:?} is not a sequence")]
    ColumnNotSequence { field: String },

    #[error("Column {field:?} has {found} rows, expected {expected}")]
    ColumnLengthMismatch {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("Snapshot shape mismatch: {0}")]
    Shape(#[source] serde_json::Error),
}
