//! Error types for the gridroute crate

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Position;

/// Main error type for the gridroute crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("map file '{}' not found", path.display())]
    MapNotFound { path: PathBuf },

    #[error("map contains no rows")]
    EmptyMap,

    #[error("map row {row} has {got} cells, expected {expected}")]
    RaggedMap {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid number '{token}' at row {row}, column {col}")]
    InvalidNumber {
        token: String,
        row: usize,
        col: usize,
    },

    #[error("invalid node code {code} at row {row}, column {col} (expected -1, 0 or 1)")]
    InvalidNodeCode { code: f64, row: usize, col: usize },

    #[error("position {position} is out of range for a {rows}x{cols} grid")]
    OutOfRange {
        position: Position,
        rows: usize,
        cols: usize,
    },

    #[error("traffic destination {position} is not a destination node")]
    NotADestination { position: Position },

    #[error("invalid {name} {value} (expected {expected})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("unknown {kind} '{input}'. Expected one of: {expected}")]
    UnknownVariant {
        kind: &'static str,
        input: String,
        expected: String,
    },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    /// Whether this error comes from a bad map or bad parameters, as opposed
    /// to a runtime query.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::MapNotFound { .. }
                | Error::EmptyMap
                | Error::RaggedMap { .. }
                | Error::InvalidNumber { .. }
                | Error::InvalidNodeCode { .. }
                | Error::NotADestination { .. }
                | Error::InvalidParameter { .. }
                | Error::UnknownVariant { .. }
        )
    }
}
