//! Error types for the eventshape library.
//!
//! Data-shape problems are never errors here: malformed values fail their
//! rule, thin samples produce low-confidence profiles, and missing
//! parameters show up as report statuses. What remains is I/O, decoding,
//! and invalid configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for eventshape operations.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source line could not be decoded into a row.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid delimiter detected or specified.
    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Invalid configuration. Raised before any batch is processed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be decoded.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for eventshape operations.
pub type Result<T> = std::result::Result<T, ShapeError>;
