//! Custom error types for rustlitsearch.
//!
//! Provider misbehavior never surfaces here: the pipeline contains it and
//! reports a [`crate::pipeline::StopReason`] instead. These variants cover
//! request validation, client setup and export.

use thiserror::Error;

/// Main error type for rustlitsearch operations.
#[derive(Debug, Error)]
pub enum LitSearchError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message
        message: String,
    },

    /// Provider response or item could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// XLSX export error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias using `LitSearchError`
pub type Result<T> = std::result::Result<T, LitSearchError>;
