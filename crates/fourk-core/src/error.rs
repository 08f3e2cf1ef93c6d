//! Error types for fourk-core

use thiserror::Error;

use crate::api::ApiError;

/// Result type alias using fourk-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fourk-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet writer error
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Dealer roster or profile configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Text-to-table parsing failed
    #[error("Transform failed: {0}")]
    Transform(String),

    /// FourK API error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A dealer refresh was cancelled before every fetch settled
    #[error("Dealer refresh was cancelled")]
    Cancelled,
}
