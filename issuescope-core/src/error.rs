//! Error types for issuescope-core

use thiserror::Error;

/// Main error type for the issuescope-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A run parameter required by an analysis was not provided
    ///
    /// The message is user-facing and printed verbatim.
    #[error("{message}")]
    MissingParameter {
        parameter: &'static str,
        message: &'static str,
    },

    /// No analysis registered under this name
    #[error("analysis not found: {0}")]
    UnknownAnalysis(String),

    /// No dataset path in config, env or flags
    #[error("no issue dataset configured; pass --data or set ISSUESCOPE_DATA_PATH")]
    DatasetNotConfigured,
}

impl Error {
    /// Whether this error means the run was misconfigured rather than broken.
    ///
    /// Configuration errors skip an analysis; they are never fatal.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Config(_) | Error::MissingParameter { .. })
    }
}

/// Result type alias for issuescope-core
pub type Result<T> = std::result::Result<T, Error>;
