//! Error types for BCRP lookups.

/// Result type for BCRP operations.
pub type BcrpResult<T> = Result<T, BcrpError>;

/// Error types that can occur while querying the BCRP statistics service.
#[derive(Debug, thiserror::Error)]
pub enum BcrpError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("Upstream returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// Response body had no JSON payload after the leading noise.
    #[error("Series payload not found in response body")]
    MissingPayload,

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Metadata catalog could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Metadata catalog lacks a column we project.
    #[error("Metadata column missing: {0}")]
    MissingColumn(&'static str),

    /// Request period is not `YYYY`, `YYYY-M` or `YYYY-M-D`.
    #[error("Invalid period '{0}', expected YYYY, YYYY-M or YYYY-M-D")]
    InvalidPeriod(String),

    /// Upstream period label could not be turned into a date.
    #[error("Unrecognized period label '{0}'")]
    UnrecognizedPeriod(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configured catalog encoding is not a known label.
    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),
}

impl BcrpError {
    /// Whether the failure came from the network or the remote service
    /// rather than from the caller's input.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::MissingPayload | Self::Json(_) | Self::Csv(_)
        )
    }
}
