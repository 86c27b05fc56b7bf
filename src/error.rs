//! Error types for resynth
//!
//! Every failure is fatal and surfaced immediately: all inputs are
//! deterministic and validated up front, so nothing here is retried.

use thiserror::Error;

/// Result type alias using ResynthError
pub type Result<T> = std::result::Result<T, ResynthError>;

/// All possible errors in resynth
#[derive(Error, Debug)]
pub enum ResynthError {
    /// Rejected at construction time; the pipeline never starts.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("Failed to read source: {path}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Failed to write sink: {path}")]
    SinkUnavailable {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The transform primitive produced something it never should for a
    /// well-formed block. Internal invariant violation, not retried.
    #[error("Transform failure: {details}")]
    TransformFailure { details: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ResynthError {
    /// Short machine-readable code for this error type
    pub fn kind(&self) -> &'static str {
        match self {
            ResynthError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            ResynthError::SourceUnavailable { .. } => "SOURCE_UNAVAILABLE",
            ResynthError::SinkUnavailable { .. } => "SINK_UNAVAILABLE",
            ResynthError::TransformFailure { .. } => "TRANSFORM_FAILURE",
            ResynthError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// True when the failure is caller error rather than an environmental one
    pub fn is_usage_error(&self) -> bool {
        matches!(self, ResynthError::InvalidConfiguration { .. })
    }
}
