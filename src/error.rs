//! Error types for arxiv-digest.
//!
//! Library code returns these; only the run loop decides whether an error
//! aborts the process, degrades a single item, or is logged and dropped.

/// Errors raised while wiring the pipeline's collaborators.
///
/// Once a run has started, failures are absorbed by the run loop instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Configuration-related errors. These abort the process.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Paper listing service errors.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Listing request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Listing service returned HTTP {status}")]
    Http { status: u16, retry_after: Option<u64> },

    #[error("Listing response contained no records: {reason}")]
    NoRecords { reason: String },

    #[error("Malformed listing XML: {0}")]
    Xml(String),

    #[error("Failed to write metadata file: {0}")]
    Metadata(String),
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        SourceError::Xml(err.to_string())
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        SourceError::Metadata(err.to_string())
    }
}

/// Completion endpoint errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Digest delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Failed to write digest to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid mail address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SMTP send failed: {0}")]
    Smtp(String),
}

/// Result type alias for arxiv-digest.
pub type Result<T> = std::result::Result<T, Error>;
