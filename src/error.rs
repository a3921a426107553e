//! Error definitions for the refresh pipeline.

use thiserror::Error;

/// Errors that can occur during a refresh cycle.
///
/// None of these are fatal: the caller logs them and the previous
/// configuration stays in effect.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// Server answered with something other than 200 or 304.
    #[error("Could not get configuration file: server returned status {status}")]
    RequestFailed { status: u16 },

    /// Either a 304 or a candidate identical to the live configuration.
    #[error("Configuration remains unchanged")]
    Unchanged,

    /// The document body is not valid YAML for the schema.
    #[error("Failed to parse configuration document: {0}")]
    ParseFailed(#[source] serde_yaml::Error),

    /// The document parsed but is not usable.
    #[error("Invalid configuration file: {0}")]
    InvalidConfiguration(String),

    /// A trusted CA entry could not be added to the trust pool.
    #[error("Trusted CA #{index} rejected: {reason}")]
    TrustPool { index: usize, reason: String },

    /// TLS client configuration could not be built for front routing.
    #[error("Front routing error: {0}")]
    Routing(String),

    /// Transport-level failure (connect, timeout, body read).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Body is not a valid gzip stream.
    #[error("Failed to decompress configuration body: {0}")]
    Decompress(#[source] std::io::Error),

    /// Body exceeds the configured size limit.
    #[error("Configuration body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// Outbound request could not be constructed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl RefreshError {
    /// True for the expected "nothing to do" outcome.
    pub fn is_unchanged(&self) -> bool {
        matches!(self, RefreshError::Unchanged)
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RefreshError::RequestFailed { .. } => "request_failed",
            RefreshError::Unchanged => "unchanged",
            RefreshError::ParseFailed(_) => "parse_failed",
            RefreshError::InvalidConfiguration(_) => "invalid_configuration",
            RefreshError::TrustPool { .. } => "trust_pool",
            RefreshError::Routing(_) => "routing",
            RefreshError::Transport(_) => "transport",
            RefreshError::Decompress(_) => "decompress",
            RefreshError::BodyTooLarge { .. } => "body_too_large",
            RefreshError::InvalidRequest(_) => "invalid_request",
        }
    }
}

/// Result type for refresh operations.
pub type RefreshResult<T> = Result<T, RefreshError>;
