//! Error types for the hCaptcha guard.

use thiserror::Error;

/// Raised while building the middleware. Fatal to setup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The shared secret is empty
    #[error("mandatory parameter: secret key is missing")]
    MissingSecret,

    /// The default HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Failure of a single siteverify round trip.
///
/// Never surfaced to the end user: the gate folds every variant into a
/// rejection, exactly like a genuine `success: false`.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Connection refused, DNS failure, timeout, ...
    #[error("siteverify request failed: {0}")]
    Transport(String),

    /// The reply body could not be read
    #[error("cannot read siteverify response body: {0}")]
    Body(String),

    /// The reply body is not a siteverify JSON document
    #[error("cannot parse siteverify response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl VerifyError {
    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Body(_) => "body",
            Self::Decode(_) => "decode",
        }
    }
}
