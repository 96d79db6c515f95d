//! Error types for the webinar API probe.
//!
//! # Design
//! Every internal step (URL joining, request building, the network round-trip,
//! envelope decoding) returns `Result<_, ProbeError>`. The public
//! compare/extract/report operations on `ApiClient` are the only place these
//! errors are swallowed, turning them into `false` / `None` so a batch of
//! independent cases always runs to completion.

use thiserror::Error;

/// Errors produced while building, sending, or decoding a probe call.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The descriptor names a method other than GET or POST. Raised before any
    /// network attempt.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The configured origin or a joined endpoint is not a valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Connection refused, DNS failure, timeout, or a broken response stream.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body is not a JSON object with an integer `error_code`.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The login endpoint answered with a nonzero `error_code`.
    #[error("login rejected with error_code {error_code}")]
    LoginRejected { error_code: i64 },

    /// The login endpoint reported success but sent no usable token.
    #[error("login response carried no token")]
    MissingToken,
}

impl From<ureq::Error> for ProbeError {
    fn from(err: ureq::Error) -> Self {
        ProbeError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for ProbeError {
    fn from(err: url::ParseError) -> Self {
        ProbeError::InvalidUrl(err.to_string())
    }
}
