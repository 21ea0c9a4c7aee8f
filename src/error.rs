//! Error types
//!
//! Every fallible operation in the crate returns [`CratonResult`]. The binary
//! maps the error to an exit code and a single `ERROR:` line in `main`.

use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Errors surfaced by the shell, the session and the resource managers
#[derive(Debug, Error)]
pub enum CratonError {
    /// Bad or missing command-line arguments, reported by clap
    #[error("{0}")]
    Usage(#[from] clap::Error),

    /// The remote service answered with a non-success status
    #[error("{method} {url} failed with {status}{}", message_suffix(.message))]
    Request {
        method: Method,
        url: String,
        status: StatusCode,
        message: Option<String>,
    },

    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote service reports the entity as absent
    #[error("not found: {url}")]
    NotFound { url: String },

    /// The response body was malformed or missing its envelope
    #[error("unable to decode response: {0}")]
    Decode(String),

    /// Invalid or incomplete client configuration
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type used across the crate
pub type CratonResult<T> = Result<T, CratonError>;

impl CratonError {
    /// True when the remote reported the entity as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, CratonError::NotFound { .. })
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CratonError::Usage(e) => e.exit_code(),
            _ => 1,
        }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {}", m),
        None => String::new(),
    }
}
