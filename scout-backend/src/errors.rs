//! Error type for the backend client.

use std::fmt;

/// Anything that can go wrong talking to the REST backend.
#[derive(Debug)]
pub enum BackendError {
    /// Sign-in or token refresh was rejected.
    Auth(String),
    /// The server answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body was not what we expected.
    Decode(String),
    /// The request never completed (DNS, TLS, timeout, …).
    Request(reqwest::Error),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(msg)              => write!(f, "backend sign in failed: {msg}"),
            Self::Status { status, body } => write!(f, "backend returned HTTP {status}: {body}"),
            Self::Decode(msg)            => write!(f, "could not decode backend response: {msg}"),
            Self::Request(e)             => write!(f, "backend request failed: {e}"),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(e) => Some(e),
            _                => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Request(e)
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self { Self::Decode(e.to_string()) }
}

pub type Result<T> = std::result::Result<T, BackendError>;
