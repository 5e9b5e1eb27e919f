//! Error types for the accounts API client.
//!
//! # Design
//! Every failure surfaces as one `Error` value whose `kind()` is an explicit
//! `ErrorKind`, so callers branch on `NotFound` / `Conflict` without parsing
//! messages. Status errors keep the raw code, reason phrase, URL and body for
//! diagnosis. Nothing here retries; that is the caller's decision.

use std::fmt;

use crate::account::ValidationError;
use crate::http::HttpMethod;

/// Programmatic classification of an `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected client-side before anything was sent.
    Validation,
    /// The request payload could not be serialized.
    Encoding,
    /// The target URL could not be assembled.
    InvalidUrl,
    /// Connection failure, timeout or cancellation.
    Transport,
    /// The server answered 404.
    NotFound,
    /// The server answered 409.
    Conflict,
    /// The server answered with any other status than the expected one.
    Unexpected,
    /// The response body did not match the expected envelope shape.
    Decoding,
    /// Invalid client configuration.
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation failed",
            ErrorKind::Encoding => "encoding failed",
            ErrorKind::InvalidUrl => "invalid url",
            ErrorKind::Transport => "transport failed",
            ErrorKind::NotFound => "specified resource does not exist",
            ErrorKind::Conflict => "resource conflict",
            ErrorKind::Unexpected => "unexpected status",
            ErrorKind::Decoding => "decoding failed",
            ErrorKind::Config => "invalid configuration",
        };
        f.write_str(s)
    }
}

/// Errors returned by `ApiClient` calls and the `Request` build/parse steps.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid account information provided: {0}")]
    Validation(#[from] ValidationError),

    #[error("marshalling request failed: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("invalid request url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{method} {url}: http request failed: {source}")]
    Transport {
        method: HttpMethod,
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("unexpected response status {status} ({status_text}) from {url}: {kind}")]
    Status {
        kind: ErrorKind,
        status: u16,
        status_text: String,
        url: String,
        body: String,
    },

    #[error("unmarshalling response from {url} failed: {source}")]
    Decoding {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Cause of a `Error::Transport`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("call cancelled by caller")]
    Cancelled,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Encoding(_) => ErrorKind::Encoding,
            Error::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Error::Transport { .. } => ErrorKind::Transport,
            Error::Status { kind, .. } => *kind,
            Error::Decoding { .. } => ErrorKind::Decoding,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// HTTP status of a status-classified error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Error::Transport {
                source: TransportError::Cancelled,
                ..
            }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Transport {
                source: TransportError::Http(e),
                ..
            } if e.is_timeout()
        )
    }
}

/// Map a status code that did not match the expected one to its kind.
pub fn classify(status: u16) -> ErrorKind {
    match status {
        404 => ErrorKind::NotFound,
        409 => ErrorKind::Conflict,
        _ => ErrorKind::Unexpected,
    }
}
