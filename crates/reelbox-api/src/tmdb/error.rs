//! `ApiError` - failures surfaced by the TMDB client.

use thiserror::Error;

/// Error returned by TMDB API operations.
#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ApiError {
    /// The service answered with a non-success HTTP status.
    #[error("request to {path} failed: HTTP {status} {status_text}{}", detail_suffix(.message))]
    Request {
        /// Request path relative to the API base.
        path: String,
        /// HTTP status code.
        status: u16,
        /// HTTP status text (canonical reason phrase).
        status_text: String,
        /// `status_message` from the TMDB error body, when present.
        message: Option<String>,
    },

    /// The request could not be completed or the body could not be parsed.
    #[error("network error on {path}: {source}")]
    Network {
        /// Request path relative to the API base.
        path: String,
        /// Underlying transport or body failure.
        #[source]
        source: NetworkFailure,
    },

    /// The request path could not be joined onto the base URL.
    #[error("invalid request path {path}: {source}")]
    InvalidPath {
        /// Offending path.
        path: String,
        /// URL parse failure.
        #[source]
        source: url::ParseError,
    },
}

/// Transport-level failure underlying [`ApiError::Network`].
#[derive(Debug, Error)]
pub enum NetworkFailure {
    /// Connection, TLS, or body read failure.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// The response body was not the expected JSON.
    #[error("malformed response body: {0}")]
    Body(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status code for [`ApiError::Request`].
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            Self::Network { .. } | Self::InvalidPath { .. } => None,
        }
    }

    /// HTTP status text for [`ApiError::Request`].
    #[must_use]
    pub fn status_text(&self) -> Option<&str> {
        match self {
            Self::Request { status_text, .. } => Some(status_text),
            Self::Network { .. } | Self::InvalidPath { .. } => None,
        }
    }

    /// Whether this is a non-success HTTP status.
    #[must_use]
    pub const fn is_request(&self) -> bool {
        matches!(self, Self::Request { .. })
    }

    /// Whether this is a transport or parse failure.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

#[allow(clippy::ref_option)]
fn detail_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map_or_else(String::new, |m| format!(" ({m})"))
}
