//! Error types for the catalog client.

use thiserror::Error;

/// Errors returned by a [`SessionProvider`](crate::SessionProvider).
///
/// The header builder never surfaces these; they only decide whether a
/// request goes out signed in or anonymous.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Nobody is signed in.
    #[error("No current user")]
    NoCurrentUser,

    /// The stored session's ID token has expired.
    #[error("Session expired at {0}")]
    Expired(chrono::DateTime<chrono::Utc>),

    /// The session store could not be read.
    #[error("Session storage error: {0}")]
    Storage(String),

    /// The stored session or its token could not be parsed.
    #[error("Malformed session: {0}")]
    Malformed(String),
}

/// Errors that can occur when talking to the catalog API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No endpoint is registered under this API name.
    #[error("API {0} does not exist")]
    UnknownApi(String),

    /// A configured endpoint or request path does not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP request failed.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("Request failed with status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// Server returned an unparseable or unexpected body.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}
