use std::io;

use crate::Method;

/// The error type produced by the underlying HTTP transport.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// An error encountered while talking to the API or converting its data.
///
/// Status codes are not errors at the dispatch level: a 4xx or 5xx response
/// is returned to the caller as a [Response](crate::Response). Typed
/// requests (see [ApiResponse](crate::ApiResponse)) turn non-2xx responses
/// into [Error::Api].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request did not complete: connection, DNS, TLS or timeout
    /// failure. No response is available.
    #[error("{method} request to {url} failed: {source}")]
    Transport {
        /// The method of the failed call.
        method: Method,
        /// The URL of the failed call.
        url: String,
        /// The underlying transport error.
        source: TransportError,
    },
    /// The method is not one of GET, POST, PUT, PATCH or DELETE. Nothing was
    /// sent.
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
    /// A typed request received a non-2xx response.
    #[error("{status}: {message}")]
    Api {
        /// The HTTP status of the response.
        status: http::StatusCode,
        /// The error message from the response body.
        message: String,
    },
    /// The response body did not have the expected structure.
    #[error("Invalid response ({0})")]
    InvalidResponse(http::StatusCode),
    /// The data could not be converted into a table.
    #[error("Data conversion failed: {0}")]
    DataShape(String),
    /// A named resource could not be resolved.
    #[error("{0} not found")]
    NotFound(String),
    /// An argument was out of range or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The call resolved to an invalid URI.
    #[error("Invalid URI")]
    InvalidUri(#[from] http::uri::InvalidUri),
    /// The request could not be built, e.g. the token is not a valid header
    /// value.
    #[error("Invalid request")]
    Http(#[from] http::Error),
    /// A payload could not be serialized.
    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),
    /// Writing an export or opening the log file failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Writing CSV failed.
    #[error("CSV export failed")]
    Csv(#[from] csv::Error),
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] crate::config::Error),
}

impl Error {
    /// The HTTP status associated with the error, if there is one.
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            Error::Api { status, .. } | Error::InvalidResponse(status) => Some(*status),
            _ => None,
        }
    }
}
