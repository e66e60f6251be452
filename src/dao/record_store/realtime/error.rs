//! Error types shared by the realtime database implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`RealtimeDaoError`] failures.
pub type RealtimeResult<T> = Result<T, RealtimeDaoError>;

/// Failures that can occur while interacting with the realtime database.
#[derive(Debug, Error)]
pub enum RealtimeDaoError {
    /// Required environment variable is missing.
    #[error("missing realtime database environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The configured database URL cannot address child paths.
    #[error("invalid realtime database URL `{url}`")]
    InvalidUrl { url: String },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build realtime database client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request to a record path could not be sent.
    #[error("failed to send realtime database request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The database returned an unexpected status code.
    #[error("unexpected realtime database response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode realtime database response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}
