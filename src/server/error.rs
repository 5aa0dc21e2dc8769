//! Error types for the HTTP server.

use thiserror::Error;

use crate::parser::{BodyError, Error as ParserError, Headers, Method};

/// Errors that can occur while serving or configuring a test server.
///
/// Request-level variants are what handlers pass to an
/// [`ErrorHandler`](crate::server::ErrorHandler); the rest are returned from
/// setup and lifecycle calls.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The request head did not end within the configured limit.
    #[error("Request head exceeds {0} bytes")]
    HeadTooLarge(usize),

    /// The request headers are not a superset of the required headers.
    #[error("Required headers does not match with the actual headers.\nRequired:\n{required}\nActual:\n{actual}")]
    HeaderMismatch { required: Headers, actual: Headers },

    /// The request body differs from the required body.
    #[error(
        "Required request body does not match with the actual request body.\nRequired:\n{}\nActual:\n{}",
        String::from_utf8_lossy(.required),
        String::from_utf8_lossy(.actual)
    )]
    BodyMismatch { required: Vec<u8>, actual: Vec<u8> },

    /// The request body could not be read.
    #[error("Cannot read request body: {0}")]
    BodyRead(#[source] BodyError),

    /// The response body could not be written.
    #[error("Failed to write response body: {0}")]
    BodyWrite(#[source] std::io::Error),

    /// Requested resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Method not allowed for the requested resource.
    #[error("Method {0} not allowed for path: {1}")]
    MethodNotAllowed(Method, String),

    /// A route pattern is not a valid regular expression.
    #[error("Invalid route pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A required query parameter is missing or has another value.
    #[error("Required query parameter {name}={required} does not match, actual: {actual:?}")]
    QueryMismatch {
        name: String,
        required: String,
        actual: Option<String>,
    },

    /// Routes cannot be added once the server is listening.
    #[error("Test server is already started")]
    AlreadyStarted,

    /// The server has not been started yet.
    #[error("Test server is not started")]
    NotStarted,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
