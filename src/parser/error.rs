//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors that can occur during HTTP request parsing.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP method in the request is not a valid token.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The request path is invalid or missing.
    #[error("Invalid HTTP path")]
    InvalidPath,

    /// The request line is malformed (wrong format or missing components).
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// The HTTP version in the request is not supported.
    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),

    /// A required header is missing from the request.
    #[error("Required header is missing: {0}")]
    MissingHeader(String),

    /// A header in the request has an invalid format.
    #[error("Invalid header format")]
    InvalidHeaderFormat,

    /// The request is empty.
    #[error("Empty request")]
    EmptyRequest,

    /// The request body could not be read.
    #[error(transparent)]
    Body(#[from] BodyError),

    /// Error parsing JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Failures reading the body that follows a request head.
///
/// These are recorded on the request instead of failing the parse, so the
/// handler that owns the request decides how to report them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BodyError {
    /// The connection ended before `Content-Length` bytes arrived.
    #[error("unexpected end of body: expected {expected} bytes, received {received}")]
    Incomplete { expected: usize, received: usize },

    /// The `Content-Length` header is not a valid length.
    #[error("invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// Only identity bodies are supported.
    #[error("unsupported Transfer-Encoding: {0}")]
    UnsupportedTransferEncoding(String),

    /// The declared body exceeds the configured limit.
    #[error("body of {length} bytes exceeds the limit of {limit} bytes")]
    TooLarge { length: usize, limit: usize },
}
