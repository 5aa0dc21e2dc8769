//! HTTP request parsing.
//!
//! This module turns the bytes read from a client connection into an
//! [`HttpRequest`] that routes and test handlers can inspect.

mod request;
mod method;
mod version;
mod headers;
mod error;
mod tests;

// Re-export public items
pub use request::HttpRequest;
pub use method::Method;
pub use version::HttpVersion;
pub use headers::Headers;
pub use error::{BodyError, Error};

// Re-export the parse functions
pub use request::{parse_request, parse_request_head};
pub(crate) use request::find_head_end;
