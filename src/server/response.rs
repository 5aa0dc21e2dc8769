//! HTTP response types and utilities.

use std::fmt;
use std::io;

use log::warn;

use crate::parser::Headers;

/// An HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const ACCEPTED: StatusCode = StatusCode(202);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    pub const FORBIDDEN: StatusCode = StatusCode(403);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    pub const IM_A_TEAPOT: StatusCode = StatusCode(418);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const NOT_IMPLEMENTED: StatusCode = StatusCode(501);
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode(503);

    /// The numeric code.
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Whether the code fits a status line: three digits, `100..=999`.
    pub fn is_valid(&self) -> bool {
        (100..=999).contains(&self.0)
    }

    /// Get the reason phrase for this status code.
    ///
    /// Codes without a registered phrase return an empty string.
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            418 => "I'm a teapot",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            _ => "",
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The sink a handler writes its response into.
pub trait ResponseWriter {
    /// Set the response status. Only the first call takes effect.
    fn write_status(&mut self, status: StatusCode);

    /// Append a header value, keeping any existing values.
    fn add_header(&mut self, name: &str, value: &str);

    /// Append bytes to the body. Writing before any status commits the
    /// default status.
    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Represents an HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The HTTP status code
    pub status: StatusCode,
    /// The HTTP headers
    pub headers: Headers,
    /// The response body
    pub body: Vec<u8>,
    status_written: bool,
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

impl HttpResponse {
    /// Create a new HTTP response with the given status code.
    ///
    /// The status stays open to the first [`ResponseWriter::write_status`].
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
            status_written: false,
        }
    }

    /// Set the response body with a string.
    pub fn with_body_string(self, body: impl Into<String>) -> Self {
        self.with_body_bytes(body.into().into_bytes())
    }

    /// Set the response body with bytes.
    pub fn with_body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.remove(&name);
        self.headers.add(name, value);
        self
    }

    /// Set the content type.
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    /// Convert the response to bytes.
    ///
    /// `Content-Length` is always computed from the body, and every response
    /// closes its connection.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        // Add the status line
        let status_line = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status.as_u16(),
            self.status.reason_phrase()
        );
        bytes.extend_from_slice(status_line.as_bytes());

        bytes.extend_from_slice(b"Server: testhttp-rs\r\n");
        for (name, values) in self.headers.iter() {
            if name.eq_ignore_ascii_case("Content-Length") || name.eq_ignore_ascii_case("Connection") {
                warn!("response header {name}: {values:?} replaced by the server's own framing");
                continue;
            }
            for value in values {
                let header_line = format!("{name}: {value}\r\n");
                bytes.extend_from_slice(header_line.as_bytes());
            }
        }
        let framing = format!("Content-Length: {}\r\nConnection: close\r\n", self.body.len());
        bytes.extend_from_slice(framing.as_bytes());

        // Add the empty line that separates headers from body
        bytes.extend_from_slice(b"\r\n");

        bytes.extend_from_slice(&self.body);

        bytes
    }
}

impl ResponseWriter for HttpResponse {
    fn write_status(&mut self, status: StatusCode) {
        if self.status_written {
            warn!(
                "superfluous status {status} ignored, response already has status {current}",
                current = self.status
            );
            return;
        }
        self.status = status;
        self.status_written = true;
    }

    fn add_header(&mut self, name: &str, value: &str) {
        self.headers.add(name, value);
    }

    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.status_written = true;
        self.body.extend_from_slice(bytes);
        Ok(())
    }
}
