//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::str::FromStr;
use serde::de::DeserializeOwned;

use crate::parser::error::{BodyError, Error};
use crate::parser::headers::Headers;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Represents an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target as sent on the request line, including the query
    pub path: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers
    pub headers: Headers,
    /// Query parameters parsed from the path
    pub query_params: HashMap<String, String>,
    body: Vec<u8>,
    body_error: Option<BodyError>,
}

impl HttpRequest {
    /// Create a new HTTP request with an empty body.
    ///
    /// # Arguments
    ///
    /// * `method` - The HTTP method
    /// * `path` - The request target
    /// * `version` - The HTTP version
    /// * `headers` - The HTTP headers
    pub fn new(method: Method, path: impl Into<String>, version: HttpVersion, headers: Headers) -> Self {
        let path = path.into();
        // Parse query parameters from the path
        let query_params: HashMap<String, String> = path
            .split_once('?')
            .map(|(_, query)| query
                .split('&')
                .filter(|s| !s.is_empty())
                .map(|pair| {
                    if let Some((k, v)) = pair.split_once('=') {
                        (k.to_string(), v.to_string())
                    } else {
                        (pair.to_string(), String::new())
                    }
                })
                .collect())
            .unwrap_or_default();

        Self {
            method,
            path,
            version,
            headers,
            query_params,
            body: Vec::new(),
            body_error: None,
        }
    }

    /// Create a new HTTP request with a body, bypassing any framing headers.
    pub fn with_body(
        method: Method,
        path: impl Into<String>,
        version: HttpVersion,
        headers: Headers,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        let mut request = Self::new(method, path, version, headers);
        request.body = body.into();
        request
    }

    /// The request body, or the error hit while reading it.
    pub fn body(&self) -> Result<&[u8], BodyError> {
        match &self.body_error {
            Some(err) => Err(err.clone()),
            None => Ok(&self.body),
        }
    }

    /// The declared body length.
    ///
    /// Returns `None` when the request carries no `Content-Length`; fails if
    /// the length is malformed or the body uses a transfer coding.
    pub fn content_length(&self) -> Result<Option<usize>, BodyError> {
        if let Some(coding) = self
            .headers
            .get_all("Transfer-Encoding")
            .iter()
            .find(|coding| !coding.trim().eq_ignore_ascii_case("identity"))
        {
            return Err(BodyError::UnsupportedTransferEncoding(coding.clone()));
        }

        let mut length = None;
        for value in self.headers.get_all("Content-Length") {
            let parsed = value
                .trim()
                .parse::<usize>()
                .map_err(|_| BodyError::InvalidContentLength(value.clone()))?;
            match length {
                Some(previous) if previous != parsed => {
                    return Err(BodyError::InvalidContentLength(value.clone()));
                }
                _ => length = Some(parsed),
            }
        }
        Ok(length)
    }

    /// Attach the bytes that followed the request head, applying the framing
    /// declared by the headers.
    ///
    /// Framing failures do not abort parsing: they are kept and returned by
    /// [`HttpRequest::body`].
    pub fn attach_body(&mut self, mut bytes: Vec<u8>) {
        match self.content_length() {
            Ok(Some(expected)) if bytes.len() < expected => {
                self.body_error = Some(BodyError::Incomplete {
                    expected,
                    received: bytes.len(),
                });
                self.body = bytes;
            }
            Ok(Some(expected)) => {
                bytes.truncate(expected);
                self.body = bytes;
            }
            Ok(None) => self.body = bytes,
            Err(err) => self.body_error = Some(err),
        }
    }

    pub(crate) fn fail_body(&mut self, err: BodyError) {
        self.body_error = Some(err);
    }

    /// Get the first value of a header (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Parse the request body as JSON.
    ///
    /// # Returns
    ///
    /// The parsed JSON value, or an error if the body is unreadable or not valid JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        // Check if the Content-Type header is application/json
        if !self.is_json() {
            return Err(Error::MissingHeader("Content-Type: application/json".to_string()));
        }

        let json = serde_json::from_slice(self.body()?)?;
        Ok(json)
    }

    /// Check if the Content-Type header is application/json.
    pub fn is_json(&self) -> bool {
        self.get_header("Content-Type")
            .is_some_and(|content_type| content_type.starts_with("application/json"))
    }

    /// Get a query parameter value.
    pub fn get_query_param(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Check if a query parameter exists.
    pub fn has_query_param(&self, name: &str) -> bool {
        self.query_params.contains_key(name)
    }
}

/// Find the end of the request head, including the blank line.
pub(crate) fn find_head_end(input: &[u8]) -> Option<usize> {
    input
        .windows(HEAD_TERMINATOR.len())
        .position(|window| window == HEAD_TERMINATOR)
        .map(|pos| pos + HEAD_TERMINATOR.len())
}

/// Parse the request line and headers from a byte slice.
///
/// # Returns
///
/// The request with an empty body, and the number of bytes the head occupied.
/// Input without a terminating blank line is parsed as a head in full.
pub fn parse_request_head(input: &[u8]) -> Result<(HttpRequest, usize), Error> {
    let head_len = find_head_end(input).unwrap_or(input.len());

    let input_str = match std::str::from_utf8(&input[..head_len]) {
        Ok(s) => s,
        Err(_) => return Err(Error::MalformedRequestLine("Invalid UTF-8".to_string())),
    };

    // Split the input into lines
    let mut lines = input_str.lines();

    // Parse the request line
    let request_line = match lines.next() {
        Some(line) if !line.trim().is_empty() => line,
        _ => return Err(Error::EmptyRequest),
    };

    // Split the request line into method, path, and version
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    }

    let method = Method::from_str(parts[0])?;

    let path = parts[1].to_string();
    if path.is_empty() {
        return Err(Error::InvalidPath);
    }

    let version = HttpVersion::from_str(parts[2])?;

    // Parse the headers
    let mut headers = Headers::new();
    for line in lines {
        // Empty line indicates the end of headers
        if line.is_empty() {
            break;
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(Error::InvalidHeaderFormat);
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidHeaderFormat);
        }

        headers.add(name, value.trim());
    }

    // Check for required headers
    if version.requires_host() && !headers.contains_key("Host") {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    Ok((HttpRequest::new(method, path, version, headers), head_len))
}

/// Parse a complete HTTP request (head and body) from a byte slice.
///
/// Body framing problems are recorded on the request rather than returned
/// here; see [`HttpRequest::body`].
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    let (mut request, head_len) = parse_request_head(input)?;
    request.attach_body(input[head_len..].to_vec());
    Ok(request)
}
