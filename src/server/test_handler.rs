//! A request/response fixture.

use std::sync::Arc;

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::parser::{Headers, HttpRequest};
use crate::server::error::Error;
use crate::server::error_handler::{default_error_handler, ErrorHandler, SharedErrorHandler};
use crate::server::handler::Handler;
use crate::server::response::{ResponseWriter, StatusCode};

/// Checks a request against required headers, query parameters and body,
/// then answers with a canned status, headers and body.
///
/// Any mismatch is reported to the handler's [`ErrorHandler`] and no canned
/// response is written. Without an explicit error handler the
/// [`BasicErrorHandler`](crate::server::BasicErrorHandler) is used.
///
/// ```
/// use testhttp_rs::{StatusCode, TestHandler};
///
/// let handler = TestHandler::new()
///     .with_request_header("Auth", "Pass")
///     .with_response_status(StatusCode::CREATED)
///     .with_response_body("done");
/// assert_eq!(handler.response_status(), StatusCode::CREATED);
/// ```
#[derive(Clone)]
pub struct TestHandler {
    request_headers: Headers,
    request_query: Vec<(String, String)>,
    request_body: Vec<u8>,
    request_json: Option<Value>,

    response_status: Option<StatusCode>,
    response_headers: Headers,
    response_body: Option<Vec<u8>>,

    error_handler: SharedErrorHandler,
}

impl Default for TestHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHandler {
    pub fn new() -> Self {
        Self {
            request_headers: Headers::new(),
            request_query: Vec::new(),
            request_body: Vec::new(),
            request_json: None,
            response_status: None,
            response_headers: Headers::new(),
            response_body: None,
            error_handler: default_error_handler(),
        }
    }

    /// Report mismatches to `error_handler`.
    pub fn with_error_handler(mut self, error_handler: SharedErrorHandler) -> Self {
        self.error_handler = error_handler;
        self
    }

    /// Require the request to carry `value` for header `name`.
    ///
    /// Repeating a pair adds it again; matching ignores the duplicate.
    pub fn with_request_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_headers.add(name, value);
        self
    }

    /// Require every value of every header in `headers`.
    pub fn with_request_headers<K, V, I>(mut self, headers: impl IntoIterator<Item = (K, I)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = V>,
    {
        self.request_headers.extend(headers);
        self
    }

    /// Require query parameter `name` to be present with `value`.
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_query.push((name.into(), value.into()));
        self
    }

    /// Require the request body to equal `body` byte for byte.
    ///
    /// Replaces any JSON body requirement.
    pub fn with_request_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.request_body = body.into();
        self.request_json = None;
        self
    }

    /// Require an `application/json` request whose body decodes to the same
    /// JSON value as `value`. Key order and whitespace are not compared.
    pub fn with_json_request_body<T: Serialize>(mut self, value: &T) -> Result<Self, Error> {
        let json = serde_json::to_value(value)?;
        self.request_body = serde_json::to_vec(&json)?;
        self.request_json = Some(json);
        Ok(self)
    }

    /// Answer with `status` instead of 200. `0` also means 200.
    ///
    /// # Panics
    ///
    /// Panics if `status` is not `0` and lies outside `100..=999`, which
    /// cannot be put on a status line.
    pub fn with_response_status(mut self, status: impl Into<StatusCode>) -> Self {
        let status = status.into();
        assert!(
            status.as_u16() == 0 || status.is_valid(),
            "invalid HTTP status code {status}"
        );
        self.response_status = Some(status);
        self
    }

    /// Append a response header value.
    ///
    /// `Content-Length` and `Connection` are framing headers the server
    /// always computes itself; values configured for them are not sent.
    pub fn with_response_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.response_headers.add(name, value);
        self
    }

    /// Append every value of every header in `headers` to the response.
    pub fn with_response_headers<K, V, I>(mut self, headers: impl IntoIterator<Item = (K, I)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = V>,
    {
        self.response_headers.extend(headers);
        self
    }

    /// Answer with `body`. An empty body is still written.
    pub fn with_response_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.response_body = Some(body.into());
        self
    }

    /// Answer with `value` serialized as JSON, tagged `application/json`.
    pub fn with_json_response_body<T: Serialize>(self, value: &T) -> Result<Self, Error> {
        let body = serde_json::to_vec(value)?;
        Ok(self
            .with_response_header("Content-Type", "application/json")
            .with_response_body(body))
    }

    pub fn request_headers(&self) -> &Headers {
        &self.request_headers
    }

    pub fn request_query(&self) -> &[(String, String)] {
        &self.request_query
    }

    pub fn request_body(&self) -> &[u8] {
        &self.request_body
    }

    /// The required JSON body, if one was configured.
    pub fn request_json(&self) -> Option<&Value> {
        self.request_json.as_ref()
    }

    /// The status the handler answers with.
    pub fn response_status(&self) -> StatusCode {
        match self.response_status {
            Some(status) if status.as_u16() != 0 => status,
            _ => StatusCode::OK,
        }
    }

    pub fn response_headers(&self) -> &Headers {
        &self.response_headers
    }

    /// The configured response body; `None` when no body was configured.
    pub fn response_body(&self) -> Option<&[u8]> {
        self.response_body.as_deref()
    }

    pub fn error_handler(&self) -> &Arc<dyn ErrorHandler> {
        &self.error_handler
    }

    fn fail(&self, response: &mut dyn ResponseWriter, request: &HttpRequest, status: StatusCode, err: Error) {
        self.error_handler
            .handle_error(response, request, status, Some(&err));
    }
}

impl Handler for TestHandler {
    fn serve(&self, response: &mut dyn ResponseWriter, request: &HttpRequest) {
        if !contains_all(&self.request_headers, &request.headers) {
            let err = Error::HeaderMismatch {
                required: self.request_headers.clone(),
                actual: request.headers.clone(),
            };
            self.fail(response, request, StatusCode::BAD_REQUEST, err);
            return;
        }

        if let Some((name, value)) = self
            .request_query
            .iter()
            .find(|(name, value)| request.get_query_param(name) != Some(value))
        {
            let err = Error::QueryMismatch {
                name: name.clone(),
                required: value.clone(),
                actual: request.get_query_param(name).cloned(),
            };
            self.fail(response, request, StatusCode::BAD_REQUEST, err);
            return;
        }

        let body = match request.body() {
            Ok(body) => body,
            Err(err) => {
                self.fail(response, request, StatusCode::INTERNAL_SERVER_ERROR, Error::BodyRead(err));
                return;
            }
        };
        let matches = match &self.request_json {
            Some(required) => request.json::<Value>().is_ok_and(|actual| actual == *required),
            None => body == self.request_body.as_slice(),
        };
        if !matches {
            let err = Error::BodyMismatch {
                required: self.request_body.clone(),
                actual: body.to_vec(),
            };
            self.fail(response, request, StatusCode::BAD_REQUEST, err);
            return;
        }

        let status = self.response_status();
        debug!("{method} {path} matched fixture, answering {status}", method = request.method, path = request.path);
        response.write_status(status);

        for (name, values) in self.response_headers.iter() {
            for value in values {
                response.add_header(name, value);
            }
        }

        if let Some(body) = &self.response_body {
            if let Err(err) = response.write_body(body) {
                self.fail(response, request, StatusCode::INTERNAL_SERVER_ERROR, Error::BodyWrite(err));
            }
        }
    }
}

/// Whether `actual` carries every value of every header in `required`.
///
/// An empty `required` matches anything. Values are matched as a set: a
/// value required twice only needs to be present once.
pub fn contains_all(required: &Headers, actual: &Headers) -> bool {
    required.iter().all(|(name, values)| {
        actual.contains_key(name) && {
            let present = actual.get_all(name);
            values.iter().all(|value| present.contains(value))
        }
    })
}
