//! Reporting failures that happen while handling a request.

use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use crate::parser::{HttpRequest, Method};
use crate::server::context::TestContext;
use crate::server::error::Error;
use crate::server::response::{ResponseWriter, StatusCode};

/// Reports a request-handling failure.
///
/// Routers, routes and test handlers call this instead of returning errors
/// to the transport, so the same configuration can either answer with an
/// HTTP error or fail the enclosing test.
pub trait ErrorHandler: Send + Sync {
    fn handle_error(
        &self,
        response: &mut dyn ResponseWriter,
        request: &HttpRequest,
        status: StatusCode,
        error: Option<&Error>,
    );
}

/// An error handler shared between a router, its routes and their handlers.
pub type SharedErrorHandler = Arc<dyn ErrorHandler>;

pub(crate) fn default_error_handler() -> SharedErrorHandler {
    Arc::new(BasicErrorHandler)
}

/// Writes the status, and the error as a plain-text body line.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicErrorHandler;

impl ErrorHandler for BasicErrorHandler {
    /// # Panics
    ///
    /// If the error line cannot be written: the response sink itself is
    /// broken and there is nothing left to report the failure to.
    fn handle_error(
        &self,
        response: &mut dyn ResponseWriter,
        request: &HttpRequest,
        status: StatusCode,
        error: Option<&Error>,
    ) {
        debug!("{method} {path} answered with {status}", method = request.method, path = request.path);
        response.write_status(status);
        if let Some(err) = error {
            let line = format!("Status: {status} Error: {err}\n");
            if let Err(write_err) = response.write_body(line.as_bytes()) {
                panic!("failed to write error response for status {status}: {write_err}");
            }
        }
    }
}

/// Fails a [`TestContext`] and leaves the response untouched.
#[derive(Debug, Clone)]
pub struct TestErrorHandler {
    context: Arc<TestContext>,
}

impl TestErrorHandler {
    pub fn new(context: Arc<TestContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Arc<TestContext> {
        &self.context
    }
}

impl ErrorHandler for TestErrorHandler {
    fn handle_error(
        &self,
        _response: &mut dyn ResponseWriter,
        _request: &HttpRequest,
        status: StatusCode,
        error: Option<&Error>,
    ) {
        let message = match error {
            Some(err) => err.to_string(),
            None => "none".to_string(),
        };
        self.context
            .error(format!("HTTP response status: {status} Error: {message}"));
    }
}

/// One call captured by a [`RecordingErrorHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedError {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    pub message: Option<String>,
}

/// Captures every reported error and answers with the bare status.
#[derive(Debug, Default)]
pub struct RecordingErrorHandler {
    records: Mutex<Vec<RecordedError>>,
}

impl RecordingErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every error reported so far, oldest first.
    pub fn records(&self) -> Vec<RecordedError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The statuses reported so far, oldest first.
    pub fn statuses(&self) -> Vec<StatusCode> {
        self.records().into_iter().map(|record| record.status).collect()
    }
}

impl ErrorHandler for RecordingErrorHandler {
    fn handle_error(
        &self,
        response: &mut dyn ResponseWriter,
        request: &HttpRequest,
        status: StatusCode,
        error: Option<&Error>,
    ) {
        response.write_status(status);
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedError {
                method: request.method.clone(),
                path: request.path.clone(),
                status,
                message: error.map(ToString::to_string),
            });
    }
}
