//! A URL pattern with one handler per HTTP method.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::parser::{HttpRequest, Method};
use crate::server::error::Error;
use crate::server::error_handler::{default_error_handler, SharedErrorHandler};
use crate::server::handler::{Handler, SharedHandler};
use crate::server::response::{ResponseWriter, StatusCode};

/// Handlers matched by a regular expression over the request target.
///
/// A route dispatches on the request method; a method without a handler is
/// reported to the route's error handler with 405 Method Not Allowed.
pub struct Route {
    pattern: Regex,
    methods: HashMap<Method, SharedHandler>,
    error_handler: SharedErrorHandler,
}

impl Route {
    /// Create a route for `pattern`.
    ///
    /// The pattern is compiled immediately, so a malformed expression is
    /// rejected here rather than silently never matching.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let pattern = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern,
            methods: HashMap::new(),
            error_handler: default_error_handler(),
        })
    }

    /// Report unsupported methods to `error_handler`.
    pub fn with_error_handler(mut self, error_handler: SharedErrorHandler) -> Self {
        self.error_handler = error_handler;
        self
    }

    /// Serve `method` with `handler`, replacing any previous handler.
    pub fn with_method(mut self, method: Method, handler: impl Handler + 'static) -> Self {
        self.add_method(method, handler);
        self
    }

    /// Serve `method` with `handler`, replacing any previous handler.
    pub fn add_method(&mut self, method: Method, handler: impl Handler + 'static) {
        self.add_shared_method(method, Arc::new(handler));
    }

    /// Serve `method` with an already shared handler.
    pub fn add_shared_method(&mut self, method: Method, handler: SharedHandler) {
        self.methods.insert(method, handler);
    }

    /// The source of the route's regular expression.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Whether the pattern matches anywhere in `url`.
    pub fn is_match(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }

    /// The methods with a registered handler, in no particular order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.keys()
    }
}

impl Handler for Route {
    fn serve(&self, response: &mut dyn ResponseWriter, request: &HttpRequest) {
        match self.methods.get(&request.method) {
            Some(handler) => handler.serve(response, request),
            None => {
                let err = Error::MethodNotAllowed(request.method.clone(), request.path.clone());
                self.error_handler
                    .handle_error(response, request, StatusCode::METHOD_NOT_ALLOWED, Some(&err));
            }
        }
    }
}
