//! First-match routing over an ordered list of routes.

use log::debug;

use crate::parser::HttpRequest;
use crate::server::error::Error;
use crate::server::error_handler::{default_error_handler, SharedErrorHandler};
use crate::server::handler::Handler;
use crate::server::response::{ResponseWriter, StatusCode};
use crate::server::route::Route;

/// Dispatches each request to the first route whose pattern matches its
/// target. Unmatched requests are reported with 404 Not Found.
///
/// Routes are tried in the order they were added, so register specific
/// patterns before general ones: a catch-all `.*` belongs last.
///
/// A router is the mutable half of the setup: once it is handed to
/// [`Server::start`](crate::server::Server::start) it is frozen.
pub struct Router {
    routes: Vec<Route>,
    error_handler: SharedErrorHandler,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            error_handler: default_error_handler(),
        }
    }

    /// Report unmatched requests to `error_handler`.
    pub fn with_error_handler(mut self, error_handler: SharedErrorHandler) -> Self {
        self.error_handler = error_handler;
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.add_route(route);
        self
    }

    pub fn with_routes(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
        self.add_routes(routes);
        self
    }

    /// Append a route after every route added so far.
    pub fn add_route(&mut self, route: Route) {
        debug!("registered route {pattern}", pattern = route.pattern());
        self.routes.push(route);
    }

    /// Append routes, keeping their order.
    pub fn add_routes(&mut self, routes: impl IntoIterator<Item = Route>) {
        for route in routes {
            self.add_route(route);
        }
    }

    /// The route registered with exactly this pattern source.
    pub fn route_mut(&mut self, pattern: &str) -> Option<&mut Route> {
        self.routes.iter_mut().find(|route| route.pattern() == pattern)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

impl Handler for Router {
    fn serve(&self, response: &mut dyn ResponseWriter, request: &HttpRequest) {
        match self.routes.iter().find(|route| route.is_match(&request.path)) {
            Some(route) => route.serve(response, request),
            None => {
                let err = Error::NotFound(request.path.clone());
                self.error_handler
                    .handle_error(response, request, StatusCode::NOT_FOUND, Some(&err));
            }
        }
    }
}
