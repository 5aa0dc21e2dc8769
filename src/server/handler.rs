//! The request handler capability.

use std::sync::Arc;

use crate::parser::HttpRequest;
use crate::server::response::ResponseWriter;

/// Anything that can serve a request by writing into a response.
///
/// Handlers run synchronously on the connection task that read the request,
/// so they must be shareable across threads once the server is started.
pub trait Handler: Send + Sync {
    fn serve(&self, response: &mut dyn ResponseWriter, request: &HttpRequest);
}

/// A handler shared between routes and the server.
pub type SharedHandler = Arc<dyn Handler>;

impl<F> Handler for F
where
    F: Fn(&mut dyn ResponseWriter, &HttpRequest) + Send + Sync,
{
    fn serve(&self, response: &mut dyn ResponseWriter, request: &HttpRequest) {
        self(response, request)
    }
}
