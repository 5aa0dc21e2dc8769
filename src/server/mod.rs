//! Test server toolkit.
//!
//! Requests flow from the [`Server`] through a [`Router`] to the first
//! matching [`Route`], then to the handler registered for the request
//! method, typically a [`TestHandler`]. Every failure along the way is
//! reported to an [`ErrorHandler`].

mod response;
mod config;
mod context;
mod error;
mod error_handler;
mod handler;
mod http_server;
mod route;
mod router;
mod test_handler;
mod test_server;

// Re-export public items
pub use response::{HttpResponse, ResponseWriter, StatusCode};
pub use config::ServerConfig;
pub use context::TestContext;
pub use error::Error;
pub use error_handler::{
    BasicErrorHandler, ErrorHandler, RecordedError, RecordingErrorHandler, SharedErrorHandler,
    TestErrorHandler,
};
pub use handler::{Handler, SharedHandler};
pub use http_server::Server;
pub use route::Route;
pub use router::Router;
pub use test_handler::{contains_all, TestHandler};
pub use test_server::TestServer;
