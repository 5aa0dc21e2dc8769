//! A mock HTTP server toolkit for test suites.
//!
//! This library starts a real HTTP listener on a local port and answers it
//! from static fixtures, so client code can be tested against a server whose
//! behaviour is fully described by the test itself.
//!
//! # Features
//!
//! - Regex routing: the first registered route whose pattern matches the
//!   request target wins
//! - One handler per HTTP method on each route
//! - Request fixtures that require headers and an exact body, and answer
//!   with a canned status, headers and body
//! - Pluggable error reporting: answer with an HTTP error, or fail the test
//!
//! # Examples
//!
//! ## Routing to fixtures
//!
//! ```no_run
//! use testhttp_rs::{Method, Route, Router, Server, StatusCode, TestHandler};
//!
//! # async fn run() -> Result<(), testhttp_rs::ServerError> {
//! let router = Router::new()
//!     .with_route(
//!         Route::new("^/users/[0-9]+$")?
//!             .with_method(Method::GET, TestHandler::new().with_response_body("user"))
//!             .with_method(
//!                 Method::DELETE,
//!                 TestHandler::new().with_response_status(StatusCode::NO_CONTENT),
//!             ),
//!     )
//!     .with_route(
//!         Route::new(".*")?.with_method(
//!             Method::GET,
//!             TestHandler::new().with_response_status(StatusCode::NOT_FOUND),
//!         ),
//!     );
//!
//! let mut server = Server::start(router).await?;
//! println!("GET {}", server.url_for("/users/7"));
//! server.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Failing a test on a mismatch
//!
//! ```no_run
//! use testhttp_rs::{Method, TestServer};
//!
//! # async fn run() -> Result<(), testhttp_rs::ServerError> {
//! let mut srv = TestServer::named("requires_auth");
//! srv.handle("/secure$", Method::GET, srv.handler().with_request_header("Auth", "Pass"))?;
//! srv.init().await?;
//! // A request without `Auth: Pass` records a failure, and dropping `srv`
//! // then panics with it.
//! # Ok(())
//! # }
//! ```

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{
    parse_request, BodyError, Error as ParserError, Headers, HttpRequest, HttpVersion, Method,
};
pub use server::{
    contains_all, BasicErrorHandler, Error as ServerError, ErrorHandler, Handler, HttpResponse,
    RecordingErrorHandler, ResponseWriter, Route, Router, Server, ServerConfig, StatusCode,
    TestContext, TestErrorHandler, TestHandler, TestServer,
};
