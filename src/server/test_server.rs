//! A test server bound to a [`TestContext`].

use std::sync::Arc;

use log::debug;

use crate::parser::Method;
use crate::server::config::ServerConfig;
use crate::server::context::TestContext;
use crate::server::error::Error;
use crate::server::error_handler::{SharedErrorHandler, TestErrorHandler};
use crate::server::handler::Handler;
use crate::server::http_server::Server;
use crate::server::route::Route;
use crate::server::router::Router;
use crate::server::test_handler::TestHandler;

/// Collects routes, then serves them once [`TestServer::init`] is called.
///
/// Every router, route and handler it creates reports to the same
/// [`TestContext`]. Dropping a test server whose context recorded failures
/// panics, failing the test that owns it.
///
/// ```no_run
/// use testhttp_rs::{Method, StatusCode, TestServer};
///
/// # async fn run() -> Result<(), testhttp_rs::ServerError> {
/// let mut srv = TestServer::named("creates_user");
/// srv.handle("/users$", Method::POST, srv.handler().with_response_status(StatusCode::CREATED))?;
/// srv.init().await?;
/// let url = srv.url("/users")?;
/// // ... send requests to `url` ...
/// srv.close();
/// # Ok(())
/// # }
/// ```
pub struct TestServer {
    context: Arc<TestContext>,
    router: Option<Router>,
    server: Option<Server>,
    config: ServerConfig,
}

impl TestServer {
    pub fn new(context: Arc<TestContext>) -> Self {
        let router = Router::new().with_error_handler(Self::error_handler_for(&context));
        Self {
            context,
            router: Some(router),
            server: None,
            config: ServerConfig::default(),
        }
    }

    /// Create a test server with a fresh context called `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(Arc::new(TestContext::new(name)))
    }

    /// Use `config` when the server is started.
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    fn error_handler_for(context: &Arc<TestContext>) -> SharedErrorHandler {
        Arc::new(TestErrorHandler::new(context.clone()))
    }

    pub fn context(&self) -> &Arc<TestContext> {
        &self.context
    }

    /// A fresh [`TestHandler`] reporting to this server's context.
    pub fn handler(&self) -> TestHandler {
        TestHandler::new().with_error_handler(Self::error_handler_for(&self.context))
    }

    /// Serve `method` requests matching `pattern` with `handler`.
    ///
    /// Patterns are compared by their source text: handling the same pattern
    /// twice adds a method to the existing route instead of a new route.
    pub fn handle(
        &mut self,
        pattern: &str,
        method: Method,
        handler: impl Handler + 'static,
    ) -> Result<(), Error> {
        let router = self.router.as_mut().ok_or(Error::AlreadyStarted)?;
        if let Some(route) = router.route_mut(pattern) {
            debug!("adding {method} to existing route {pattern}");
            route.add_method(method, handler);
            return Ok(());
        }

        let route = Route::new(pattern)?
            .with_error_handler(Self::error_handler_for(&self.context))
            .with_method(method, handler);
        router.add_route(route);
        Ok(())
    }

    /// Start listening with every route handled so far.
    pub async fn init(&mut self) -> Result<(), Error> {
        let router = self.router.take().ok_or(Error::AlreadyStarted)?;
        let server = Server::start_with_config(router, self.config.clone()).await?;
        self.server = Some(server);
        Ok(())
    }

    /// The started server.
    pub fn server(&self) -> Result<&Server, Error> {
        self.server.as_ref().ok_or(Error::NotStarted)
    }

    /// The URL of `path` on the started server.
    pub fn url(&self, path: &str) -> Result<String, Error> {
        Ok(self.server()?.url_for(path))
    }

    /// Stop the server, releasing its port. Calling this more than once, or
    /// before [`TestServer::init`], is a no-op.
    pub fn close(&mut self) {
        if let Some(server) = self.server.as_mut() {
            server.close();
        }
    }

    /// Stop the server and wait for in-flight requests to finish.
    pub async fn shutdown(&mut self) {
        if let Some(server) = self.server.as_mut() {
            server.shutdown().await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.close();
        if !std::thread::panicking() {
            self.context.assert_passed();
        }
    }
}
