//! HTTP server implementation.

use std::future::poll_fn;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::Poll;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use log::{debug, error, info, warn};

use crate::parser::{find_head_end, parse_request_head, BodyError};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::{Handler, SharedHandler};
use crate::server::response::{HttpResponse, StatusCode};

/// The listener, shared so that [`Server::close`] can release the port
/// without waiting for the accept loop.
type ListenerSlot = Arc<Mutex<Option<TcpListener>>>;

/// A live HTTP listener serving one frozen handler.
///
/// The server is listening as soon as [`Server::start`] returns. The port is
/// released by the time [`Server::close`] returns, and likewise after
/// [`Server::shutdown`] or drop.
#[derive(Debug)]
pub struct Server {
    addr: SocketAddr,
    listener: ListenerSlot,
    shutdown_tx: Option<oneshot::Sender<()>>,
    accept_loop: Option<JoinHandle<()>>,
}

impl Server {
    /// Start serving `handler` on an ephemeral local port.
    pub async fn start(handler: impl Handler + 'static) -> Result<Self, Error> {
        Self::start_with_config(handler, ServerConfig::default()).await
    }

    /// Start serving `handler` with the given configuration.
    ///
    /// The handler is moved behind an `Arc` and is read-only from here on.
    pub async fn start_with_config(
        handler: impl Handler + 'static,
        config: ServerConfig,
    ) -> Result<Self, Error> {
        let listener = Self::setup_listener(&config).await?;
        let addr = listener.local_addr()?;
        let listener: ListenerSlot = Arc::new(Mutex::new(Some(listener)));
        let handler: SharedHandler = Arc::new(handler);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let accept_loop = tokio::spawn(Self::accept_loop(listener.clone(), handler, config, shutdown_rx));

        Ok(Self {
            addr,
            listener,
            shutdown_tx: Some(shutdown_tx),
            accept_loop: Some(accept_loop),
        })
    }

    /// The socket address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The base URL of the server, without a trailing slash.
    pub fn url(&self) -> String {
        format!("http://{addr}", addr = self.addr)
    }

    /// The URL of `path` on this server.
    pub fn url_for(&self, path: &str) -> String {
        format!("{base}{path}", base = self.url())
    }

    /// Release the port and stop accepting connections. Calling this more
    /// than once is a no-op.
    ///
    /// Connections already accepted finish in the background; use
    /// [`Server::shutdown`] to wait for them.
    pub fn close(&mut self) {
        self.release_listener();
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            debug!("Closing test server on {addr}", addr = self.addr);
            let _ = shutdown_tx.send(());
        }
        self.accept_loop.take();
    }

    /// Release the port and wait for in-flight connections to finish.
    /// Calling this more than once is a no-op.
    pub async fn shutdown(&mut self) {
        self.release_listener();
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(accept_loop) = self.accept_loop.take() {
            if let Err(e) = accept_loop.await {
                error!("Accept loop failed during shutdown: {e}");
            }
        }
    }

    fn release_listener(&self) {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(listener);
    }

    /// Accept from the shared listener; `None` once it has been released.
    async fn accept(listener: &ListenerSlot) -> Option<io::Result<(TcpStream, SocketAddr)>> {
        poll_fn(|cx| {
            let guard = listener.lock().unwrap_or_else(PoisonError::into_inner);
            let polled = match guard.as_ref() {
                Some(listener) => listener.poll_accept(cx).map(Some),
                None => Poll::Ready(None),
            };
            polled
        })
        .await
    }

    /// Set up the TCP listener.
    async fn setup_listener(config: &ServerConfig) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&config.addr).await?;
        info!("Test server listening on http://{addr}", addr = listener.local_addr()?);
        Ok(listener)
    }

    async fn accept_loop(
        listener: ListenerSlot,
        handler: SharedHandler,
        config: ServerConfig,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        // Limit concurrent connections
        let semaphore = Arc::new(Semaphore::new(config.max_connections));
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                // Check for shutdown signal, or the server handle going away
                _ = &mut shutdown_rx => {
                    info!("Shutting down test server...");
                    break;
                }

                // Accept new connections
                accept_result = Self::accept(&listener) => {
                    match accept_result {
                        None => break,
                        Some(Ok((socket, addr))) => {
                            Self::handle_new_connection(
                                socket,
                                addr,
                                semaphore.clone(),
                                handler.clone(),
                                config.clone(),
                                &mut tasks,
                            ).await;
                        }
                        Some(Err(e)) => {
                            if Self::handle_connection_error(e).await {
                                break;
                            }
                        }
                    }
                }

                // Reap finished connections
                Some(res) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = res {
                        error!("Connection task failed: {e}");
                    }
                }
            }
        }

        // Release the port before waiting on in-flight connections
        drop(listener.lock().unwrap_or_else(PoisonError::into_inner).take());
        Self::perform_shutdown(&mut tasks, &config).await;
    }

    /// Handle a new connection.
    async fn handle_new_connection(
        mut socket: TcpStream,
        addr: SocketAddr,
        semaphore: Arc<Semaphore>,
        handler: SharedHandler,
        config: ServerConfig,
        tasks: &mut JoinSet<()>,
    ) {
        // Try to acquire a permit from the semaphore
        let permit = match semaphore.try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                let response = HttpResponse::new(StatusCode::SERVICE_UNAVAILABLE)
                    .with_content_type("text/plain")
                    .with_body_string("Server is at capacity, please try again later");
                let _ = socket.write_all(&response.to_bytes()).await;
                return;
            }
        };

        tasks.spawn(async move {
            // The permit is dropped when the task completes, releasing the semaphore slot
            let _permit = permit;

            if let Err(e) = Self::handle_connection(&mut socket, handler.as_ref(), &config).await {
                error!("Error handling connection from {addr}: {e}");
            }
        });
    }

    /// Handle connection errors.
    async fn handle_connection_error(e: io::Error) -> bool {
        error!("Error accepting connection: {e}");

        if e.kind() == io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        // For other errors, wait a bit before retrying
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        false
    }

    /// Wait for in-flight connections, up to the configured timeout.
    async fn perform_shutdown(tasks: &mut JoinSet<()>, config: &ServerConfig) {
        debug!("Waiting for {len} active connections to complete...", len = tasks.len());
        let drained = tokio::time::timeout(config.shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!("Shutdown timed out, aborting {len} connections", len = tasks.len());
            tasks.abort_all();
        }
        info!("Test server shutdown complete");
    }

    /// Serve a single request read from `socket` and close it.
    ///
    /// The full body is read before `handler` runs. A body that cannot be
    /// read is handed to the handler as a body error, not failed here.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        handler: &dyn Handler,
        config: &ServerConfig,
    ) -> Result<(), Error> {
        let mut buf = Vec::with_capacity(config.read_buffer_size);
        let mut chunk = vec![0; config.read_buffer_size];

        // Read until the blank line that ends the head
        let head_end = loop {
            if let Some(end) = find_head_end(&buf) {
                break end;
            }
            if buf.len() > config.max_head_size {
                let response = HttpResponse::new(StatusCode::BAD_REQUEST)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Request head exceeds {limit} bytes", limit = config.max_head_size));
                socket.write_all(&response.to_bytes()).await?;
                return Err(Error::HeadTooLarge(config.max_head_size));
            }
            let n = socket.read(&mut chunk).await?;
            if n == 0 {
                if buf.is_empty() {
                    return Ok(()); // Connection closed
                }
                break buf.len();
            }
            buf.extend_from_slice(&chunk[..n]);
        };

        let mut request = match parse_request_head(&buf[..head_end]) {
            Ok((request, _)) => request,
            Err(e) => {
                let response = HttpResponse::new(StatusCode::BAD_REQUEST)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Error parsing request: {e}"));
                socket.write_all(&response.to_bytes()).await?;
                return Err(Error::ParseError(e));
            }
        };

        let mut body = buf.split_off(head_end);
        match request.content_length() {
            Ok(Some(length)) if length > config.max_body_size => {
                request.fail_body(BodyError::TooLarge {
                    length,
                    limit: config.max_body_size,
                });
            }
            Ok(Some(length)) => {
                while body.len() < length {
                    match socket.read(&mut chunk).await {
                        Ok(0) => break,
                        Ok(n) => body.extend_from_slice(&chunk[..n]),
                        Err(e) => {
                            warn!("Failed reading request body: {e}");
                            break;
                        }
                    }
                }
                request.attach_body(body);
            }
            // Without a length the body is whatever arrived with the head
            _ => request.attach_body(body),
        }

        debug!("{method} {path}", method = request.method, path = request.path);
        let mut response = HttpResponse::default();
        handler.serve(&mut response, &request);

        socket.write_all(&response.to_bytes()).await?;
        socket.shutdown().await?;
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.close();
    }
}
