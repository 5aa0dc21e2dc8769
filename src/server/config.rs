//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to. Port 0 picks a free ephemeral port.
    pub addr: SocketAddr,
    /// The maximum number of concurrent connections.
    pub max_connections: usize,
    /// The read buffer size.
    pub read_buffer_size: usize,
    /// The largest request head (request line and headers) accepted.
    pub max_head_size: usize,
    /// The largest request body accepted.
    pub max_body_size: usize,
    /// How long shutdown waits for in-flight connections.
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            max_connections: 1024,
            read_buffer_size: 8192,
            max_head_size: 64 * 1024,
            max_body_size: 8 * 1024 * 1024,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}
