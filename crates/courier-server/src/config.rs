//! Listener settings for [`Server`](crate::Server).

use std::net::SocketAddr;
use std::time::Duration;

/// Where the server listens and how long it drains on shutdown.
///
/// ```rust
/// use courier_server::ServerConfig;
/// use std::time::Duration;
///
/// let config = ServerConfig::new("127.0.0.1:5001").with_shutdown_timeout(Duration::from_secs(5));
/// assert_eq!(config.socket_addr().unwrap().port(), 5001);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address, `host:port`.
    pub http_addr: String,
    /// How long shutdown waits for open connections before giving up.
    pub shutdown_timeout: Duration,
}

impl ServerConfig {
    /// Listens on all interfaces at port 8080 unless told otherwise.
    pub const DEFAULT_HTTP_ADDR: &'static str = "0.0.0.0:8080";

    /// Drain window used when none is configured.
    pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

    /// Listens on `http_addr` with the default drain window.
    pub fn new(http_addr: impl Into<String>) -> Self {
        Self {
            http_addr: http_addr.into(),
            shutdown_timeout: Self::DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Replaces the drain window.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Parses the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.trim().parse()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HTTP_ADDR)
    }
}
