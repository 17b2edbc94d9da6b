//! Bridge configuration.
//!
//! Set once at startup and shared read-only by every session.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;
use thiserror::Error;

/// Default listen host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8765;

/// Environment variable consulted when `--sse-url` is not given
pub const SSE_URL_ENV: &str = "SSE2WS_SSE_URL";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("upstream SSE URL is required (use --sse-url or SSE2WS_SSE_URL)")]
    MissingUpstreamUrl,

    #[error("upstream SSE URL must start with http:// or https://: {0}")]
    InvalidUpstreamUrl(String),

    #[error("invalid listen address {0}")]
    InvalidListenAddr(String),
}

/// Configuration for the bridge.
///
/// Use the builder methods to customize defaults.
///
/// # Example
///
/// ```
/// use sse2ws::config::BridgeConfig;
///
/// let config = BridgeConfig::new("http://localhost:8080/api/sse")
///     .with_port(9000);
/// assert_eq!(config.bind_addr().unwrap().port(), 9000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Upstream SSE endpoint every message is POSTed to
    pub upstream_url: String,
    /// Listen host (default: 0.0.0.0)
    pub host: String,
    /// Listen port (default: 8765)
    pub port: u16,
    /// Total timeout for one upstream request; none by default
    pub request_timeout: Option<Duration>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            upstream_url: String::new(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout: None,
        }
    }
}

impl BridgeConfig {
    /// Create a config for the given upstream with default listen settings.
    pub fn new(upstream_url: impl Into<String>) -> Self {
        Self {
            upstream_url: upstream_url.into(),
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Socket address to listen on. Host names are resolved.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| ConfigError::InvalidListenAddr(format!("{}:{}", self.host, self.port)))
    }

    /// Check the config is usable before starting the server.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.upstream_url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingUpstreamUrl);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUpstreamUrl(url.to_string()));
        }
        self.bind_addr()?;
        Ok(())
    }
}
