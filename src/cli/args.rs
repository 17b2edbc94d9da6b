//! Command-line arguments.

use std::time::Duration;

use clap::Parser;

use crate::config::{BridgeConfig, ConfigError, DEFAULT_HOST, DEFAULT_PORT, SSE_URL_ENV};

/// Bridge WebSocket clients to a streaming SSE endpoint
#[derive(Debug, Clone, Parser)]
#[command(name = "sse2ws")]
#[command(version)]
pub struct Args {
    /// Upstream SSE endpoint every message is POSTed to
    #[arg(long, env = SSE_URL_ENV)]
    pub sse_url: String,

    /// Listen host
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Listen port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds to wait for the upstream to answer. Does not limit how long
    /// an event stream may run once started
    #[arg(long, value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build a validated bridge config.
    pub fn into_config(self) -> Result<BridgeConfig, ConfigError> {
        let config = BridgeConfig::new(self.sse_url.trim())
            .with_host(self.host)
            .with_port(self.port)
            .with_request_timeout(self.timeout);
        config.validate()?;
        Ok(config)
    }
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number of seconds", value))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err("timeout must be a positive number of seconds".to_string());
    }
    Ok(Duration::from_secs_f64(secs))
}
