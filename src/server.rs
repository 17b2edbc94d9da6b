//! WebSocket listener.
//!
//! Accepts socket upgrades on `/` and `/ws` and runs one [`Session`] per
//! connection on its own task.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ws::WebSocket, ConnectInfo, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::adapters::{AxumConnection, ReqwestHttpClient};
use crate::config::BridgeConfig;
use crate::session::Session;
use crate::traits::HttpClient;

/// Shared state handed to every connection.
#[derive(Clone)]
pub struct BridgeState {
    client: Arc<dyn HttpClient>,
    upstream_url: Arc<str>,
}

impl BridgeState {
    pub fn new(client: Arc<dyn HttpClient>, upstream_url: impl Into<Arc<str>>) -> Self {
        Self {
            client,
            upstream_url: upstream_url.into(),
        }
    }

    /// Build the production state: a reqwest client honouring the configured
    /// timeout.
    pub fn from_config(config: &BridgeConfig) -> color_eyre::Result<Self> {
        let client = ReqwestHttpClient::with_timeout(config.request_timeout)?;
        Ok(Self::new(Arc::new(client), config.upstream_url.trim()))
    }

    pub fn upstream_url(&self) -> &str {
        &self.upstream_url
    }
}

/// Build the router with both socket routes.
pub fn router(state: BridgeState) -> Router {
    Router::new()
        .route("/", get(websocket_handler))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve in a background task.
///
/// Returns the task handle and the bound address; binding port 0 picks a
/// free port.
pub async fn start_server_on(
    addr: SocketAddr,
    state: BridgeState,
) -> color_eyre::Result<(JoinHandle<()>, SocketAddr)> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;
    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();

    tracing::debug!("Bridge listening on ws://{}", actual_addr);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Bridge server error: {}", e);
        }
    });

    Ok((handle, actual_addr))
}

/// Run the bridge in the foreground until ctrl-c.
pub async fn serve(config: BridgeConfig) -> color_eyre::Result<()> {
    config.validate()?;
    let addr = config.bind_addr()?;
    let state = BridgeState::from_config(&config)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Starting SSE to WebSocket bridge");
    tracing::info!("  upstream SSE: {}", state.upstream_url());
    tracing::info!("  listening:    ws://{}/ws", actual_addr);
    if let Some(timeout) = config.request_timeout {
        tracing::info!("  request timeout: {}s", timeout.as_secs());
    }

    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Bridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Handler for WebSocket upgrades on either route.
async fn websocket_handler(
    ws: WebSocketUpgrade,
    remote: Option<ConnectInfo<SocketAddr>>,
    State(state): State<BridgeState>,
) -> impl IntoResponse {
    let peer = remote
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    ws.on_upgrade(move |socket| {
        let span = tracing::info_span!("session", peer = %peer);
        handle_websocket(socket, state).instrument(span)
    })
}

/// Handle an individual WebSocket connection.
async fn handle_websocket(socket: WebSocket, state: BridgeState) {
    tracing::info!("Connection opened");

    let mut connection = AxumConnection::new(socket);
    let mut session = Session::new(state.client, state.upstream_url);
    session.run(&mut connection).await;

    tracing::info!(
        "Connection closed ({} messages forwarded)",
        session.forwarded()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MockHttpClient;

    #[test]
    fn test_state_from_config_trims_url() {
        let config = BridgeConfig::new("  http://localhost:8080/sse ");
        let state = BridgeState::from_config(&config).unwrap();
        assert_eq!(state.upstream_url(), "http://localhost:8080/sse");
    }

    #[tokio::test]
    async fn test_start_server_on_picks_free_port() {
        let state = BridgeState::new(Arc::new(MockHttpClient::new()), "http://upstream");
        let (handle, addr) = start_server_on("127.0.0.1:0".parse().unwrap(), state)
            .await
            .unwrap();
        assert_ne!(addr.port(), 0);
        handle.abort();
    }
}
