//! Per-connection bridge between a socket client and the SSE upstream.
//!
//! A [`Session`] reads inbound frames one at a time, turns each text frame
//! into one upstream POST, and relays the response back over the socket:
//! parsed events for `text/event-stream` bodies, the raw body otherwise, and
//! an [`ErrorFrame`] when the upstream call fails. Upstream failures never end
//! the session; only the socket going away does.

use futures_util::StreamExt;
use std::sync::Arc;
use thiserror::Error;

use crate::frame::ErrorFrame;
use crate::payload::RequestPayload;
use crate::sse::{SseEvent, SseParser};
use crate::traits::{
    ConnectionError, FrameConnection, Headers, HttpClient, HttpError, InboundFrame,
    StreamingResponse,
};

/// Status the upstream must answer with for its body to be relayed.
const UPSTREAM_OK: u16 = 200;

/// Headers sent with every upstream request.
pub fn upstream_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("Accept".to_string(), "text/event-stream".to_string());
    headers
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the next inbound frame
    Open,
    /// One upstream call in flight
    Forwarding,
    /// Socket gone; terminal
    Closed,
}

/// Failure of a single forward.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Upstream unreachable or its body could not be read
    #[error(transparent)]
    Upstream(#[from] HttpError),

    /// Upstream answered with a non-success status
    #[error("Upstream returned status {status}")]
    Status { status: u16, body: String },

    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    /// The socket went away while relaying
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

impl ForwardError {
    /// The frame to report this failure with, if the client can still be
    /// told about it.
    pub fn to_error_frame(&self) -> Option<ErrorFrame> {
        match self {
            ForwardError::Upstream(e) => Some(ErrorFrame::transport(e.to_string())),
            ForwardError::Status { status, body } => {
                Some(ErrorFrame::with_status(*status, body.clone()))
            }
            ForwardError::Encode(e) => Some(ErrorFrame::transport(e.to_string())),
            ForwardError::Connection(_) => None,
        }
    }
}

/// State and control loop for one socket connection.
pub struct Session {
    client: Arc<dyn HttpClient>,
    upstream_url: Arc<str>,
    state: SessionState,
    forwarded: u64,
}

impl Session {
    pub fn new(client: Arc<dyn HttpClient>, upstream_url: impl Into<Arc<str>>) -> Self {
        Self {
            client,
            upstream_url: upstream_url.into(),
            state: SessionState::Open,
            forwarded: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of inbound messages forwarded upstream so far.
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    /// Serve `connection` until the client goes away.
    ///
    /// Messages are handled strictly in order: the next frame is not read
    /// until the previous forward has finished.
    pub async fn run<C: FrameConnection + ?Sized>(&mut self, connection: &mut C) {
        self.state = SessionState::Open;

        while let Some(frame) = connection.recv().await {
            match frame {
                Ok(InboundFrame::Text(text)) => self.forward(connection, &text).await,
                Ok(InboundFrame::Close) => {
                    tracing::debug!("Client sent close frame");
                    break;
                }
                Ok(InboundFrame::Binary(data)) => {
                    tracing::debug!("Ignoring binary frame ({} bytes)", data.len());
                }
                Ok(InboundFrame::Ping) | Ok(InboundFrame::Pong) => {}
                Err(e) => {
                    tracing::warn!("Connection error: {}", e);
                    if connection.is_closed() {
                        break;
                    }
                }
            }
        }

        self.state = SessionState::Closed;
    }

    /// Forward one inbound message and relay the result.
    ///
    /// Every upstream failure is reported to the client as an
    /// [`ErrorFrame`]; nothing is propagated to the caller.
    pub async fn forward<C: FrameConnection + ?Sized>(&mut self, connection: &mut C, data: &str) {
        if connection.is_closed() {
            tracing::debug!("Client already closed, dropping message");
            return;
        }

        self.state = SessionState::Forwarding;
        self.forwarded += 1;
        let result = self.try_forward(connection, data).await;
        self.state = SessionState::Open;

        let err = match result {
            Ok(()) => return,
            Err(err) => err,
        };

        match err.to_error_frame() {
            Some(frame) => {
                tracing::warn!("Upstream request failed: {}", err);
                if connection.is_closed() {
                    return;
                }
                let json = match frame.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("Failed to encode error frame: {}", e);
                        return;
                    }
                };
                if let Err(e) = connection.send_text(json).await {
                    tracing::debug!("Could not report upstream failure: {}", e);
                }
            }
            None => tracing::debug!("Stopped relaying: {}", err),
        }
    }

    async fn try_forward<C: FrameConnection + ?Sized>(
        &self,
        connection: &mut C,
        data: &str,
    ) -> Result<(), ForwardError> {
        let payload = RequestPayload::from_text(data);
        tracing::debug!(
            "Forwarding {} payload to {}",
            if payload.is_json() { "JSON" } else { "raw" },
            self.upstream_url
        );

        let response = self
            .client
            .post(&self.upstream_url, &payload, &upstream_headers())
            .await?;

        if response.status != UPSTREAM_OK {
            let status = response.status;
            let body = response.text().await?;
            return Err(ForwardError::Status { status, body });
        }

        if response.is_event_stream() {
            relay_event_stream(connection, response).await
        } else {
            let body = response.text().await?;
            connection.send_text(body).await?;
            Ok(())
        }
    }
}

/// Feed the body through a parser and send each event as it completes.
///
/// The connection is checked before every chunk read and every send; once it
/// reports closed the body is dropped unread.
async fn relay_event_stream<C: FrameConnection + ?Sized>(
    connection: &mut C,
    response: StreamingResponse,
) -> Result<(), ForwardError> {
    let mut body = response.body;
    let mut parser = SseParser::new();

    loop {
        if connection.is_closed() {
            return Err(ConnectionError::Closed.into());
        }
        let chunk = match body.next().await {
            Some(chunk) => chunk?,
            None => break,
        };
        for event in parser.feed(&chunk) {
            send_event(connection, &event).await?;
        }
    }

    if let Some(event) = parser.finish() {
        send_event(connection, &event).await?;
    }
    Ok(())
}

async fn send_event<C: FrameConnection + ?Sized>(
    connection: &mut C,
    event: &SseEvent,
) -> Result<(), ForwardError> {
    if connection.is_closed() {
        return Err(ConnectionError::Closed.into());
    }
    connection.send_text(event.to_frame()?).await?;
    Ok(())
}
