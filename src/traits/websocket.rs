//! WebSocket connection trait abstraction.
//!
//! Provides a trait-based abstraction over one accepted socket connection,
//! enabling dependency injection and mocking in tests.

use async_trait::async_trait;
use thiserror::Error;

/// A frame received from the socket client.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
    Ping,
    Pong,
    /// Close handshake initiated by the client
    Close,
}

/// Socket connection errors.
#[derive(Debug, Clone, Error)]
pub enum ConnectionError {
    #[error("Connection closed")]
    Closed,

    #[error("Receive failed: {0}")]
    Receive(String),

    #[error("Send failed: {0}")]
    Send(String),
}

/// Trait for one full-duplex framed connection.
///
/// A connection is owned by exactly one session. `recv` returning `None`
/// means the inbound side has ended. `is_closed` must become true as soon as
/// the transport knows the peer is gone, even while no `recv` is pending, so
/// that an in-flight forward can stop sending.
///
/// # Example
///
/// ```ignore
/// use sse2ws::traits::{FrameConnection, InboundFrame};
///
/// while let Some(frame) = conn.recv().await {
///     if let Ok(InboundFrame::Text(text)) = frame {
///         conn.send_text(text).await?;
///     }
/// }
/// ```
#[async_trait]
pub trait FrameConnection: Send {
    /// Receive the next inbound frame.
    async fn recv(&mut self) -> Option<Result<InboundFrame, ConnectionError>>;

    /// Send one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), ConnectionError>;

    /// Whether the connection is known to be closed.
    fn is_closed(&self) -> bool;
}
