//! Axum WebSocket connection adapter.
//!
//! Wraps an upgraded `axum::extract::ws::WebSocket` and implements the
//! [`FrameConnection`] trait from `crate::traits`.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::traits::{ConnectionError, FrameConnection, InboundFrame};

/// Inbound frames buffered ahead of the session. A full buffer stops the
/// reader, pushing back on the client through the socket.
pub const INBOUND_CAPACITY: usize = 64;

/// Production connection backed by an axum WebSocket.
///
/// The socket is split. A reader task pumps inbound frames into a bounded
/// channel and raises the closed flag as soon as the client sends Close or
/// the stream ends, so closure is visible while a forward is still running.
/// A client that has [`INBOUND_CAPACITY`] frames queued is not read from
/// until the session catches up. The reader task is aborted when the
/// connection is dropped.
pub struct AxumConnection {
    sender: SplitSink<WebSocket, Message>,
    inbound: mpsc::Receiver<Result<InboundFrame, ConnectionError>>,
    closed: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl AxumConnection {
    /// Take ownership of an upgraded socket.
    pub fn new(socket: WebSocket) -> Self {
        let (sender, mut receiver) = socket.split();
        let (tx, inbound) = mpsc::channel(INBOUND_CAPACITY);
        let closed = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&closed);
        let reader = tokio::spawn(async move {
            while let Some(msg) = receiver.next().await {
                let frame = match msg {
                    Ok(Message::Text(text)) => Ok(InboundFrame::Text(text)),
                    Ok(Message::Binary(data)) => Ok(InboundFrame::Binary(data)),
                    Ok(Message::Ping(_)) => Ok(InboundFrame::Ping),
                    Ok(Message::Pong(_)) => Ok(InboundFrame::Pong),
                    Ok(Message::Close(_)) => {
                        // Keep reading so the close reply gets flushed.
                        flag.store(true, Ordering::SeqCst);
                        Ok(InboundFrame::Close)
                    }
                    Err(e) => Err(ConnectionError::Receive(e.to_string())),
                };
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
            flag.store(true, Ordering::SeqCst);
        });

        Self {
            sender,
            inbound,
            closed,
            reader,
        }
    }
}

#[async_trait]
impl FrameConnection for AxumConnection {
    async fn recv(&mut self) -> Option<Result<InboundFrame, ConnectionError>> {
        self.inbound.recv().await
    }

    async fn send_text(&mut self, text: String) -> Result<(), ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }
        if let Err(e) = self.sender.send(Message::Text(text)).await {
            self.closed.store(true, Ordering::SeqCst);
            return Err(ConnectionError::Send(e.to_string()));
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for AxumConnection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
