//! Mock WebSocket connection for testing.
//!
//! Provides a mock connection that replays scripted inbound frames and
//! captures outgoing text frames.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::traits::{ConnectionError, FrameConnection, InboundFrame};

/// Mock connection for testing.
///
/// This mock allows:
/// - Scripting inbound frames and receive errors
/// - Capturing sent text frames
/// - Simulating the client going away after a number of sends
///
/// Clones share state, so a test can keep a handle while a session owns
/// another.
///
/// # Example
///
/// ```ignore
/// use sse2ws::adapters::mock::MockConnection;
///
/// let mut conn = MockConnection::with_texts(["hello"]);
/// session.run(&mut conn).await;
/// assert_eq!(conn.sent().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockConnection {
    /// Frames returned by `recv`, front to back
    inbound: Arc<Mutex<VecDeque<Result<InboundFrame, ConnectionError>>>>,
    /// Captured outgoing frames
    sent: Arc<Mutex<Vec<String>>>,
    /// Closed flag reported by `is_closed`
    closed: Arc<AtomicBool>,
    /// Mark closed once this many frames have been sent
    close_after_sends: Arc<Mutex<Option<usize>>>,
}

impl MockConnection {
    /// Create a connection with no scripted frames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a connection that delivers the given text frames, then ends.
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let conn = Self::new();
        for text in texts {
            conn.push_frame(InboundFrame::Text(text.into()));
        }
        conn
    }

    /// Script an inbound frame.
    pub fn push_frame(&self, frame: InboundFrame) {
        self.inbound.lock().unwrap().push_back(Ok(frame));
    }

    /// Script a receive error.
    pub fn push_error(&self, error: ConnectionError) {
        self.inbound.lock().unwrap().push_back(Err(error));
    }

    /// Simulate the client going away after `count` sends.
    pub fn close_after_sends(&self, count: usize) {
        *self.close_after_sends.lock().unwrap() = Some(count);
    }

    /// Simulate the client going away.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Get all sent frames.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Get all sent frames decoded as JSON.
    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }
}

#[async_trait]
impl FrameConnection for MockConnection {
    async fn recv(&mut self) -> Option<Result<InboundFrame, ConnectionError>> {
        if self.is_closed() {
            return None;
        }
        self.inbound.lock().unwrap().pop_front()
    }

    async fn send_text(&mut self, text: String) -> Result<(), ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }

        let count = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(text);
            sent.len()
        };
        if let Some(limit) = *self.close_after_sends.lock().unwrap() {
            if count >= limit {
                self.close();
            }
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_frames_then_end() {
        let mut conn = MockConnection::with_texts(["a", "b"]);
        assert_eq!(conn.recv().await.unwrap().unwrap(), InboundFrame::Text("a".to_string()));
        assert_eq!(conn.recv().await.unwrap().unwrap(), InboundFrame::Text("b".to_string()));
        assert!(conn.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_close_after_sends() {
        let mut conn = MockConnection::new();
        conn.close_after_sends(2);

        conn.send_text("1".to_string()).await.unwrap();
        assert!(!conn.is_closed());
        conn.send_text("2".to_string()).await.unwrap();
        assert!(conn.is_closed());
        assert!(matches!(
            conn.send_text("3".to_string()).await,
            Err(ConnectionError::Closed)
        ));
        assert_eq!(conn.sent(), vec!["1".to_string(), "2".to_string()]);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let handle = MockConnection::new();
        let mut owned = handle.clone();
        owned.send_text("{\"x\":1}".to_string()).await.unwrap();
        assert_eq!(handle.sent_json(), vec![serde_json::json!({"x": 1})]);
    }
}
