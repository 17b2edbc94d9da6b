//! HTTP client trait abstraction.
//!
//! Provides a trait-based abstraction for the upstream POST, enabling
//! dependency injection and mocking in tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use futures_util::StreamExt;
use std::collections::HashMap;
use std::pin::Pin;
use thiserror::Error;

use crate::payload::RequestPayload;

/// HTTP headers represented as a key-value map.
///
/// Response header names are stored lowercased.
pub type Headers = HashMap<String, String>;

/// Incrementally readable response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// HTTP client errors.
///
/// These are transport-level failures. A non-success status is not an
/// `HttpError`; it arrives as a normal [`StreamingResponse`].
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Body read failed: {0}")]
    Body(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Other(String),
}

/// Response whose body has not been read yet.
pub struct StreamingResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, names lowercased
    pub headers: Headers,
    /// Response body
    pub body: ByteStream,
}

impl StreamingResponse {
    /// Create a response with no headers.
    pub fn new(status: u16, body: ByteStream) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    /// Create a response with headers. Header names are lowercased.
    pub fn with_headers(status: u16, headers: Headers, body: ByteStream) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Look up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The `Content-Type` header, or an empty string.
    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or("")
    }

    /// True when the upstream declared a `text/event-stream` body.
    pub fn is_event_stream(&self) -> bool {
        self.content_type().contains("text/event-stream")
    }

    /// Drain the body into a string, replacing invalid UTF-8.
    pub async fn text(self) -> Result<String, HttpError> {
        let mut body = self.body;
        let mut bytes = Vec::new();
        while let Some(chunk) = body.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl std::fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Trait for the upstream HTTP call.
///
/// Implementations include the production reqwest-based client and a mock
/// client for testing.
///
/// # Example
///
/// ```ignore
/// use sse2ws::traits::{Headers, HttpClient};
/// use sse2ws::payload::RequestPayload;
///
/// let payload = RequestPayload::from_text(r#"{"prompt":"hi"}"#);
/// let response = client.post(&url, &payload, &Headers::new()).await?;
/// if response.is_event_stream() { /* feed response.body to a parser */ }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a POST and return as soon as the status and headers arrive.
    ///
    /// JSON payloads are sent as a JSON body, raw payloads as a text body.
    async fn post(
        &self,
        url: &str,
        payload: &RequestPayload,
        headers: &Headers,
    ) -> Result<StreamingResponse, HttpError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(chunks: Vec<Result<Bytes, HttpError>>) -> ByteStream {
        Box::pin(futures::stream::iter(chunks))
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "text/event-stream; charset=utf-8".to_string());
        let response = StreamingResponse::with_headers(200, headers, body_of(vec![]));

        assert_eq!(
            response.header("content-type"),
            Some("text/event-stream; charset=utf-8")
        );
        assert_eq!(
            response.header("CONTENT-TYPE"),
            Some("text/event-stream; charset=utf-8")
        );
        assert!(response.is_event_stream());
    }

    #[test]
    fn test_missing_content_type() {
        let response = StreamingResponse::new(200, body_of(vec![]));
        assert_eq!(response.content_type(), "");
        assert!(!response.is_event_stream());
    }

    #[tokio::test]
    async fn test_text_concatenates_chunks() {
        let response = StreamingResponse::new(
            200,
            body_of(vec![Ok(Bytes::from("hel")), Ok(Bytes::from("lo"))]),
        );
        assert_eq!(response.text().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_text_propagates_body_error() {
        let response = StreamingResponse::new(
            200,
            body_of(vec![
                Ok(Bytes::from("partial")),
                Err(HttpError::Body("reset".to_string())),
            ]),
        );
        assert!(matches!(response.text().await, Err(HttpError::Body(_))));
    }

    #[test]
    fn test_http_error_display() {
        assert_eq!(
            HttpError::ConnectionFailed("refused".to_string()).to_string(),
            "Connection failed: refused"
        );
        assert_eq!(
            HttpError::Timeout("30s".to_string()).to_string(),
            "Request timeout: 30s"
        );
        assert_eq!(
            HttpError::Body("reset".to_string()).to_string(),
            "Body read failed: reset"
        );
        assert_eq!(
            HttpError::InvalidUrl("bad url".to_string()).to_string(),
            "Invalid URL: bad url"
        );
        assert_eq!(
            HttpError::Other("unknown".to_string()).to_string(),
            "HTTP error: unknown"
        );
    }
}
