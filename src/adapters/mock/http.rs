//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that replays predefined
//! responses or errors and records every request it receives.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::payload::RequestPayload;
use crate::traits::{ByteStream, Headers, HttpClient, HttpError, StreamingResponse};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request payload
    pub payload: RequestPayload,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Respond with a status, headers and a body split into chunks
    Body {
        status: u16,
        headers: Headers,
        chunks: Vec<Bytes>,
        /// Keep the body open forever after the last chunk
        hang: bool,
    },
    /// Fail the body with `error` after yielding `chunks`
    BodyError {
        chunks: Vec<Bytes>,
        error: HttpError,
    },
    /// Fail the request itself
    Error(HttpError),
}

impl MockResponse {
    /// A 200 `text/event-stream` response delivered in the given chunks.
    pub fn event_stream<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Bytes>,
    {
        MockResponse::Body {
            status: 200,
            headers: content_type("text/event-stream"),
            chunks: chunks.into_iter().map(Into::into).collect(),
            hang: false,
        }
    }

    /// A plain-text response with the given status.
    pub fn text(status: u16, body: impl Into<Bytes>) -> Self {
        MockResponse::Body {
            status,
            headers: content_type("text/plain"),
            chunks: vec![body.into()],
            hang: false,
        }
    }

    /// An event stream that never ends after its last chunk.
    pub fn hanging_event_stream<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Bytes>,
    {
        match Self::event_stream(chunks) {
            MockResponse::Body {
                status,
                headers,
                chunks,
                ..
            } => MockResponse::Body {
                status,
                headers,
                chunks,
                hang: true,
            },
            other => other,
        }
    }
}

fn content_type(value: &str) -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), value.to_string());
    headers
}

/// Mock HTTP client for testing.
///
/// Responses are consumed in the order they were queued; once the queue is
/// empty every request fails.
///
/// # Example
///
/// ```ignore
/// use sse2ws::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.push_response(MockResponse::event_stream(["data: hi\n\n"]));
///
/// let response = client.post("http://upstream", &payload, &Headers::new()).await?;
/// assert_eq!(client.get_requests().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// Queued responses, consumed front to back
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Body chunks handed out across all responses
    chunks_read: Arc<AtomicUsize>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next request.
    pub fn push_response(&self, response: MockResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of body chunks pulled by callers so far.
    pub fn chunks_read(&self) -> usize {
        self.chunks_read.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Option<MockResponse> {
        self.responses.lock().unwrap().pop_front()
    }

    fn counted(&self, chunks: Vec<Result<Bytes, HttpError>>, hang: bool) -> ByteStream {
        let counter = Arc::clone(&self.chunks_read);
        let body = futures::stream::iter(chunks).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        if hang {
            Box::pin(body.chain(futures::stream::pending()))
        } else {
            Box::pin(body)
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post(
        &self,
        url: &str,
        payload: &RequestPayload,
        headers: &Headers,
    ) -> Result<StreamingResponse, HttpError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
            payload: payload.clone(),
        });

        match self.next_response() {
            Some(MockResponse::Body {
                status,
                headers,
                chunks,
                hang,
            }) => {
                let body = self.counted(chunks.into_iter().map(Ok).collect(), hang);
                Ok(StreamingResponse::with_headers(status, headers, body))
            }
            Some(MockResponse::BodyError { chunks, error }) => {
                let mut items: Vec<Result<Bytes, HttpError>> =
                    chunks.into_iter().map(Ok).collect();
                items.push(Err(error));
                let body = self.counted(items, false);
                Ok(StreamingResponse::with_headers(
                    200,
                    content_type("text/event-stream"),
                    body,
                ))
            }
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}
