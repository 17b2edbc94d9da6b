//! Reqwest-based HTTP client adapter.
//!
//! This module provides the production upstream client, implementing the
//! [`HttpClient`] trait from `crate::traits`.

use async_trait::async_trait;
use futures_util::StreamExt;
use std::time::Duration;

use crate::payload::RequestPayload;
use crate::traits::{Headers, HttpClient, HttpError, StreamingResponse};

/// HTTP client implementation using reqwest.
///
/// The wrapped `reqwest::Client` is a connection pool and is shared by all
/// sessions. Each response, and the pooled connection it holds, belongs to a
/// single call and is released when the returned body is dropped.
///
/// # Example
///
/// ```ignore
/// use sse2ws::adapters::ReqwestHttpClient;
///
/// let client = ReqwestHttpClient::with_timeout(Some(Duration::from_secs(60)))?;
/// let response = client.post(url, &payload, &Headers::new()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    /// Deadline for connecting and receiving the response head. The body
    /// stream is never cut off.
    response_timeout: Option<Duration>,
}

impl ReqwestHttpClient {
    /// Create a new ReqwestHttpClient with default settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            response_timeout: None,
        }
    }

    /// Create a client that gives up when the upstream has not answered
    /// within `timeout`. An event stream that has started may run for as
    /// long as the upstream keeps it open.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, HttpError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| HttpError::Other(e.to_string()))?;
        Ok(Self {
            client,
            response_timeout: timeout,
        })
    }

    /// Convert reqwest error to HttpError.
    fn convert_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(err.to_string())
        } else if err.is_body() || err.is_decode() {
            HttpError::Body(err.to_string())
        } else {
            HttpError::Other(err.to_string())
        }
    }

    /// Convert reqwest headers to our Headers type.
    fn convert_headers(headers: &reqwest::header::HeaderMap) -> Headers {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    /// Apply headers to a request builder.
    fn apply_headers(
        builder: reqwest::RequestBuilder,
        headers: &Headers,
    ) -> reqwest::RequestBuilder {
        let mut builder = builder;
        for (key, value) in headers {
            builder = builder.header(key, value);
        }
        builder
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post(
        &self,
        url: &str,
        payload: &RequestPayload,
        headers: &Headers,
    ) -> Result<StreamingResponse, HttpError> {
        // Headers first: `.json` only sets Content-Type when it is absent.
        let builder = Self::apply_headers(self.client.post(url), headers);
        let builder = match payload {
            RequestPayload::Json(value) => builder.json(value),
            RequestPayload::Raw(text) => builder.body(text.clone()),
        };

        let response = match self.response_timeout {
            Some(timeout) => tokio::time::timeout(timeout, builder.send())
                .await
                .map_err(|_| HttpError::Timeout(format!("no response within {:?}", timeout)))?,
            None => builder.send().await,
        }
        .map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        let response_headers = Self::convert_headers(response.headers());
        let body = response
            .bytes_stream()
            .map(|result| result.map_err(Self::convert_error));

        Ok(StreamingResponse::with_headers(
            status,
            response_headers,
            Box::pin(body),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures_util::StreamExt;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_with_timeout_builds() {
        let client = ReqwestHttpClient::with_timeout(Some(Duration::from_secs(5))).unwrap();
        assert_eq!(client.response_timeout, Some(Duration::from_secs(5)));
        assert!(ReqwestHttpClient::with_timeout(None).is_ok());
        assert!(ReqwestHttpClient::new().response_timeout.is_none());
    }

    #[tokio::test]
    async fn test_slow_response_head_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::with_timeout(Some(Duration::from_millis(200))).unwrap();
        let result = client
            .post(&server.uri(), &RequestPayload::Raw("x".to_string()), &Headers::new())
            .await;
        assert!(matches!(result, Err(HttpError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_timeout_does_not_cut_off_long_stream() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ntransfer-encoding: chunked\r\n\r\n")
                .await
                .unwrap();
            for i in 0..5 {
                tokio::time::sleep(Duration::from_millis(100)).await;
                let data = format!("data: {}\n\n", i);
                let chunk = format!("{:x}\r\n{}\r\n", data.len(), data);
                socket.write_all(chunk.as_bytes()).await.unwrap();
            }
            socket.write_all(b"0\r\n\r\n").await.unwrap();
        });

        // Whole stream takes ~500ms, well past the 200ms deadline
        let client = ReqwestHttpClient::with_timeout(Some(Duration::from_millis(200))).unwrap();
        let response = client
            .post(
                &format!("http://{}/sse", addr),
                &RequestPayload::Raw("x".to_string()),
                &Headers::new(),
            )
            .await
            .unwrap();

        let mut body = response.body;
        let mut received = Vec::new();
        while let Some(chunk) = body.next().await {
            received.extend_from_slice(&chunk.unwrap());
        }
        let text = String::from_utf8(received).unwrap();
        assert!(text.ends_with("data: 4\n\n"), "got {:?}", text);
    }

    #[test]
    fn test_apply_headers() {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        let client = reqwest::Client::new();
        let builder = client.post("http://localhost/stream");
        let request = ReqwestHttpClient::apply_headers(builder, &headers)
            .build()
            .unwrap();

        assert_eq!(
            request.headers().get("accept").unwrap(),
            "text/event-stream"
        );
    }

    #[test]
    fn test_convert_headers_lowercases_names() {
        let mut map = reqwest::header::HeaderMap::new();
        map.insert(
            reqwest::header::CONTENT_TYPE,
            "text/event-stream".parse().unwrap(),
        );
        let headers = ReqwestHttpClient::convert_headers(&map);
        assert_eq!(
            headers.get("content-type").map(String::as_str),
            Some("text/event-stream")
        );
    }

    #[tokio::test]
    async fn test_invalid_url_is_an_error() {
        let client = ReqwestHttpClient::new();
        let result = client
            .post("not a url", &RequestPayload::Raw("x".to_string()), &Headers::new())
            .await;
        assert!(result.is_err());
    }
}
