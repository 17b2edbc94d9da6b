//! Mock implementations for testing.
//!
//! This module provides mock implementations of the trait abstractions,
//! enabling session tests without network dependencies.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - Upstream client with queued responses
//! - [`MockConnection`] - Socket connection with scripted frames

pub mod http;
pub mod websocket;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use websocket::MockConnection;
