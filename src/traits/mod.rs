//! Trait abstractions for dependency injection and testability.
//!
//! The session talks to the outside world only through these two traits,
//! so it can be driven in tests without a network.
//!
//! # Traits
//!
//! - [`HttpClient`] - Upstream POST returning a streaming response
//! - [`FrameConnection`] - One accepted WebSocket connection

pub mod http;
pub mod websocket;

pub use http::{ByteStream, Headers, HttpClient, HttpError, StreamingResponse};
pub use websocket::{ConnectionError, FrameConnection, InboundFrame};
