//! sse2ws - bridge WebSocket clients to a streaming SSE endpoint
//!
//! Each text message received on a socket is POSTed upstream; the
//! `text/event-stream` response is parsed and every event is relayed back to
//! that socket as a JSON text frame.
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod frame;
pub mod logging;
pub mod payload;
pub mod server;
pub mod session;
pub mod sse;
pub mod traits;
