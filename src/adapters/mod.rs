//! Concrete implementations of trait abstractions.
//!
//! This module provides the production adapters that implement the traits
//! defined in `crate::traits`.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - Upstream HTTP client using reqwest
//! - [`AxumConnection`] - Socket connection using axum's WebSocket
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles for both:
//! - [`mock::MockHttpClient`] - Queued upstream responses
//! - [`mock::MockConnection`] - Scripted inbound frames

pub mod axum_ws;
pub mod mock;
pub mod reqwest_http;

pub use axum_ws::AxumConnection;
pub use mock::{MockConnection, MockHttpClient};
pub use reqwest_http::ReqwestHttpClient;
