//! Error frames sent back to socket clients.

use serde::Serialize;

/// Structured error reported over the socket when an upstream call fails.
///
/// `status` is present only when the upstream answered with a non-success
/// status; transport failures carry just a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorFrame {
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl ErrorFrame {
    /// Upstream answered with a non-success status.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            error: true,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Upstream could not be reached or its body could not be read.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            error: true,
            status: None,
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
