//! Inbound socket message payloads.
//!
//! A text frame is forwarded upstream as JSON when it parses as JSON and as
//! raw text otherwise. Non-JSON input is not an error.

use serde_json::Value;

/// Body of one outbound upstream request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPayload {
    /// The frame decoded as JSON; sent as a JSON body
    Json(Value),
    /// Anything else; sent verbatim as a text body
    Raw(String),
}

impl RequestPayload {
    /// Classify an inbound text frame.
    pub fn from_text(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => RequestPayload::Json(value),
            Err(_) => RequestPayload::Raw(text.to_string()),
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, RequestPayload::Json(_))
    }

    /// Render the request body exactly as it is put on the wire.
    pub fn to_body(&self) -> String {
        match self {
            RequestPayload::Json(value) => value.to_string(),
            RequestPayload::Raw(text) => text.clone(),
        }
    }
}
