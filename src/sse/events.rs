//! Event types produced by the SSE parser.

use serde::Serialize;
use serde_json::Value;

/// Represents a classified SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Data payload (e.g., "data: {\"text\": \"hello\"}")
    Data(String),
    /// Event name declaration (e.g., "event: content")
    Event(String),
    /// Event id (e.g., "id: 42")
    Id(String),
    /// Reconnection hint in milliseconds, kept verbatim
    Retry(String),
    /// Comment line (starts with ':')
    Comment(String),
    /// Blank line
    Empty,
}

/// Payload of an event's `data` field.
///
/// The joined data lines are decoded as JSON when possible and kept as text
/// otherwise. Serializes transparently as the inner value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventData {
    Json(Value),
    Text(String),
}

impl EventData {
    /// Decode joined data lines, falling back to the raw text.
    pub fn from_joined(joined: String) -> Self {
        match serde_json::from_str::<Value>(&joined) {
            Ok(value) => EventData::Json(value),
            Err(_) => EventData::Text(joined),
        }
    }
}

/// A single event decoded from one blank-line delimited block.
///
/// Absent fields are omitted from the serialized form, so an event without
/// data lines has no `data` key at all.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SseEvent {
    /// Event name from the last `event:` line
    #[serde(rename = "event", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Event id from the last `id:` line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Value of the last `retry:` line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<String>,
    /// Joined data lines, present only if at least one data line was seen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<EventData>,
}

impl SseEvent {
    /// True when no field was set. Such events are never emitted.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.id.is_none() && self.retry.is_none() && self.data.is_none()
    }

    /// Serialize to the JSON text frame sent to socket clients.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
