//! SSE (Server-Sent Events) stream parser
//!
//! Parses the streaming body of an upstream response into discrete events.
//! SSE format consists of:
//! - `event: <name>` - event name line
//! - `id: <id>` - event id line
//! - `retry: <ms>` - reconnection hint
//! - `data: <payload>` - data line, may repeat
//! - Empty line - signals end of event
//! - Lines starting with `:` - comments (ignored)
//!
//! # Module structure
//! - `events` - Event type definitions (SseEvent, EventData, SseLine)
//! - `parser` - Parsing logic (SseParser, parse_sse_line, parse_event_block)

mod events;
mod parser;

// Re-export public types
pub use events::{EventData, SseEvent, SseLine};
pub use parser::{parse_event_block, parse_sse_line, SseParser};
