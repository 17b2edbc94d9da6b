//! SSE stream parsing logic
//!
//! Contains the stateful [`SseParser`] that buffers raw body bytes and emits
//! complete events, as well as the line and block parsing functions.

use bytes::BytesMut;

use crate::sse::events::{EventData, SseEvent, SseLine};

/// Classify a single SSE line.
///
/// The line is trimmed first, so CRLF endings and indented fields are
/// accepted. Lines matching no known field are treated as unprefixed data.
pub fn parse_sse_line(line: &str) -> SseLine {
    let line = line.trim();

    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(rest) = line.strip_prefix("data:") {
        return SseLine::Data(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("id:") {
        return SseLine::Id(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("retry:") {
        return SseLine::Retry(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix(':') {
        return SseLine::Comment(rest.trim().to_string());
    }

    SseLine::Data(line.to_string())
}

/// Parse one blank-line delimited block into an event.
///
/// Returns `None` when the block sets no field (comments and blank lines
/// only).
pub fn parse_event_block(block: &str) -> Option<SseEvent> {
    let mut event = SseEvent::default();
    let mut data_lines: Vec<String> = Vec::new();

    for line in block.split('\n') {
        match parse_sse_line(line) {
            SseLine::Data(data) => data_lines.push(data),
            SseLine::Event(name) => event.name = Some(name),
            SseLine::Id(id) => event.id = Some(id),
            SseLine::Retry(retry) => event.retry = Some(retry),
            SseLine::Comment(_) | SseLine::Empty => {}
        }
    }

    // An empty `data:` line still counts as data.
    if !data_lines.is_empty() {
        event.data = Some(EventData::from_joined(data_lines.join("\n")));
    }

    if event.is_empty() {
        None
    } else {
        Some(event)
    }
}

/// Locate the first blank-line delimiter at or after `from`.
///
/// Returns `(block_end, rest_start)`: the block is `buf[..block_end]` and the
/// unconsumed remainder starts at `rest_start`. Accepts `\n\n` and `\n\r\n`,
/// which covers LF and CRLF producers.
fn find_delimiter(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut start = from;
    while let Some(offset) = buf[start..].iter().position(|&b| b == b'\n') {
        let newline = start + offset;
        let rest = &buf[newline + 1..];
        if rest.first() == Some(&b'\n') {
            return Some((newline, newline + 2));
        }
        if rest.starts_with(b"\r\n") {
            return Some((newline, newline + 3));
        }
        start = newline + 1;
    }
    None
}

/// Stateful SSE parser for one upstream response body.
///
/// Raw bytes are buffered and only decoded once a complete block has been
/// delimited, so multi-byte characters split across network chunks decode
/// the same as if they had arrived together.
#[derive(Debug, Default)]
pub struct SseParser {
    /// Bytes received but not yet consumed as a complete block
    buffer: BytesMut,
    /// Offset before which the buffer is known to hold no delimiter
    scanned: usize,
}

impl SseParser {
    /// Create a new SSE parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every event completed by it.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Blocks that set no
    /// field are dropped.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some((block_end, rest_start)) = find_delimiter(&self.buffer, self.scanned) {
            let block = self.buffer.split_to(rest_start);
            self.scanned = 0;
            if let Some(event) = parse_event_block(&String::from_utf8_lossy(&block[..block_end])) {
                events.push(event);
            }
        }

        // A delimiter needs up to two bytes after its newline.
        self.scanned = self.buffer.len().saturating_sub(2);
        events
    }

    /// Parse whatever is left once the body is exhausted.
    ///
    /// Returns `None` if the remainder is empty or whitespace only.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let remainder = self.buffer.split();
        self.scanned = 0;

        let text = String::from_utf8_lossy(&remainder);
        if text.trim().is_empty() {
            return None;
        }
        parse_event_block(&text)
    }
}
