//! Incremental server-sent events decoder.
//!
//! Implements the event-stream framing rules: `field: value` lines, comment
//! lines starting with `:`, multi-line `data` joined with `\n`, dispatch on a
//! blank line, and any of `\n`, `\r\n`, or `\r` as a line terminator. Bytes
//! may arrive split at arbitrary points.

use quill_core::{Error, Result};

/// Event type used when a frame carries no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

/// Largest event accepted from the server, in bytes.
pub const MAX_EVENT_BYTES: usize = 1024 * 1024;

/// One dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

impl SseEvent {
    pub fn is_message(&self) -> bool {
        self.event == DEFAULT_EVENT
    }
}

#[derive(Debug, Default)]
pub struct SseEventDecoder {
    line: Vec<u8>,
    /// The previous byte was `\r`; a following `\n` belongs to the same terminator.
    after_cr: bool,
    event: Option<String>,
    data: Vec<String>,
    /// Bytes held in `data`.
    data_len: usize,
}

impl SseEventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the events it completed.
    ///
    /// An event larger than [`MAX_EVENT_BYTES`] is an [`Error::Stream`].
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>> {
        let mut events = Vec::new();
        for &byte in chunk {
            match byte {
                b'\n' if self.after_cr => self.after_cr = false,
                b'\n' | b'\r' => {
                    self.after_cr = byte == b'\r';
                    let line = std::mem::take(&mut self.line);
                    if let Some(event) = self.process_line(&String::from_utf8_lossy(&line)) {
                        events.push(event);
                    }
                }
                _ => {
                    self.after_cr = false;
                    if self.line.len() + self.data_len >= MAX_EVENT_BYTES {
                        self.reset();
                        return Err(Error::Stream(format!(
                            "Event exceeds {} bytes",
                            MAX_EVENT_BYTES
                        )));
                    }
                    self.line.push(byte);
                }
            }
        }
        Ok(events)
    }

    fn reset(&mut self) {
        self.line.clear();
        self.event = None;
        self.data.clear();
        self.data_len = 0;
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => {
                self.data_len += value.len() + 1;
                self.data.push(value.to_string());
            }
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        self.data_len = 0;
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(input: &str) -> Vec<SseEvent> {
        SseEventDecoder::new().push(input.as_bytes()).unwrap()
    }

    #[test]
    fn test_single_message() {
        let events = decode_all("data: {\"content\":\"Hel\"}\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "message");
        assert_eq!(events[0].data, "{\"content\":\"Hel\"}");
        assert!(events[0].is_message());
    }

    #[test]
    fn test_named_event() {
        let events = decode_all("id: 7\nevent: error\ndata: {\"error\":\"x\"}\n\n");
        assert_eq!(events[0].event, "error");
        assert_eq!(events[0].data, "{\"error\":\"x\"}");
        assert!(!events[0].is_message());
    }

    #[test]
    fn test_multiline_data_and_comments() {
        let events = decode_all(": keepalive\n\ndata: one\n: inline comment\ndata:two\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "one\ntwo");
    }

    #[test]
    fn test_crlf_and_cr_terminators() {
        let events = decode_all("data: a\r\n\r\ndata: b\r\rdata: c\n\n");
        let data: Vec<_> = events.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(data, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_across_chunks() {
        let mut decoder = SseEventDecoder::new();
        assert!(decoder.push(b"da").unwrap().is_empty());
        assert!(decoder.push(b"ta: caf\xc3").unwrap().is_empty());
        assert!(decoder.push(b"\xa9\r").unwrap().is_empty());
        let events = decoder.push(b"\n\r\n").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "café");
    }

    #[test]
    fn test_event_without_data_is_not_dispatched() {
        let mut decoder = SseEventDecoder::new();
        assert!(decoder.push(b"event: ping\n\n").unwrap().is_empty());
        // The event name does not leak into the next frame.
        let events = decoder.push(b"data: x\n\n").unwrap();
        assert_eq!(events[0].event, "message");
    }

    #[test]
    fn test_unterminated_event_is_not_dispatched() {
        let mut decoder = SseEventDecoder::new();
        assert!(decoder.push(b"data: partial\n").unwrap().is_empty());
    }

    #[test]
    fn test_field_without_colon_and_unknown_fields() {
        let events = decode_all("data\nretry: 100\nfoo: bar\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "");
    }

    #[test]
    fn test_oversized_event_is_rejected() {
        let mut decoder = SseEventDecoder::new();
        let line = format!("data: {}\n", "a".repeat(MAX_EVENT_BYTES / 2));
        assert!(decoder.push(line.as_bytes()).unwrap().is_empty());
        let err = decoder.push(line.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Stream(msg) if msg.contains("exceeds")));

        // The decoder starts clean after the rejection.
        let events = decoder.push(b"\ndata: next\n\n").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "next");
    }

    #[test]
    fn test_many_small_events_are_accepted() {
        let body = "data: x\n\n".repeat(200_000);
        let events = SseEventDecoder::new().push(body.as_bytes()).unwrap();
        assert_eq!(events.len(), 200_000);
    }
}
