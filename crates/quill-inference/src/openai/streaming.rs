//! SSE stream parsing for OpenAI-compatible streaming responses.
//!
//! The parsing is split into pure pieces so it can be tested without a
//! network:
//!
//! - [`SseLineDecoder`] turns arbitrary byte chunks into complete lines.
//! - [`parse_data_line`] classifies one line as a delta, the end sentinel,
//!   or something to skip.
//! - [`parse_sse_body`] runs both over a complete body.
//!
//! [`parse_sse_stream`] wires them onto a live byte stream.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::time::Duration;

use quill_core::Error;

use super::types::ChatCompletionChunk;
use crate::summary::DeltaStream;

/// Prefix marking a data line.
pub const DATA_PREFIX: &str = "data: ";

/// Payload the upstream sends instead of a final chunk.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Classification of one upstream line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// A content fragment to relay.
    Delta(String),
    /// The upstream end-of-stream marker.
    Done,
    /// Blank, comment, keepalive, malformed, or content-free line.
    Skip,
}

/// Classify a single line (without its terminator).
pub fn parse_data_line(line: &str) -> LineOutcome {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return LineOutcome::Skip;
    };
    let payload = payload.trim();
    if payload == DONE_SENTINEL {
        return LineOutcome::Done;
    }

    match serde_json::from_str::<ChatCompletionChunk>(payload) {
        Ok(chunk) => match chunk.into_first_delta() {
            Some(content) if !content.is_empty() => LineOutcome::Delta(content),
            _ => LineOutcome::Skip,
        },
        Err(e) => {
            tracing::trace!(error = %e, "Skipping unparseable SSE data line");
            LineOutcome::Skip
        }
    }
}

/// Extract every delta from a complete response body, stopping at the sentinel.
pub fn parse_sse_body(body: &str) -> Vec<String> {
    let mut deltas = Vec::new();
    for line in body.split('\n') {
        match parse_data_line(line.strip_suffix('\r').unwrap_or(line)) {
            LineOutcome::Delta(d) => deltas.push(d),
            LineOutcome::Done => break,
            LineOutcome::Skip => {}
        }
    }
    deltas
}

/// Longest line accepted from upstream, in bytes.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Incremental splitter from byte chunks to lines.
///
/// Chunk boundaries may fall anywhere, including inside a multi-byte UTF-8
/// sequence; bytes are buffered until a `\n` completes the line. A trailing
/// `\r` is removed from each line. A line longer than [`MAX_LINE_BYTES`] is
/// an [`Error::Stream`].
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buf: Vec<u8>,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the lines it completed.
    pub fn push(&mut self, chunk: &[u8]) -> quill_core::Result<Vec<String>> {
        let mut lines = Vec::new();
        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.extend(&rest[..pos])?;
            lines.push(self.take_line());
            rest = &rest[pos + 1..];
        }
        self.extend(rest)?;
        Ok(lines)
    }

    /// Flush a final unterminated line at end of body.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        Some(self.take_line())
    }

    fn extend(&mut self, bytes: &[u8]) -> quill_core::Result<()> {
        if self.buf.len() + bytes.len() > MAX_LINE_BYTES {
            self.buf.clear();
            return Err(Error::Stream(format!(
                "Upstream line exceeds {} bytes",
                MAX_LINE_BYTES
            )));
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn take_line(&mut self) -> String {
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        line
    }
}

type ByteStream<E> = Pin<Box<dyn Stream<Item = Result<Bytes, E>> + Send>>;

struct ParseState<E> {
    inner: ByteStream<E>,
    decoder: SseLineDecoder,
    pending: VecDeque<String>,
    finished: bool,
    idle_timeout: Option<Duration>,
}

impl<E> ParseState<E> {
    /// Queue the outcome of one line. Returns true once the sentinel is seen.
    fn absorb(&mut self, line: &str) -> bool {
        match parse_data_line(line) {
            LineOutcome::Delta(d) => {
                self.pending.push_back(d);
                false
            }
            LineOutcome::Done => {
                self.finished = true;
                true
            }
            LineOutcome::Skip => false,
        }
    }
}

/// Parse an SSE byte stream from an OpenAI-compatible endpoint into deltas.
///
/// The resulting stream ends at the `[DONE]` sentinel or at end of body.
/// A transport error, or no bytes for longer than `idle_timeout`, yields a
/// single [`Error::Stream`] and ends the stream. Dropping the returned
/// stream drops `stream`.
pub fn parse_sse_stream<S, E>(stream: S, idle_timeout: Option<Duration>) -> DeltaStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = ParseState {
        inner: Box::pin(stream),
        decoder: SseLineDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
        idle_timeout,
    };

    let deltas = futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(delta) = st.pending.pop_front() {
                return Some((Ok(delta), st));
            }
            if st.finished {
                return None;
            }

            let next = match st.idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, st.inner.next()).await {
                    Ok(item) => item,
                    Err(_) => {
                        st.finished = true;
                        let err = Error::Stream(format!(
                            "No data from upstream for {}ms",
                            limit.as_millis()
                        ));
                        return Some((Err(err), st));
                    }
                },
                None => st.inner.next().await,
            };

            match next {
                Some(Ok(bytes)) => match st.decoder.push(&bytes) {
                    Ok(lines) => {
                        for line in lines {
                            if st.absorb(&line) {
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        st.finished = true;
                        return Some((Err(e), st));
                    }
                },
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(Error::Stream(format!("Upstream stream error: {}", e))), st));
                }
                None => {
                    if let Some(line) = st.decoder.finish() {
                        st.absorb(&line);
                    }
                    st.finished = true;
                }
            }
        }
    });

    Box::pin(deltas)
}
