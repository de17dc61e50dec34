use async_stream::try_stream;
use futures_util::{StreamExt, stream::BoxStream};

use crate::error::CommonRequestError;

/// Incremental line decoder for `data:`-prefixed event streams.
///
/// The transport may split a logical line anywhere, including mid-JSON, so the
/// decoder keeps a single pending-partial-line buffer across [`feed`] calls.
/// Each call yields the payloads of every line completed by that chunk;
/// a trailing incomplete line stays buffered and is never emitted early.
///
/// [`feed`]: SseLineDecoder::feed
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: Vec<u8>,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed the next raw chunk and collect the payloads of completed lines.
    ///
    /// Lines that are not `data:`-prefixed (blank keep-alives, `:` comments,
    /// `event:`/`id:`/`retry:` fields) and the legacy `[DONE]` terminator are
    /// dropped here, so callers only ever see event payloads.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes = self.buffer.drain(..=pos).collect::<Vec<u8>>();
            if let Some(payload) = Self::decode_line(&line_bytes) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flush the buffer at end-of-stream.
    ///
    /// A final line that arrived whole but without its trailing newline is
    /// still a complete frame and must not be eaten.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line_bytes = std::mem::take(&mut self.buffer);
        Self::decode_line(&line_bytes)
    }

    /// Extract the payload from one raw line, or `None` for non-event lines.
    fn decode_line(line_bytes: &[u8]) -> Option<String> {
        let Ok(line) = std::str::from_utf8(line_bytes) else {
            tracing::debug!("dropping non-UTF-8 line from event stream");
            return None;
        };
        let line = line.trim_end_matches(['\n', '\r']);

        if line.is_empty() || line.starts_with(':') {
            return None;
        }

        let rest = line.strip_prefix("data:")?;
        let data = rest.trim_start();

        if data.is_empty() || data == "[DONE]" {
            return None;
        }

        Some(data.to_string())
    }
}

/// Apply an [`SseLineDecoder`] to a streaming response body.
///
/// Yields one payload string per decoded event line, in delivery order.
/// Transport read failures surface as `Err` items; the non-2xx case is the
/// caller's to handle before the body is handed over.
pub fn sse_payload_stream(
    response: reqwest::Response,
) -> BoxStream<'static, Result<String, CommonRequestError>> {
    Box::pin(try_stream! {
        let mut decoder = SseLineDecoder::new();
        let mut byte_stream = response.bytes_stream();

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = chunk_result?;
            for payload in decoder.feed(&chunk) {
                yield payload;
            }
        }

        if let Some(payload) = decoder.finish() {
            yield payload;
        }
    })
}
