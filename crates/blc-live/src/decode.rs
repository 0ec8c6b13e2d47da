//! SSE frame decoding and message classification.
//!
//! Pure byte-pushing logic, no IO. The transport hands in chunks as they
//! arrive; chunk boundaries fall anywhere, including inside a UTF-8
//! sequence, so the decoder buffers raw bytes and only converts complete
//! lines.

use blc_schemas::LiveEnvelope;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// What a single live message means for the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveSignal {
    /// The `CONNECTED` handshake sentinel. Marks the stream healthy; never
    /// triggers a refetch.
    Handshake,
    /// Any other well-formed message, including types this build does not
    /// know. The queue must be refetched exactly once.
    Refresh,
    /// Malformed, non-object, or untyped payload. Silently dropped.
    Ignored,
}

/// Classify one event's `data` payload.
pub fn classify(payload: &str) -> LiveSignal {
    match serde_json::from_str::<LiveEnvelope>(payload) {
        Ok(envelope) if envelope.is_handshake() => LiveSignal::Handshake,
        Ok(envelope) if !envelope.kind.is_empty() => LiveSignal::Refresh,
        _ => LiveSignal::Ignored,
    }
}

// ---------------------------------------------------------------------------
// Frame decoder
// ---------------------------------------------------------------------------

/// Incremental SSE decoder: feed transport chunks in, get completed event
/// payloads out.
///
/// Only `data:` fields matter to this consumer; `event:`, `id:`, `retry:`
/// and comment lines are skipped. Multiple `data:` lines in one event are
/// joined with `\n` per the SSE spec.
#[derive(Debug, Default)]
pub struct SseFrameDecoder {
    buf: Vec<u8>,
    data_lines: Vec<String>,
}

impl SseFrameDecoder {
    /// Push one transport chunk; returns the `data` payloads of every event
    /// completed by it.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut completed = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buf.drain(..=pos).collect();
            let mut line = String::from_utf8_lossy(&line_bytes).into_owned();
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }
            self.take_line(&line, &mut completed);
        }
        completed
    }

    fn take_line(&mut self, line: &str, out: &mut Vec<String>) {
        if line.is_empty() {
            // Blank line terminates the event.
            if !self.data_lines.is_empty() {
                out.push(self.data_lines.join("\n"));
                self.data_lines.clear();
            }
            return;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            self.data_lines
                .push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
        }
        // event:/id:/retry: and ":" comments carry nothing for us.
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
