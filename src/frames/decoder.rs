//! # Incremental `text/event-stream` decoder.
//!
//! [`FrameDecoder`] consumes arbitrary byte chunks and yields [`Decoded`]
//! items as soon as a blank line completes a frame.
//!
//! ## Rules
//! - Line endings: `LF`, `CR` or `CRLF`; a `CR` ending one chunk and a `LF`
//!   starting the next are a single line ending.
//! - A UTF-8 BOM in front of the first line is skipped.
//! - Lines starting with `:` are comments.
//! - `field:value` strips at most one space after the colon; a line without a
//!   colon is a field with an empty value.
//! - A blank line dispatches. With an empty data buffer nothing is emitted,
//!   but the last event id survives.
//! - The last event id persists across frames: a frame without `id:` carries
//!   the previous cursor. `id:` with an empty value clears it; a value
//!   containing NUL is ignored.
//! - `retry:` with ASCII digits only yields [`Decoded::Retry`].
//! - Bytes of the unfinished line plus the pending data buffer are capped at
//!   `max_buffer` ([`DEFAULT_MAX_BUFFER`] by default). Crossing the cap yields
//!   [`Decoded::Overflow`] and resets the decoder; the connection is then
//!   treated as failed.

use std::time::Duration;

use crate::error::FrameError;

use super::Frame;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Default cap on bytes buffered for one unfinished frame (8 MiB).
pub const DEFAULT_MAX_BUFFER: usize = 8 * 1024 * 1024;

/// Decoder output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A complete frame.
    Frame(Frame),
    /// The server suggested a reconnection delay.
    Retry(Duration),
    /// A frame was dispatched but its data could not be decoded as text.
    Malformed(FrameError),
    /// More than the given number of bytes piled up without a frame boundary.
    Overflow(usize),
}

/// Incremental event-stream decoder.
///
/// One decoder belongs to one physical connection. Bytes left in the line
/// buffer when the connection dies are discarded with the decoder.
#[derive(Debug)]
pub struct FrameDecoder {
    /// Bytes of the current, not yet terminated line.
    line: Vec<u8>,
    /// Previous chunk ended with `CR`; swallow a leading `LF`.
    pending_cr: bool,
    /// The first line has been seen (BOM handling done).
    started: bool,

    data: Vec<u8>,
    event: Option<String>,
    last_id: Option<String>,

    max_buffer: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self {
            line: Vec::new(),
            pending_cr: false,
            started: false,
            data: Vec::new(),
            event: None,
            last_id: None,
            max_buffer: DEFAULT_MAX_BUFFER,
        }
    }
}

impl FrameDecoder {
    /// Creates a decoder with an empty last event id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder whose last event id starts at `cursor`.
    ///
    /// Used when resuming, so frames without `id:` still carry a cursor.
    #[must_use]
    pub fn resume(cursor: Option<String>) -> Self {
        Self {
            last_id: cursor,
            ..Self::default()
        }
    }

    /// Replaces the buffer cap.
    #[must_use]
    pub fn with_max_buffer(mut self, max_buffer: usize) -> Self {
        self.max_buffer = max_buffer;
        self
    }

    /// Returns the last event id currently in effect.
    pub fn last_id(&self) -> Option<&str> {
        self.last_id.as_deref()
    }

    /// Feeds one chunk and returns everything it completed, in stream order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Decoded> {
        let mut out = Vec::new();
        if chunk.is_empty() {
            return out;
        }

        let mut rest = chunk;
        if self.pending_cr {
            self.pending_cr = false;
            if rest[0] == b'\n' {
                rest = &rest[1..];
            }
        }

        let mut start = 0;
        let mut i = 0;
        while i < rest.len() {
            let b = rest[i];
            if b != b'\n' && b != b'\r' {
                i += 1;
                continue;
            }

            if self.line.is_empty() {
                self.process_line(&rest[start..i], &mut out);
            } else {
                self.line.extend_from_slice(&rest[start..i]);
                let line = std::mem::take(&mut self.line);
                self.process_line(&line, &mut out);
                self.line = line;
                self.line.clear();
            }

            if b == b'\r' {
                match rest.get(i + 1) {
                    Some(b'\n') => i += 1,
                    Some(_) => {}
                    None => self.pending_cr = true,
                }
            }
            i += 1;
            start = i;
        }
        self.line.extend_from_slice(&rest[start..]);

        if self.line.len() + self.data.len() > self.max_buffer {
            self.line = Vec::new();
            self.data = Vec::new();
            self.event = None;
            self.pending_cr = false;
            out.push(Decoded::Overflow(self.max_buffer));
        }
        out
    }

    fn process_line(&mut self, mut line: &[u8], out: &mut Vec<Decoded>) {
        if !self.started {
            self.started = true;
            line = line.strip_prefix(BOM).unwrap_or(line);
        }

        if line.is_empty() {
            self.dispatch(out);
            return;
        }
        if line[0] == b':' {
            return;
        }

        let (field, value) = match line.iter().position(|&b| b == b':') {
            Some(colon) => {
                let value = &line[colon + 1..];
                (&line[..colon], value.strip_prefix(b" ").unwrap_or(value))
            }
            None => (line, &[][..]),
        };

        match field {
            b"data" => {
                self.data.extend_from_slice(value);
                self.data.push(b'\n');
            }
            b"event" => {
                self.event = Some(String::from_utf8_lossy(value).into_owned());
            }
            b"id" => {
                if !value.contains(&0) {
                    self.last_id = if value.is_empty() {
                        None
                    } else {
                        Some(String::from_utf8_lossy(value).into_owned())
                    };
                }
            }
            b"retry" => {
                if !value.is_empty() && value.iter().all(u8::is_ascii_digit) {
                    // all-digit input only fails to parse on overflow
                    if let Ok(ms) = std::str::from_utf8(value).unwrap_or("").parse::<u64>() {
                        out.push(Decoded::Retry(Duration::from_millis(ms)));
                    }
                }
            }
            _ => {}
        }
    }

    fn dispatch(&mut self, out: &mut Vec<Decoded>) {
        let event = self.event.take();
        if self.data.is_empty() {
            return;
        }
        self.data.pop();
        let data = std::mem::take(&mut self.data);

        match String::from_utf8(data) {
            Ok(data) => out.push(Decoded::Frame(Frame {
                id: self.last_id.clone(),
                event,
                data,
            })),
            Err(_) => out.push(Decoded::Malformed(FrameError::Encoding)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(out: Vec<Decoded>) -> Vec<Frame> {
        out.into_iter()
            .filter_map(|d| match d {
                Decoded::Frame(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_frame() {
        let mut dec = FrameDecoder::new();
        let out = frames(dec.push(b"id: 1\nevent: progress\ndata: {\"step\":1}\n\n"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id.as_deref(), Some("1"));
        assert_eq!(out[0].kind(), "progress");
        assert_eq!(out[0].data, "{\"step\":1}");
    }

    #[test]
    fn test_multiline_data_joined_with_lf() {
        let mut dec = FrameDecoder::new();
        let out = frames(dec.push(b"data: [1,\ndata: 2]\n\n"));
        assert_eq!(out[0].data, "[1,\n2]");
        assert_eq!(out[0].kind(), "message");
    }

    #[test]
    fn test_split_across_chunks_anywhere() {
        let body = b"id: 7\r\nevent: progress\r\ndata: {\"a\":1}\r\n\r\ndata: 2\r\n\r\n";
        let whole = frames(FrameDecoder::new().push(body));

        for split in 1..body.len() {
            let mut dec = FrameDecoder::new();
            let mut out = frames(dec.push(&body[..split]));
            out.extend(frames(dec.push(&body[split..])));
            assert_eq!(out, whole, "split at {split}");
        }
        assert_eq!(whole.len(), 2);
    }

    #[test]
    fn test_cr_only_line_endings() {
        let mut dec = FrameDecoder::new();
        let out = frames(dec.push(b"event: a\rdata: 1\r\r"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind(), "a");
        assert_eq!(out[0].data, "1");
    }

    #[test]
    fn test_comments_and_unknown_fields_ignored() {
        let mut dec = FrameDecoder::new();
        let out = frames(dec.push(b": ping\nfoo: bar\ndata: x\n\n"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].data, "x");
    }

    #[test]
    fn test_empty_data_buffer_does_not_dispatch() {
        let mut dec = FrameDecoder::new();
        let out = dec.push(b"event: lonely\nid: 3\n\ndata: y\n\n");
        let out = frames(out);
        assert_eq!(out.len(), 1);
        // event type was reset, id survived
        assert_eq!(out[0].kind(), "message");
        assert_eq!(out[0].id.as_deref(), Some("3"));
    }

    #[test]
    fn test_last_id_persists_and_clears() {
        let mut dec = FrameDecoder::new();
        let out = frames(dec.push(b"id: 5\ndata: a\n\ndata: b\n\nid\ndata: c\n\n"));
        assert_eq!(out[0].id.as_deref(), Some("5"));
        assert_eq!(out[1].id.as_deref(), Some("5"));
        assert_eq!(out[2].id, None);
    }

    #[test]
    fn test_id_with_nul_ignored() {
        let mut dec = FrameDecoder::resume(Some("9".into()));
        let out = frames(dec.push(b"id: a\0b\ndata: z\n\n"));
        assert_eq!(out[0].id.as_deref(), Some("9"));
    }

    #[test]
    fn test_bom_skipped_once() {
        let mut dec = FrameDecoder::new();
        let mut out = frames(dec.push(b"\xEF\xBB"));
        out.extend(frames(dec.push(b"\xBFdata: 1\n\n")));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].data, "1");
    }

    #[test]
    fn test_retry_hint() {
        let mut dec = FrameDecoder::new();
        let out = dec.push(b"retry: 2500\nretry: 1x\n\n");
        assert_eq!(out, vec![Decoded::Retry(Duration::from_millis(2500))]);
    }

    #[test]
    fn test_invalid_utf8_data_is_malformed() {
        let mut dec = FrameDecoder::new();
        let out = dec.push(b"data: \xFF\xFE\n\ndata: ok\n\n");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Decoded::Malformed(FrameError::Encoding));
        assert!(matches!(&out[1], Decoded::Frame(f) if f.data == "ok"));
    }

    #[test]
    fn test_unterminated_line_overflows() {
        let mut dec = FrameDecoder::new().with_max_buffer(16);
        assert!(dec.push(b"data: 0123456").is_empty());
        assert_eq!(dec.push(b"789abcdef"), vec![Decoded::Overflow(16)]);
        assert!(dec.push(b"").is_empty());
    }

    #[test]
    fn test_pending_data_lines_count_toward_cap() {
        let mut dec = FrameDecoder::new().with_max_buffer(16);
        let out = dec.push(b"data: 12345678
data: 12345678
");
        assert_eq!(out, vec![Decoded::Overflow(16)]);

        // completed frames before the cap are still emitted
        let mut dec = FrameDecoder::new().with_max_buffer(16);
        let out = dec.push(b"data: 1

data: 0123456789abcdef");
        assert_eq!(out.len(), 2);
        assert!(matches!(&out[0], Decoded::Frame(f) if f.data == "1"));
        assert_eq!(out[1], Decoded::Overflow(16));
    }

    #[test]
    fn test_unterminated_frame_is_held() {
        let mut dec = FrameDecoder::new();
        assert!(dec.push(b"data: partial\n").is_empty());
        assert_eq!(frames(dec.push(b"\n")).len(), 1);
    }
}
