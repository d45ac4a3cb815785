//! Transport frame parser.
//!
//! Turns the raw bytes of a `text/event-stream` body into typed [`Frame`]s.
//! The parser is incremental: chunks may split lines, fields and even the
//! CR/LF pair anywhere, and the output is identical to feeding the whole body
//! at once.
//!
//! ## Contents
//! - [`FrameDecoder`] line splitter and field accumulator (one per connection)
//! - [`Frame`] one dispatched event: `id`, `event`, `data`
//! - [`Decoded`] decoder output (frame, retry hint, malformed frame or overflow)
//!
//! ## Wire example
//! ```text
//! id: 41
//! event: progress
//! data: {"step": 1}
//!
//! : keep-alive comment
//! retry: 5000
//!
//! ```

mod decoder;
mod frame;

pub use decoder::{DEFAULT_MAX_BUFFER, Decoded, FrameDecoder};
pub use frame::{DEFAULT_KIND, Frame};
