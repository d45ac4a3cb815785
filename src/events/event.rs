//! # Records delivered to subscribers.
//!
//! A [`StreamEvent`] is one decoded frame of a watched kind. Once appended to
//! the event log it is shared as `Arc<StreamEvent>` and never changes.
//!
//! ## Example
//! ```rust
//! use streamvisor::{Frame, StreamEvent};
//!
//! let frame = Frame::new("progress", r#"{"step": 1}"#).with_id("41");
//! let ev = StreamEvent::decode(&frame).unwrap();
//!
//! assert_eq!(ev.kind, "progress");
//! assert_eq!(ev.cursor.as_deref(), Some("41"));
//! assert_eq!(ev.payload["step"], 1);
//! ```

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::FrameError;
use crate::frames::Frame;

/// One record of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Server-issued resume token (the SSE last event id).
    pub cursor: Option<String>,
    /// Event kind; `"message"` when the server sent none.
    pub kind: String,
    /// Decoded JSON payload.
    pub payload: serde_json::Value,
    /// Wall-clock time the frame was decoded.
    pub received_at: SystemTime,
}

impl StreamEvent {
    /// Creates an event stamped with the current time.
    pub fn new(
        kind: impl Into<String>,
        payload: serde_json::Value,
        cursor: Option<String>,
    ) -> Self {
        Self {
            cursor,
            kind: kind.into(),
            payload,
            received_at: SystemTime::now(),
        }
    }

    /// Decodes a frame's JSON payload into an event.
    pub fn decode(frame: &Frame) -> Result<Self, FrameError> {
        let payload = frame.payload()?;
        Ok(Self::new(frame.kind(), payload, frame.id.clone()))
    }
}
