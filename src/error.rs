//! Error types used by the streamvisor client.
//!
//! This module defines two error enums:
//!
//! - [`StreamError`]: transport-level failures of a physical connection.
//!   These either trigger a reconnect or close the subscription.
//! - [`FrameError`]: a single frame that could not be decoded. These never
//!   leave the lifecycle: the frame is dropped and the stream continues.
//!
//! Both types provide `as_label` for logging; [`StreamError::is_retryable`]
//! tells the reconnection policy whether a retry makes sense at all.

use thiserror::Error;

/// # Errors produced by a stream transport.
///
/// Every variant except [`StreamError::InvalidEndpoint`] and
/// [`StreamError::Exhausted`] describes one failed physical connection.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The connection could not be established or broke mid-stream.
    #[error("transport failed: {reason}")]
    Transport {
        /// The underlying error message.
        reason: String,
    },

    /// The server answered the handshake with a non-success status.
    #[error("unexpected http status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The server answered with something other than `text/event-stream`.
    #[error("unexpected content type {content_type:?}")]
    ContentType {
        /// The content type the server sent (empty when missing).
        content_type: String,
    },

    /// The server closed the stream without a completion record.
    #[error("stream ended by server")]
    Ended,

    /// The endpoint could not be turned into a request.
    #[error("invalid endpoint: {reason}")]
    InvalidEndpoint {
        /// Why the endpoint was rejected.
        reason: String,
    },

    /// The server sent more than `limit` bytes without completing a frame.
    #[error("frame exceeds {limit} bytes")]
    Overflow {
        /// Buffer limit in bytes.
        limit: usize,
    },

    /// The reconnection policy gave up.
    #[error("gave up after {attempts} reconnect attempts: {last}")]
    Exhausted {
        /// Reconnect attempts made before giving up (the first connection
        /// is not counted).
        attempts: u32,
        /// Message of the last transport failure.
        last: String,
    },
}

impl StreamError {
    /// Builds a [`StreamError::Transport`] from any displayable error.
    pub fn transport(reason: impl std::fmt::Display) -> Self {
        StreamError::Transport {
            reason: reason.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use streamvisor::StreamError;
    ///
    /// assert_eq!(StreamError::Ended.as_label(), "stream_ended");
    /// assert_eq!(StreamError::Status { status: 502 }.as_label(), "stream_status");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamError::Transport { .. } => "stream_transport",
            StreamError::Status { .. } => "stream_status",
            StreamError::ContentType { .. } => "stream_content_type",
            StreamError::Ended => "stream_ended",
            StreamError::InvalidEndpoint { .. } => "stream_invalid_endpoint",
            StreamError::Overflow { .. } => "stream_overflow",
            StreamError::Exhausted { .. } => "stream_exhausted",
        }
    }

    /// Indicates whether reconnecting can possibly help.
    ///
    /// Network failures, server-side closes, oversized frames, 5xx and the
    /// transient 4xx codes (`408`, `429`) are retryable. A `204 No Content` is the server asking
    /// the client to stop, so it is not.
    ///
    /// # Example
    /// ```
    /// use streamvisor::StreamError;
    ///
    /// assert!(StreamError::Status { status: 503 }.is_retryable());
    /// assert!(StreamError::Status { status: 429 }.is_retryable());
    /// assert!(!StreamError::Status { status: 404 }.is_retryable());
    /// assert!(!StreamError::Status { status: 204 }.is_retryable());
    /// assert!(StreamError::Overflow { limit: 1024 }.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Transport { .. } | StreamError::Ended | StreamError::Overflow { .. } => {
                true
            }
            StreamError::Status { status } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            StreamError::ContentType { .. }
            | StreamError::InvalidEndpoint { .. }
            | StreamError::Exhausted { .. } => false,
        }
    }
}

/// # Errors produced while decoding a single frame.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The `data` field was not valid UTF-8.
    #[error("frame data is not valid utf-8")]
    Encoding,

    /// The `data` field was not valid JSON.
    #[error("frame payload is not valid json: {reason}")]
    Payload {
        /// Parser message.
        reason: String,
    },
}

impl FrameError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            FrameError::Encoding => "frame_encoding",
            FrameError::Payload { .. } => "frame_payload",
        }
    }
}
