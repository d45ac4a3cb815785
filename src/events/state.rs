//! # Connection state of a subscription.
//!
//! A single tagged enum replaces independent `connected` / `error` /
//! `reconnecting` flags, so states like "open and reconnecting" cannot exist.
//!
//! ```text
//!  Idle ──► Connecting ──► Open ──► Closed(Completed)
//!              ▲  │          │
//!              │  └──────────┴──► Reconnecting ──┐
//!              └─────────────────────────────────┘
//!  Connecting / Open ──► Closed(Error)
//!  any ──► Closed(Disconnected)
//! ```

use std::fmt;
use std::time::Duration;

/// Why a subscription stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// A completion record arrived.
    Completed,
    /// A transport failure was not (or no longer) retried.
    Error,
    /// The caller disconnected.
    Disconnected,
}

impl CloseReason {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            CloseReason::Completed => "completed",
            CloseReason::Error => "error",
            CloseReason::Disconnected => "disconnected",
        }
    }
}

/// Lifecycle state of the physical connection behind a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Nothing opened yet.
    #[default]
    Idle,
    /// Handshake in flight.
    Connecting,
    /// Receiving frames.
    Open,
    /// Waiting for the reconnect timer.
    Reconnecting {
        /// Consecutive failed attempts so far (1-based).
        attempt: u32,
        /// Delay until the next attempt.
        delay: Duration,
    },
    /// Terminal.
    Closed(CloseReason),
}

impl ConnectionState {
    /// True only while frames are flowing.
    #[inline]
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// True once the state can no longer change on its own.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, ConnectionState::Closed(_))
    }

    /// Returns the close reason for terminal states.
    #[inline]
    pub fn close_reason(&self) -> Option<CloseReason> {
        match self {
            ConnectionState::Closed(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Idle => f.write_str("idle"),
            ConnectionState::Connecting => f.write_str("connecting"),
            ConnectionState::Open => f.write_str("open"),
            ConnectionState::Reconnecting { attempt, delay } => {
                write!(f, "reconnecting(attempt={attempt}, delay={delay:?})")
            }
            ConnectionState::Closed(reason) => write!(f, "closed({})", reason.as_label()),
        }
    }
}
