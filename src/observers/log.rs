//! # LogWriter: observer that writes to `tracing`
//!
//! Renders every callback as one `tracing` event under the `streamvisor`
//! target. Use it for demos and debugging; install a `tracing` subscriber to
//! see the output.
//!
//! ## Example output
//! ```text
//! INFO streamvisor: state state=connecting
//! INFO streamvisor: state state=open
//! INFO streamvisor: event kind="progress" cursor=Some("1")
//! WARN streamvisor: state state=reconnecting(attempt=1, delay=3s)
//! INFO streamvisor: completed kind="completed" cursor=Some("3")
//! ```

use crate::error::StreamError;
use crate::events::{ConnectionState, StreamEvent};
use crate::observers::Observer;

/// Event writer observer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Observer for LogWriter {
    fn on_event(&self, e: &StreamEvent) {
        tracing::info!(target: "streamvisor", kind = %e.kind, cursor = ?e.cursor, "event");
    }

    fn on_complete(&self, e: &StreamEvent) {
        tracing::info!(target: "streamvisor", kind = %e.kind, cursor = ?e.cursor, "completed");
    }

    fn on_error(&self, err: &StreamError) {
        tracing::error!(target: "streamvisor", label = err.as_label(), error = %err, "failed");
    }

    fn on_state(&self, state: &ConnectionState) {
        match state {
            ConnectionState::Reconnecting { .. } => {
                tracing::warn!(target: "streamvisor", state = %state, "state");
            }
            _ => {
                tracing::info!(target: "streamvisor", state = %state, "state");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
