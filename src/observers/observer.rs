//! # Observer trait
//!
//! `Observer` is the extension point for reacting to a subscription:
//! delivered records, the one-time completion, the one-time terminal error and
//! state changes.
//!
//! ## Contract
//! - Callbacks run **synchronously** on the subscription's actor task, in log
//!   order. Keep them short; hand heavy work to a channel.
//! - No callback fires after `Subscription::disconnect()` returns.
//! - A callback may call `disconnect()` on the subscription it observes.
//! - `on_complete` and `on_error` fire at most once per connection target,
//!   and never both.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use streamvisor::{Observer, StreamEvent};
//!
//! #[derive(Default)]
//! struct Counter(AtomicUsize);
//!
//! impl Observer for Counter {
//!     fn on_event(&self, _event: &StreamEvent) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//!     fn name(&self) -> &'static str { "counter" }
//! }
//! ```

use crate::error::StreamError;
use crate::events::{ConnectionState, StreamEvent};

/// Contract for subscription observers.
///
/// Every method has an empty default; implement only what you need.
pub trait Observer: Send + Sync + 'static {
    /// A record was appended to the log.
    fn on_event(&self, event: &StreamEvent) {
        let _ = event;
    }

    /// A completion record arrived; `event` is that record (already appended).
    fn on_complete(&self, event: &StreamEvent) {
        let _ = event;
    }

    /// The stream closed with an error that will not be retried.
    fn on_error(&self, error: &StreamError) {
        let _ = error;
    }

    /// The connection state changed.
    fn on_state(&self, state: &ConnectionState) {
        let _ = state;
    }

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
