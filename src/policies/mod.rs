//! Reconnection policies.
//!
//! This module groups the knobs that control **if** a failed stream is
//! re-opened and **how long** to wait between attempts.
//!
//! ## Contents
//! - [`ReconnectPolicy`] enabled flag, attempt cap, server hint handling
//! - [`Backoff`] delay schedule (fixed by default, optionally exponential)
//! - [`Jitter`] randomization to avoid synchronized reconnects
//!
//! ## Quick wiring
//! ```text
//! SubscriptionConfig { reconnect: ReconnectPolicy, .. }
//!      └─► core::lifecycle::Lifecycle uses:
//!           - reconnect.next_delay(attempt, hint) on every transport error
//!           - None → Closed(Error), Some(d) → Reconnecting + one timer
//! ```
//!
//! ## Defaults
//! - enabled, `Backoff::fixed(3s)`, unbounded attempts, `retry:` hints ignored.

mod backoff;
mod jitter;
mod reconnect;

pub use backoff::{Backoff, DEFAULT_RECONNECT_DELAY};
pub use jitter::Jitter;
pub use reconnect::ReconnectPolicy;
