//! # Subscription observers.
//!
//! This module provides the [`Observer`] trait and, with the `logging`
//! feature, the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! StreamActor ── Action::Deliver / Complete / Fail / Transition
//!      │
//!      ▼   (delivery gate held, epoch checked)
//!  observers[0].on_event()  observers[1].on_event()  ...
//! ```
//!
//! Observers are called in registration order for every callback.

mod observer;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use observer::Observer;
