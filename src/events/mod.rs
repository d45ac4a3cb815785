//! Stream records and connection state.
//!
//! ## Contents
//! - [`StreamEvent`] one immutable record of the event log
//! - [`ConnectionState`], [`CloseReason`] the tagged lifecycle state

mod event;
mod state;

pub use event::StreamEvent;
pub use state::{CloseReason, ConnectionState};
