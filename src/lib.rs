//! # streamvisor
//!
//! **Streamvisor** is a resumable Server-Sent Events client for Rust.
//!
//! It opens a long-lived `text/event-stream` connection, decodes frames,
//! keeps the records of watched kinds in an append-only log, closes once a
//! completion record arrives, and reconnects after transport failures,
//! resuming after the last cursor it saw.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   StreamClient ──subscribe(config)──► Subscription (handle)
//!                                          │
//!                                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Shared                                                           │
//! │  - EventLog (append-only records of the current target)           │
//! │  - watch<ConnectionState>                                         │
//! │  - delivery gate + epoch (no mutation after disconnect)           │
//! │  - observers                                                      │
//! └──────────────────────────────▲────────────────────────────────────┘
//!                                │ Deliver / Transition / Complete / Fail
//! ┌──────────────────────────────┴────────────────────────────────────┐
//! │  StreamActor (one tokio task per generation)                      │
//! │   ├─ Transport::connect ──► ByteStream                            │
//! │   ├─ FrameDecoder (bytes ──► frames)                              │
//! │   ├─ Lifecycle (state machine, kind table, reconnect policy)      │
//! │   └─ reconnect timer                                              │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Idle ──► Connecting ──► Open ──┬─ watched record ──► Open (append)
//!             ▲                  ├─ completion kind ─► Closed(Completed)
//!             │                  └─ transport error ─┐
//!             │                                      ▼
//!             └──── timer (resume with cursor) ── Reconnecting
//!                                                    │ policy gives up
//!                                                    ▼
//!                                              Closed(Error)
//!
//! disconnect() from any state ──► Closed(Disconnected)
//! ```
//!
//! ## Features
//! | Area              | Description                                          | Key types / traits                              |
//! |-------------------|------------------------------------------------------|-------------------------------------------------|
//! | **Client**        | Open and re-target subscriptions.                    | [`StreamClient`], [`Subscription`]              |
//! | **Configuration** | Endpoint, watched and completion kinds, reconnect.   | [`SubscriptionConfig`], [`TransportConfig`]     |
//! | **Policies**      | Fixed or exponential reconnect delays with jitter.   | [`ReconnectPolicy`], [`Backoff`], [`Jitter`]    |
//! | **Observers**     | Synchronous callbacks for records and state changes. | [`Observer`]                                    |
//! | **Transport**     | Pluggable connection seam; HTTP via `reqwest`.       | [`Transport`], [`HttpTransport`]                |
//! | **Frames**        | Incremental event-stream decoder.                    | [`FrameDecoder`], [`Frame`]                     |
//! | **Errors**        | Typed transport and frame errors.                    | [`StreamError`], [`FrameError`]                 |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] observer _(demo/reference only)_.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use streamvisor::{StreamClient, SubscriptionConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Observers (optional)
//!     #[cfg(feature = "logging")]
//!     let observers: Vec<Arc<dyn streamvisor::Observer>> = {
//!         use streamvisor::LogWriter;
//!         vec![Arc::new(LogWriter::default())]
//!     };
//!     #[cfg(not(feature = "logging"))]
//!     let observers: Vec<Arc<dyn streamvisor::Observer>> = Vec::new();
//!
//!     let client = StreamClient::builder().with_observers(observers).build()?;
//!
//!     // Deliver `progress` records; stop on `completed` (or any default completion kind)
//!     let config = SubscriptionConfig::parse("http://localhost:8080/stream/abc")?
//!         .with_watched_kinds(["progress"]);
//!
//!     let sub = client.subscribe(config);
//!     let state = sub.closed().await;
//!     println!("{state} after {} records", sub.len());
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod frames;
mod kinds;
mod observers;
mod policies;
mod transport;

// ---- Public re-exports ----

pub use config::{DEFAULT_COMPLETION_KINDS, SubscriptionConfig};
pub use core::{Disconnector, StreamClient, StreamClientBuilder, Subscription};
pub use error::{FrameError, StreamError};
pub use events::{CloseReason, ConnectionState, StreamEvent};
pub use frames::{DEFAULT_KIND, DEFAULT_MAX_BUFFER, Decoded, Frame, FrameDecoder};
pub use kinds::{Disposition, KindTable};
pub use observers::Observer;
pub use policies::{Backoff, DEFAULT_RECONNECT_DELAY, Jitter, ReconnectPolicy};
pub use transport::{
    ByteStream, ConnectRequest, HttpTransport, RESUME_PARAM, Transport, TransportConfig,
};

// Optional: expose a simple built-in logger observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;
