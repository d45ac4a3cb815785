//! # StreamClient: entry point for opening subscriptions.
//!
//! A [`StreamClient`] bundles a [`Transport`] and a list of observers. It is
//! cheap to clone; every [`Subscription`] it opens gets its own actor task and
//! its own event log, but shares the transport (and with it the HTTP
//! connection pool).
//!
//! ## Architecture
//! ```text
//! StreamClient::subscribe(config)
//!     └──► Subscription { Shared, transport, config }
//!             └──► Shared::start()
//!                     ├─► cancel previous actor (if any)
//!                     ├─► retarget log (clear iff endpoint changed)
//!                     └─► tokio::spawn(StreamActor::run(token))
//!                             └─► Lifecycle ── actions ──► Shared ──► observers
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use streamvisor::{
//!     Backoff, Jitter, ReconnectPolicy, StreamClient, SubscriptionConfig, TransportConfig,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = TransportConfig::default().with_header("authorization", "Bearer t0k3n")?;
//!     let client = StreamClient::builder()
//!         .with_transport_config(transport)
//!         .build()?;
//!
//!     let policy = ReconnectPolicy::default()
//!         .with_backoff(
//!             Backoff::exponential(Duration::from_millis(500), Duration::from_secs(30), 2.0)
//!                 .with_jitter(Jitter::Equal),
//!         )
//!         .with_max_attempts(10);
//!     let config = SubscriptionConfig::parse("https://api.example.com/stream/abc")?
//!         .with_watched_kinds(["progress", "log"])
//!         .with_reconnect(policy);
//!
//!     let sub = client.subscribe(config);
//!     println!("closed: {}", sub.closed().await);
//!     for event in sub.events() {
//!         println!("{} {:?} {}", event.kind, event.cursor, event.payload);
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use crate::config::SubscriptionConfig;
use crate::error::StreamError;
use crate::observers::Observer;
use crate::transport::Transport;

use super::builder::StreamClientBuilder;
use super::log::Shared;
use super::subscription::Subscription;

/// Opens [`Subscription`]s over a shared transport.
#[derive(Clone)]
pub struct StreamClient {
    transport: Arc<dyn Transport>,
    observers: Vec<Arc<dyn Observer>>,
}

impl StreamClient {
    /// Creates a client with the default HTTP transport and no observers.
    pub fn new() -> Result<Self, StreamError> {
        Self::builder().build()
    }

    /// Returns a builder for a customized client.
    pub fn builder() -> StreamClientBuilder {
        StreamClientBuilder::new()
    }

    pub(crate) fn new_internal(
        transport: Arc<dyn Transport>,
        observers: Vec<Arc<dyn Observer>>,
    ) -> Self {
        Self {
            transport,
            observers,
        }
    }

    /// Opens a subscription and starts connecting in the background.
    ///
    /// Must be called within a Tokio runtime.
    pub fn subscribe(&self, config: SubscriptionConfig) -> Subscription {
        let shared = Arc::new(Shared::new(self.observers.clone()));
        Subscription::open(shared, Arc::clone(&self.transport), config)
    }

    /// Name of the underlying transport.
    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }
}
