//! # Subscription handle.
//!
//! A [`Subscription`] is the caller's view of one stream: the event log, the
//! connection state and the last terminal error. It is created by
//! [`StreamClient::subscribe`](crate::StreamClient::subscribe) and can be
//! re-targeted with [`Subscription::subscribe`].
//!
//! ## Release
//! [`Subscription::disconnect`] (or dropping the handle) cancels the actor,
//! releases the transport and the reconnect timer, and publishes
//! `Closed(Disconnected)`. Once it returns, the log no longer changes and no
//! observer callback runs.
//!
//! ## Example
//! ```rust,no_run
//! use streamvisor::{StreamClient, SubscriptionConfig};
//!
//! # async fn demo() -> Result<(), streamvisor::StreamError> {
//! let client = StreamClient::new()?;
//! let config = SubscriptionConfig::parse("http://localhost:8080/stream/abc")?
//!     .with_watched_kinds(["progress"]);
//!
//! let sub = client.subscribe(config);
//! let state = sub.closed().await;
//! println!("{state}: {} events, last cursor {:?}", sub.len(), sub.last_cursor());
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Weak};

use tokio::sync::watch;

use crate::config::SubscriptionConfig;
use crate::error::StreamError;
use crate::events::{ConnectionState, StreamEvent};
use crate::transport::Transport;

use super::log::Shared;

/// Live subscription to one event stream.
pub struct Subscription {
    shared: Arc<Shared>,
    transport: Arc<dyn Transport>,
    config: SubscriptionConfig,
}

impl Subscription {
    pub(crate) fn open(
        shared: Arc<Shared>,
        transport: Arc<dyn Transport>,
        config: SubscriptionConfig,
    ) -> Self {
        shared.start(&config, Arc::clone(&transport));
        Self {
            shared,
            transport,
            config,
        }
    }

    /// Re-targets this handle.
    ///
    /// The previous connection is closed first. If `config` points at a
    /// different endpoint the log is cleared; otherwise the log is kept and
    /// the stream resumes after its newest cursor.
    pub fn subscribe(&mut self, config: SubscriptionConfig) {
        self.config = config;
        self.shared.start(&self.config, Arc::clone(&self.transport));
    }

    /// Stops the stream. Idempotent; valid in every state.
    pub fn disconnect(&self) {
        self.shared.disconnect();
    }

    /// Returns a handle that can disconnect this subscription from elsewhere
    /// (another task or an observer callback).
    pub fn disconnector(&self) -> Disconnector {
        Disconnector {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Configuration of the current target.
    pub fn config(&self) -> &SubscriptionConfig {
        &self.config
    }

    /// Snapshot of the log, in delivery order.
    pub fn events(&self) -> Vec<Arc<StreamEvent>> {
        self.shared.events()
    }

    /// Number of records in the log.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Returns `true` if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Newest cursor in the log.
    pub fn last_cursor(&self) -> Option<String> {
        self.shared.last_cursor()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Returns `true` while the stream is open.
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Terminal error of the current target, if it closed with one.
    pub fn error(&self) -> Option<StreamError> {
        self.shared.last_error()
    }

    /// Receiver of every state change.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.watch_state()
    }

    /// Waits until the stream reaches a `Closed` state and returns it.
    pub async fn closed(&self) -> ConnectionState {
        let mut rx = self.shared.watch_state();
        match rx.wait_for(ConnectionState::is_closed).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.shared.disconnect();
    }
}

/// Detached disconnect handle.
///
/// Holds no strong reference, so it may be stored inside an observer.
#[derive(Clone)]
pub struct Disconnector {
    shared: Weak<Shared>,
}

impl Disconnector {
    /// Disconnects the subscription if it still exists.
    pub fn disconnect(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.disconnect();
        }
    }
}
