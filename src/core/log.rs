//! # Event log and delivery gate.
//!
//! [`Shared`] is the state one [`Subscription`](crate::Subscription) shares
//! with its actor task: the append-only [`EventLog`], the published
//! [`ConnectionState`], the observers and the cancellation token of the
//! running actor.
//!
//! ## Generations
//! Every `start` (subscribe / re-subscribe) and every `disconnect` bumps the
//! epoch. An actor only knows the epoch it was spawned with, and every
//! mutation it requests is checked against the current one under the
//! delivery gate, so a superseded actor can no longer touch the log.
//!
//! ## Locking
//! ```text
//! gate (ReentrantMutex)  held for a whole mutation + its observer callbacks
//!   └─ log (Mutex)       held only while the log itself is read or written
//! ```
//! `disconnect()` takes the same gate, which is why no callback runs after it
//! returns. The gate is reentrant so a callback may call `disconnect()`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, ReentrantMutex};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::SubscriptionConfig;
use crate::error::StreamError;
use crate::events::{CloseReason, ConnectionState, StreamEvent};
use crate::observers::Observer;
use crate::transport::Transport;

use super::actor::StreamActor;
use super::lifecycle::Lifecycle;

/// Ordered records of the current target.
#[derive(Default)]
pub(crate) struct EventLog {
    target: Option<Url>,
    events: Vec<Arc<StreamEvent>>,
    last_error: Option<StreamError>,
}

impl EventLog {
    /// Cursor of the newest record carrying one.
    pub(crate) fn last_cursor(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|e| e.cursor.as_deref())
    }

    /// Points the log at `endpoint`, dropping records of any other target.
    fn retarget(&mut self, endpoint: &Url) {
        if self.target.as_ref() != Some(endpoint) {
            self.events.clear();
            self.target = Some(endpoint.clone());
        }
        self.last_error = None;
    }
}

pub(crate) struct Shared {
    gate: ReentrantMutex<()>,
    epoch: AtomicU64,
    log: Mutex<EventLog>,
    active: Mutex<Option<CancellationToken>>,
    state: watch::Sender<ConnectionState>,
    observers: Vec<Arc<dyn Observer>>,
}

impl Shared {
    pub(crate) fn new(observers: Vec<Arc<dyn Observer>>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Idle);
        Self {
            gate: ReentrantMutex::new(()),
            epoch: AtomicU64::new(0),
            log: Mutex::new(EventLog::default()),
            active: Mutex::new(None),
            state,
            observers,
        }
    }

    /// Starts a new generation for `config` and spawns its actor.
    ///
    /// The previous actor (if any) is cancelled first. The log is cleared iff
    /// the endpoint differs from the current target; otherwise its newest
    /// cursor seeds the first connection.
    ///
    /// Must be called within a Tokio runtime.
    pub(crate) fn start(self: &Arc<Self>, config: &SubscriptionConfig, transport: Arc<dyn Transport>) {
        let _gate = self.gate.lock();
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(token) = self.active.lock().take() {
            token.cancel();
        }

        let cursor = {
            let mut log = self.log.lock();
            log.retarget(&config.endpoint);
            log.last_cursor().map(str::to_owned)
        };
        self.state.send_replace(ConnectionState::Idle);

        let token = CancellationToken::new();
        *self.active.lock() = Some(token.clone());

        tracing::debug!(
            endpoint = %config.endpoint,
            epoch,
            resume = ?cursor,
            transport = transport.name(),
            "subscription started"
        );
        let actor = StreamActor::new(
            Lifecycle::new(config, cursor),
            transport,
            Arc::clone(self),
            epoch,
        );
        tokio::spawn(actor.run(token));
    }

    /// Ends the current generation. Idempotent.
    pub(crate) fn disconnect(&self) {
        let _gate = self.gate.lock();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = self.active.lock().take() {
            token.cancel();
        }

        let closed = ConnectionState::Closed(CloseReason::Disconnected);
        let changed = self.state.send_if_modified(|state| {
            if *state == closed {
                false
            } else {
                *state = closed;
                true
            }
        });
        if changed {
            tracing::debug!("subscription disconnected");
            for obs in &self.observers {
                obs.on_state(&closed);
            }
        }
    }

    #[inline]
    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    /// Appends `event` and notifies observers.
    pub(crate) fn deliver(&self, epoch: u64, event: &Arc<StreamEvent>) -> bool {
        let _gate = self.gate.lock();
        if !self.is_current(epoch) {
            return false;
        }
        self.log.lock().events.push(Arc::clone(event));
        self.notify(epoch, |obs| obs.on_event(event))
    }

    /// Publishes `state` and notifies observers.
    pub(crate) fn transition(&self, epoch: u64, state: ConnectionState) -> bool {
        let _gate = self.gate.lock();
        if !self.is_current(epoch) {
            return false;
        }
        self.state.send_replace(state);
        self.notify(epoch, |obs| obs.on_state(&state))
    }

    /// Fires the completion callback for `event`.
    pub(crate) fn complete(&self, epoch: u64, event: &StreamEvent) -> bool {
        let _gate = self.gate.lock();
        if !self.is_current(epoch) {
            return false;
        }
        self.notify(epoch, |obs| obs.on_complete(event))
    }

    /// Records `err` as the terminal error and notifies observers.
    pub(crate) fn fail(&self, epoch: u64, err: &StreamError) -> bool {
        let _gate = self.gate.lock();
        if !self.is_current(epoch) {
            return false;
        }
        self.log.lock().last_error = Some(err.clone());
        self.notify(epoch, |obs| obs.on_error(err))
    }

    // Runs `f` for each observer while the generation stays current.
    fn notify(&self, epoch: u64, f: impl Fn(&dyn Observer)) -> bool {
        for obs in &self.observers {
            if !self.is_current(epoch) {
                return false;
            }
            f(obs.as_ref());
        }
        self.is_current(epoch)
    }

    pub(crate) fn events(&self) -> Vec<Arc<StreamEvent>> {
        self.log.lock().events.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.log.lock().events.len()
    }

    pub(crate) fn last_cursor(&self) -> Option<String> {
        self.log.lock().last_cursor().map(str::to_owned)
    }

    pub(crate) fn last_error(&self) -> Option<StreamError> {
        self.log.lock().last_error.clone()
    }

    pub(crate) fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub(crate) fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::Frame;

    fn event(id: Option<&str>) -> Arc<StreamEvent> {
        let mut frame = Frame::new("progress", "{}");
        frame.id = id.map(String::from);
        Arc::new(StreamEvent::decode(&frame).unwrap())
    }

    #[test]
    fn test_last_cursor_skips_records_without_id() {
        let mut log = EventLog::default();
        assert_eq!(log.last_cursor(), None);
        log.events.push(event(Some("1")));
        log.events.push(event(None));
        assert_eq!(log.last_cursor(), Some("1"));
        log.events.push(event(Some("2")));
        assert_eq!(log.last_cursor(), Some("2"));
    }

    #[test]
    fn test_retarget_clears_only_on_new_endpoint() {
        let a = Url::parse("http://localhost/stream/a").unwrap();
        let b = Url::parse("http://localhost/stream/b").unwrap();
        let mut log = EventLog::default();

        log.retarget(&a);
        log.events.push(event(Some("1")));
        log.last_error = Some(StreamError::Ended);

        log.retarget(&a);
        assert_eq!(log.events.len(), 1);
        assert_eq!(log.last_error, None);

        log.retarget(&b);
        assert!(log.events.is_empty());
    }

    #[test]
    fn test_stale_epoch_cannot_mutate() {
        let shared = Shared::new(Vec::new());
        let epoch = shared.epoch.load(Ordering::SeqCst);
        assert!(shared.deliver(epoch, &event(Some("1"))));

        shared.disconnect();
        assert!(!shared.deliver(epoch, &event(Some("2"))));
        assert!(!shared.transition(epoch, ConnectionState::Open));
        assert!(!shared.fail(epoch, &StreamError::Ended));

        assert_eq!(shared.len(), 1);
        assert_eq!(shared.last_error(), None);
        assert_eq!(
            shared.state(),
            ConnectionState::Closed(CloseReason::Disconnected)
        );
    }
}
