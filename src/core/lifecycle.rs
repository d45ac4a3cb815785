//! # Lifecycle: the connection state machine.
//!
//! [`Lifecycle`] owns every decision about one subscription target and
//! performs no I/O. Inputs are handshake results, decoded frames, transport
//! errors, timer expiries and `disconnect`; outputs are [`Action`]s that the
//! [`StreamActor`](super::actor::StreamActor) executes in order.
//!
//! ## Transitions
//! ```text
//! open()                 Idle ─────────────► Connecting      [Connect]
//! on_connected()         Connecting ───────► Open
//! on_decoded(watched)    Open ─────────────► Open            [Deliver]
//! on_decoded(terminal)   Open ─────────────► Closed(Completed)
//!                                            [Deliver, Close, Complete]
//! on_transport_error()   Connecting/Open ──► Reconnecting    [Close, Schedule]
//!                                        └─► Closed(Error)   [Close, Fail]
//! on_timer()             Reconnecting ─────► Connecting      [Connect + cursor]
//! disconnect()           any ──────────────► Closed(Disconnected)
//! ```
//!
//! ## Rules
//! - Input tagged with a superseded [`ConnectionId`] or [`TimerId`] is ignored.
//! - At most one connection and one reconnect timer exist at any time; a new
//!   schedule cancels the pending timer first.
//! - After a terminal transition every input except `disconnect` is ignored,
//!   so the completion action is emitted exactly once.
//! - The attempt counter counts consecutive failures and resets once a
//!   handshake succeeds.
//! - The resume cursor only advances on delivered records.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::SubscriptionConfig;
use crate::error::StreamError;
use crate::events::{CloseReason, ConnectionState, StreamEvent};
use crate::frames::{Decoded, Frame};
use crate::kinds::{Disposition, KindTable};
use crate::policies::ReconnectPolicy;
use crate::transport::ConnectRequest;

/// Identity of one physical connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

/// Identity of one scheduled reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Side effect requested by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Open a new physical connection (replacing any current one).
    Connect {
        /// Id to tag the handshake result and all stream input with.
        conn: ConnectionId,
        /// What to connect to.
        request: ConnectRequest,
    },
    /// Drop the current physical connection.
    Close,
    /// Arm the reconnect timer (replacing any pending one).
    Schedule {
        /// Id to report back through `on_timer`.
        timer: TimerId,
        /// Delay before firing.
        delay: Duration,
    },
    /// Disarm the reconnect timer.
    CancelTimer,
    /// Publish a new connection state.
    Transition(ConnectionState),
    /// Append a record to the log and notify observers.
    Deliver(Arc<StreamEvent>),
    /// Fire the completion callback.
    Complete(Arc<StreamEvent>),
    /// Record and surface a terminal error.
    Fail(StreamError),
}

/// Connection state machine for one subscription target.
pub struct Lifecycle {
    endpoint: Url,
    table: KindTable,
    policy: ReconnectPolicy,

    state: ConnectionState,
    cursor: Option<String>,
    attempt: u32,
    retry_hint: Option<Duration>,

    conn: Option<ConnectionId>,
    timer: Option<TimerId>,
    next_id: u64,
}

impl Lifecycle {
    /// Creates an idle machine; `cursor` seeds the resume token.
    pub fn new(config: &SubscriptionConfig, cursor: Option<String>) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            table: config.kind_table(),
            policy: config.reconnect,
            state: ConnectionState::Idle,
            cursor,
            attempt: 0,
            retry_hint: None,
            conn: None,
            timer: None,
            next_id: 0,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Latest cursor of a delivered record.
    #[inline]
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Consecutive failed attempts.
    #[cfg(test)]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Pending reconnect timer, if any.
    #[cfg(test)]
    pub fn pending_timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Starts the first connection. Only valid from `Idle`.
    pub fn open(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.state == ConnectionState::Idle {
            self.connect(&mut actions);
        }
        actions
    }

    /// The handshake of `conn` succeeded.
    pub fn on_connected(&mut self, conn: ConnectionId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.conn != Some(conn) || self.state != ConnectionState::Connecting {
            return actions;
        }
        self.attempt = 0;
        self.transition(ConnectionState::Open, &mut actions);
        actions
    }

    /// The decoder produced `decoded` on connection `conn`.
    pub fn on_decoded(&mut self, conn: ConnectionId, decoded: Decoded) -> Vec<Action> {
        if self.conn != Some(conn) || self.state != ConnectionState::Open {
            return Vec::new();
        }
        match decoded {
            Decoded::Frame(frame) => self.on_frame(frame),
            Decoded::Retry(delay) => {
                tracing::debug!(?delay, "server retry hint");
                self.retry_hint = Some(delay);
                Vec::new()
            }
            Decoded::Malformed(err) => {
                tracing::warn!(label = err.as_label(), error = %err, "dropping malformed frame");
                Vec::new()
            }
            Decoded::Overflow(limit) => {
                self.on_transport_error(conn, StreamError::Overflow { limit })
            }
        }
    }

    fn on_frame(&mut self, frame: Frame) -> Vec<Action> {
        let disposition = self.table.classify(frame.kind());
        if !disposition.is_delivered() {
            tracing::trace!(kind = frame.kind(), "ignoring unwatched frame");
            return Vec::new();
        }

        let event = match StreamEvent::decode(&frame) {
            Ok(event) => Arc::new(event),
            Err(err) => {
                tracing::warn!(
                    kind = frame.kind(),
                    label = err.as_label(),
                    error = %err,
                    "dropping malformed frame"
                );
                return Vec::new();
            }
        };
        if let Some(cursor) = &event.cursor {
            self.cursor = Some(cursor.clone());
        }

        let mut actions = vec![Action::Deliver(Arc::clone(&event))];
        if disposition == Disposition::Terminal {
            self.conn = None;
            actions.push(Action::Close);
            self.transition(ConnectionState::Closed(CloseReason::Completed), &mut actions);
            actions.push(Action::Complete(event));
        }
        actions
    }

    /// Connection `conn` failed (handshake error, read error or EOF).
    pub fn on_transport_error(&mut self, conn: ConnectionId, err: StreamError) -> Vec<Action> {
        let mut actions = Vec::new();
        let live = matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Open
        );
        if self.conn != Some(conn) || !live {
            return actions;
        }

        self.conn = None;
        actions.push(Action::Close);
        self.attempt = self.attempt.saturating_add(1);

        let delay = if err.is_retryable() {
            self.policy.next_delay(self.attempt, self.retry_hint)
        } else {
            None
        };

        match delay {
            Some(delay) => {
                tracing::warn!(
                    attempt = self.attempt,
                    ?delay,
                    label = err.as_label(),
                    error = %err,
                    "stream failed, reconnect scheduled"
                );
                if self.timer.take().is_some() {
                    actions.push(Action::CancelTimer);
                }
                let timer = TimerId(self.bump());
                self.timer = Some(timer);
                self.transition(
                    ConnectionState::Reconnecting {
                        attempt: self.attempt,
                        delay,
                    },
                    &mut actions,
                );
                actions.push(Action::Schedule { timer, delay });
            }
            None => {
                let err = if self.policy.enabled && err.is_retryable() {
                    StreamError::Exhausted {
                        attempts: self.attempt - 1,
                        last: err.to_string(),
                    }
                } else {
                    err
                };
                tracing::error!(label = err.as_label(), error = %err, "stream failed");
                self.transition(ConnectionState::Closed(CloseReason::Error), &mut actions);
                actions.push(Action::Fail(err));
            }
        }
        actions
    }

    /// Reconnect timer `timer` elapsed.
    pub fn on_timer(&mut self, timer: TimerId) -> Vec<Action> {
        let mut actions = Vec::new();
        let waiting = matches!(self.state, ConnectionState::Reconnecting { .. });
        if self.timer != Some(timer) || !waiting {
            return actions;
        }
        self.timer = None;
        self.connect(&mut actions);
        actions
    }

    /// Caller-initiated teardown. Valid from any state.
    pub fn disconnect(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        let target = ConnectionState::Closed(CloseReason::Disconnected);
        if self.state == target {
            return actions;
        }
        if self.timer.take().is_some() {
            actions.push(Action::CancelTimer);
        }
        if self.conn.take().is_some() {
            actions.push(Action::Close);
        }
        self.transition(target, &mut actions);
        actions
    }

    fn connect(&mut self, actions: &mut Vec<Action>) {
        let conn = ConnectionId(self.bump());
        self.conn = Some(conn);
        let request = ConnectRequest::new(&self.endpoint, self.cursor.as_deref());
        self.transition(ConnectionState::Connecting, actions);
        tracing::debug!(url = %request.url, attempt = self.attempt, "connecting");
        actions.push(Action::Connect { conn, request });
    }

    fn transition(&mut self, next: ConnectionState, actions: &mut Vec<Action>) {
        if self.state != next {
            tracing::debug!(from = %self.state, to = %next, "state");
            self.state = next;
            actions.push(Action::Transition(next));
        }
    }

    fn bump(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}
