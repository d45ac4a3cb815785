//! # StreamActor: drives one subscription generation.
//!
//! The actor owns the [`Lifecycle`] and executes the actions it emits. It is
//! the only place that awaits anything:
//!
//! ```text
//! loop {
//!   ├─► apply actions ──► Shared (log, state, observers; epoch-checked)
//!   ├─► superseded → release, break
//!   ├─► break if closed
//!   └─► select! {
//!         token.cancelled()      → release, break
//!         link.next()            → Connected / Chunk / Failed
//!         reconnect timer fires  → on_timer
//!       }
//! }
//! ```
//!
//! ## Rules
//! - At most one link (handshake or open stream) and one timer exist at any
//!   time; replacing either drops the previous one.
//! - Chunks are decoded and fed to the lifecycle in arrival order.
//! - When `Shared` reports the epoch as stale, or the token is cancelled, the
//!   actor runs `Lifecycle::disconnect` and executes only its resource
//!   actions (drop link, drop timer). `Shared::disconnect` owns the published
//!   `Closed(Disconnected)` state.

use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use tokio::time::{self, Sleep};
use tokio_util::sync::CancellationToken;

use crate::error::StreamError;
use crate::frames::FrameDecoder;
use crate::transport::{ByteStream, Transport};

use super::lifecycle::{Action, ConnectionId, Lifecycle, TimerId};
use super::log::Shared;

type Handshake = BoxFuture<'static, Result<ByteStream, StreamError>>;
type Timer = Option<(TimerId, Pin<Box<Sleep>>)>;

/// The physical side of the current connection.
enum Link {
    Idle,
    Connecting {
        conn: ConnectionId,
        fut: Handshake,
    },
    Open {
        conn: ConnectionId,
        stream: ByteStream,
        decoder: FrameDecoder,
    },
}

enum Step {
    Connected(ConnectionId, Result<ByteStream, StreamError>),
    Chunk(ConnectionId, Bytes),
    Failed(ConnectionId, StreamError),
    Timer(TimerId),
}

impl Link {
    async fn next(&mut self) -> Step {
        match self {
            Link::Idle => std::future::pending().await,
            Link::Connecting { conn, fut } => {
                let conn = *conn;
                Step::Connected(conn, fut.as_mut().await)
            }
            Link::Open { conn, stream, .. } => {
                let conn = *conn;
                match stream.next().await {
                    Some(Ok(chunk)) => Step::Chunk(conn, chunk),
                    Some(Err(err)) => Step::Failed(conn, err),
                    None => Step::Failed(conn, StreamError::Ended),
                }
            }
        }
    }
}

async fn fire(timer: &mut Timer) -> TimerId {
    match timer {
        Some((id, sleep)) => {
            sleep.as_mut().await;
            *id
        }
        None => std::future::pending().await,
    }
}

/// Executes lifecycle actions for one generation.
pub(crate) struct StreamActor {
    lifecycle: Lifecycle,
    transport: Arc<dyn Transport>,
    shared: Arc<Shared>,
    epoch: u64,
}

impl StreamActor {
    pub(crate) fn new(
        lifecycle: Lifecycle,
        transport: Arc<dyn Transport>,
        shared: Arc<Shared>,
        epoch: u64,
    ) -> Self {
        Self {
            lifecycle,
            transport,
            shared,
            epoch,
        }
    }

    /// Runs until the lifecycle closes, the generation is superseded or
    /// `token` is cancelled.
    pub(crate) async fn run(mut self, token: CancellationToken) {
        let mut link = Link::Idle;
        let mut timer: Timer = None;

        let mut actions = self.lifecycle.open();
        loop {
            if !self.apply(actions, &mut link, &mut timer) {
                tracing::trace!(epoch = self.epoch, "actor superseded");
                self.release(&mut link, &mut timer);
                break;
            }
            if self.lifecycle.state().is_closed() {
                break;
            }

            let step = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                step = link.next() => Some(step),
                id = fire(&mut timer) => Some(Step::Timer(id)),
            };
            let Some(step) = step else {
                tracing::trace!(epoch = self.epoch, "actor cancelled");
                self.release(&mut link, &mut timer);
                break;
            };

            actions = match step {
                Step::Connected(conn, Ok(stream)) => {
                    let decoder = FrameDecoder::resume(self.lifecycle.cursor().map(str::to_owned));
                    link = Link::Open {
                        conn,
                        stream,
                        decoder,
                    };
                    self.lifecycle.on_connected(conn)
                }
                Step::Connected(conn, Err(err)) => {
                    link = Link::Idle;
                    self.lifecycle.on_transport_error(conn, err)
                }
                Step::Chunk(conn, chunk) => {
                    let decoded = match &mut link {
                        Link::Open { decoder, .. } => decoder.push(&chunk),
                        _ => Vec::new(),
                    };
                    let mut out = Vec::new();
                    for item in decoded {
                        out.extend(self.lifecycle.on_decoded(conn, item));
                    }
                    out
                }
                Step::Failed(conn, err) => self.lifecycle.on_transport_error(conn, err),
                Step::Timer(id) => {
                    timer = None;
                    self.lifecycle.on_timer(id)
                }
            };
        }
    }

    /// Tears the lifecycle down and drops whatever connection and timer it
    /// still holds.
    fn release(&mut self, link: &mut Link, timer: &mut Timer) {
        for action in self.lifecycle.disconnect() {
            match action {
                Action::Close => *link = Link::Idle,
                Action::CancelTimer => *timer = None,
                // Shared owns the published state
                _ => {}
            }
        }
    }

    /// Executes `actions` in order. Returns `false` once the generation is
    /// stale.
    fn apply(&self, actions: Vec<Action>, link: &mut Link, timer: &mut Timer) -> bool {
        for action in actions {
            let current = match action {
                Action::Connect { conn, request } => {
                    let transport = Arc::clone(&self.transport);
                    let fut = async move { transport.connect(&request).await }.boxed();
                    *link = Link::Connecting { conn, fut };
                    true
                }
                Action::Close => {
                    *link = Link::Idle;
                    true
                }
                Action::Schedule { timer: id, delay } => {
                    *timer = Some((id, Box::pin(time::sleep(delay))));
                    true
                }
                Action::CancelTimer => {
                    *timer = None;
                    true
                }
                Action::Transition(state) => self.shared.transition(self.epoch, state),
                Action::Deliver(event) => self.shared.deliver(self.epoch, &event),
                Action::Complete(event) => self.shared.complete(self.epoch, &event),
                Action::Fail(err) => self.shared.fail(self.epoch, &err),
            };
            if !current {
                return false;
            }
        }
        true
    }
}
