//! In-memory transport for lifecycle tests.
//!
//! Each `connect` pops the next scripted outcome. A scripted connection is a
//! [`Feed`]: the test pushes raw bytes or an error through it, and dropping
//! it ends the stream (server EOF). With nothing scripted, `connect` hangs.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::channel::mpsc;
use parking_lot::Mutex;

use crate::error::StreamError;

use super::{ByteStream, ConnectRequest, Transport};

enum Outcome {
    Accept(mpsc::UnboundedReceiver<Result<Bytes, StreamError>>),
    Refuse(StreamError),
}

#[derive(Default)]
struct Script {
    outcomes: VecDeque<Outcome>,
    requests: Vec<ConnectRequest>,
}

/// Server side of one scripted connection.
pub(crate) struct Feed {
    tx: mpsc::UnboundedSender<Result<Bytes, StreamError>>,
}

impl Feed {
    /// Sends raw body bytes.
    pub(crate) fn raw(&self, body: &str) {
        let _ = self.tx.unbounded_send(Ok(Bytes::copy_from_slice(body.as_bytes())));
    }

    /// Sends one complete frame.
    pub(crate) fn frame(&self, kind: &str, data: &str) {
        self.raw(&format!("event: {kind}\ndata: {data}\n\n"));
    }

    /// Sends one complete frame with a cursor.
    pub(crate) fn frame_with_id(&self, id: &str, kind: &str, data: &str) {
        self.raw(&format!("id: {id}\nevent: {kind}\ndata: {data}\n\n"));
    }

    /// Returns `true` once the client dropped this connection.
    pub(crate) fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Breaks the connection with a transport error.
    pub(crate) fn fail(&self, reason: &str) {
        let _ = self.tx.unbounded_send(Err(StreamError::transport(reason)));
    }
}

#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Scripts the next attempt to succeed and returns its feed.
    pub(crate) fn accept(&self) -> Feed {
        let (tx, rx) = mpsc::unbounded();
        self.script.lock().outcomes.push_back(Outcome::Accept(rx));
        Feed { tx }
    }

    /// Scripts the next attempt to fail the handshake.
    pub(crate) fn refuse(&self, err: StreamError) {
        self.script.lock().outcomes.push_back(Outcome::Refuse(err));
    }

    /// Every request seen so far, in order.
    pub(crate) fn requests(&self) -> Vec<ConnectRequest> {
        self.script.lock().requests.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&self, request: &ConnectRequest) -> Result<ByteStream, StreamError> {
        let outcome = {
            let mut script = self.script.lock();
            script.requests.push(request.clone());
            script.outcomes.pop_front()
        };
        match outcome {
            Some(Outcome::Accept(rx)) => Ok(rx.boxed()),
            Some(Outcome::Refuse(err)) => Err(err),
            None => futures::future::pending().await,
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
