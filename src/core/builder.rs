use std::sync::Arc;

use crate::error::StreamError;
use crate::observers::Observer;
use crate::transport::{HttpTransport, Transport, TransportConfig};

use super::client::StreamClient;

/// Builder for constructing a [`StreamClient`].
#[derive(Default)]
pub struct StreamClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    transport_config: TransportConfig,
    observers: Vec<Arc<dyn Observer>>,
}

impl StreamClientBuilder {
    /// Creates a builder with the default HTTP transport and no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `transport` instead of the built-in HTTP transport.
    ///
    /// Any [`TransportConfig`] set on the builder is then ignored.
    pub fn with_transport<T: Transport>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Configures the built-in HTTP transport.
    pub fn with_transport_config(mut self, cfg: TransportConfig) -> Self {
        self.transport_config = cfg;
        self
    }

    /// Adds one observer. Observers are called in the order they are added.
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Replaces all observers.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observer>>) -> Self {
        self.observers = observers;
        self
    }

    /// Builds the client.
    ///
    /// Fails only when the HTTP transport cannot be created (for example a
    /// TLS backend initialization error).
    pub fn build(self) -> Result<StreamClient, StreamError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.transport_config)?),
        };
        Ok(StreamClient::new_internal(transport, self.observers))
    }
}
