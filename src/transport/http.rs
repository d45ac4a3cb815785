//! # HTTP transport backed by `reqwest`.
//!
//! Sends `GET` with `Accept: text/event-stream`, `Cache-Control: no-cache`,
//! the configured headers and, when resuming, `Last-Event-ID`.
//!
//! ## Handshake rules
//! - scheme must be `http` or `https` (else [`StreamError::InvalidEndpoint`])
//! - status must be 2xx and not `204` (else [`StreamError::Status`])
//! - content type must be `text/event-stream` (else [`StreamError::ContentType`])
//!
//! Only the handshake is bounded: `connect_timeout` limits the TCP/TLS
//! connect and `handshake_timeout` limits the wait for response headers. An
//! open stream may stay quiet for as long as the server likes.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tokio::time;

use crate::error::StreamError;

use super::{ByteStream, ConnectRequest, Transport};

const EVENT_STREAM: &str = "text/event-stream";
const LAST_EVENT_ID: &str = "last-event-id";

/// Settings of the HTTP transport.
///
/// ## Field semantics
/// - `connect_timeout`: TCP/TLS connect limit (`0s` = none)
/// - `handshake_timeout`: request sent until response headers (`0s` = none)
/// - `headers`: sent with every attempt (auth tokens, tenant ids, ...)
/// - `user_agent`: overrides reqwest's default when set
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Response headers timeout.
    pub handshake_timeout: Duration,
    /// Extra request headers.
    pub headers: HeaderMap,
    /// Custom user agent.
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    /// `connect_timeout = 10s`, `handshake_timeout = 10s`, no extra headers,
    /// default user agent.
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(10),
            headers: HeaderMap::new(),
            user_agent: None,
        }
    }
}

impl TransportConfig {
    /// Adds a request header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, StreamError> {
        let invalid = |what: &str| StreamError::InvalidEndpoint {
            reason: format!("invalid header {what}: {name}"),
        };
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid("name"))?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid("value"))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Returns the connect timeout as an `Option` (`None` = no timeout).
    #[inline]
    pub fn connect_timeout(&self) -> Option<Duration> {
        if self.connect_timeout == Duration::ZERO {
            None
        } else {
            Some(self.connect_timeout)
        }
    }

    /// Returns the handshake timeout as an `Option` (`None` = no timeout).
    #[inline]
    pub fn handshake_timeout(&self) -> Option<Duration> {
        if self.handshake_timeout == Duration::ZERO {
            None
        } else {
            Some(self.handshake_timeout)
        }
    }
}

/// `reqwest`-backed [`Transport`].
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    headers: HeaderMap,
    handshake_timeout: Option<Duration>,
}

impl HttpTransport {
    /// Builds a dedicated `reqwest::Client` from `cfg`.
    pub fn new(cfg: TransportConfig) -> Result<Self, StreamError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = cfg.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(agent) = &cfg.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder.build().map_err(StreamError::transport)?;
        Ok(Self {
            client,
            handshake_timeout: cfg.handshake_timeout(),
            headers: cfg.headers,
        })
    }

    /// Reuses an existing client (connection pool, proxies, TLS roots).
    ///
    /// The default handshake timeout still applies.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            headers: HeaderMap::new(),
            handshake_timeout: TransportConfig::default().handshake_timeout(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn connect(&self, request: &ConnectRequest) -> Result<ByteStream, StreamError> {
        match request.url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(StreamError::InvalidEndpoint {
                    reason: format!("unsupported scheme {other:?}"),
                });
            }
        }

        let mut builder = self
            .client
            .get(request.url.clone())
            .headers(self.headers.clone())
            .header(ACCEPT, EVENT_STREAM)
            .header(CACHE_CONTROL, "no-cache");
        if let Some(id) = &request.last_event_id {
            builder = builder.header(LAST_EVENT_ID, id.as_str());
        }

        let response = match self.handshake_timeout {
            Some(limit) => time::timeout(limit, builder.send())
                .await
                .map_err(|_| {
                    StreamError::transport(format!("no response headers within {limit:?}"))
                })?,
            None => builder.send().await,
        }
        .map_err(StreamError::transport)?;

        let status = response.status();
        if !status.is_success() || status == StatusCode::NO_CONTENT {
            return Err(StreamError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !content_type.starts_with(EVENT_STREAM) {
            return Err(StreamError::ContentType { content_type });
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(StreamError::transport))
            .boxed())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_header_rejects_garbage() {
        let err = TransportConfig::default()
            .with_header("bad header", "x")
            .unwrap_err();
        assert_eq!(err.as_label(), "stream_invalid_endpoint");
    }

    #[test]
    fn test_zero_timeouts_mean_none() {
        let cfg = TransportConfig {
            connect_timeout: Duration::ZERO,
            handshake_timeout: Duration::ZERO,
            ..TransportConfig::default()
        };
        assert_eq!(cfg.connect_timeout(), None);
        assert_eq!(cfg.handshake_timeout(), None);
        assert_eq!(
            TransportConfig::default().handshake_timeout(),
            Some(Duration::from_secs(10))
        );
    }

    #[tokio::test]
    async fn test_rejects_non_http_scheme() {
        let transport = HttpTransport::new(TransportConfig::default()).unwrap();
        let endpoint = url::Url::parse("ftp://example.com/stream").unwrap();
        let err = transport
            .connect(&ConnectRequest::new(&endpoint, None))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StreamError::InvalidEndpoint { .. }));
    }
}
