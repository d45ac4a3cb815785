//! # Transport abstraction.
//!
//! A [`Transport`] opens one physical stream for a [`ConnectRequest`] and
//! hands back its body as a [`ByteStream`]. The lifecycle never touches
//! sockets directly; it drives whatever transport the client was built with.
//!
//! - [`HttpTransport`]: `reqwest`-backed HTTP(S) implementation
//!
//! ## Resume parameter
//! When a cursor is known, [`ConnectRequest::new`] appends it as the
//! `last_event_id` query parameter (replacing any existing value). The HTTP
//! transport also sends it as the `Last-Event-ID` header.
//!
//! ```rust
//! use streamvisor::ConnectRequest;
//! use url::Url;
//!
//! let endpoint = Url::parse("http://localhost/stream/abc?verbose=1").unwrap();
//! let req = ConnectRequest::new(&endpoint, Some("42"));
//! assert_eq!(req.url.as_str(), "http://localhost/stream/abc?verbose=1&last_event_id=42");
//! ```

mod http;
#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use url::Url;

use crate::error::StreamError;

pub use http::{HttpTransport, TransportConfig};

/// Query parameter carrying the resume cursor.
pub const RESUME_PARAM: &str = "last_event_id";

/// Body of an open stream.
pub type ByteStream = BoxStream<'static, Result<Bytes, StreamError>>;

/// One connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    /// Final URL, resume parameter included.
    pub url: Url,
    /// Cursor the server should resume after.
    pub last_event_id: Option<String>,
}

impl ConnectRequest {
    /// Builds the request for `endpoint`, resuming after `cursor` if given.
    pub fn new(endpoint: &Url, cursor: Option<&str>) -> Self {
        let Some(cursor) = cursor else {
            return Self {
                url: endpoint.clone(),
                last_event_id: None,
            };
        };

        let kept: Vec<(String, String)> = endpoint
            .query_pairs()
            .filter(|(k, _)| k != RESUME_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(RESUME_PARAM, cursor);

        Self {
            url,
            last_event_id: Some(cursor.to_string()),
        }
    }
}

/// # Opens physical streams.
///
/// Implementations must be cheap to call repeatedly: every reconnect is a new
/// `connect` call. Dropping the returned stream must release the connection.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use futures::StreamExt;
/// use streamvisor::{ByteStream, ConnectRequest, StreamError, Transport};
///
/// struct Canned;
///
/// #[async_trait]
/// impl Transport for Canned {
///     async fn connect(&self, _req: &ConnectRequest) -> Result<ByteStream, StreamError> {
///         let body = bytes::Bytes::from_static(b"event: completed\ndata: {}\n\n");
///         Ok(futures::stream::iter([Ok(body)]).boxed())
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Performs the handshake and returns the body stream.
    ///
    /// Returning `Err` counts as a failed attempt; the reconnection policy
    /// decides what happens next.
    async fn connect(&self, request: &ConnectRequest) -> Result<ByteStream, StreamError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
