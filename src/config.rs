//! # Subscription configuration.
//!
//! [`SubscriptionConfig`] is passed once, when a stream is opened, and never
//! mutated afterwards. Changing the watched kinds or the reconnect behavior
//! means calling `subscribe` again with a new config.
//!
//! ## Sentinel values
//! - empty `completion_kinds` → [`DEFAULT_COMPLETION_KINDS`]
//! - empty `watched_kinds` → only `"message"` plus the completion kinds
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use streamvisor::{ReconnectPolicy, SubscriptionConfig};
//!
//! let cfg = SubscriptionConfig::parse("http://localhost:8000/stream/abc")?
//!     .with_watched_kinds(["progress", "tool_call"])
//!     .with_completion_kinds(["completed"])
//!     .with_reconnect(ReconnectPolicy::fixed(Duration::from_secs(1)));
//!
//! assert!(cfg.reconnect_enabled());
//! assert_eq!(cfg.reconnect_delay(), Duration::from_secs(1));
//! # Ok::<(), streamvisor::StreamError>(())
//! ```

use std::collections::BTreeSet;
use std::time::Duration;

use url::Url;

use crate::error::StreamError;
use crate::kinds::KindTable;
use crate::policies::ReconnectPolicy;

/// Completion kinds used when the caller names none.
pub const DEFAULT_COMPLETION_KINDS: [&str; 4] = ["completed", "error", "failed", "cancelled"];

/// Immutable settings of one subscription.
///
/// ## Field semantics
/// - `endpoint`: stream URL; it is also the log's target identity
/// - `watched_kinds`: kinds delivered to the log (`"message"` is implicit)
/// - `completion_kinds`: kinds that end the stream; always delivered too
/// - `reconnect`: what to do on transport errors
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Stream endpoint.
    pub endpoint: Url,
    /// Kinds delivered to the log besides `"message"`.
    pub watched_kinds: BTreeSet<String>,
    /// Kinds that mark the logical end of the stream.
    pub completion_kinds: BTreeSet<String>,
    /// Reconnection policy.
    pub reconnect: ReconnectPolicy,
}

impl SubscriptionConfig {
    /// Creates a config with default kinds and the default reconnect policy.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            watched_kinds: BTreeSet::new(),
            completion_kinds: BTreeSet::new(),
            reconnect: ReconnectPolicy::default(),
        }
    }

    /// Parses `endpoint` and creates a default config for it.
    pub fn parse(endpoint: &str) -> Result<Self, StreamError> {
        let url = Url::parse(endpoint).map_err(|e| StreamError::InvalidEndpoint {
            reason: format!("{endpoint}: {e}"),
        })?;
        Ok(Self::new(url))
    }

    /// Replaces the watched kinds.
    #[must_use]
    pub fn with_watched_kinds<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.watched_kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the completion kinds.
    #[must_use]
    pub fn with_completion_kinds<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.completion_kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the reconnection policy.
    #[must_use]
    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Shorthand for `with_reconnect(ReconnectPolicy::disabled())`.
    #[must_use]
    pub fn without_reconnect(self) -> Self {
        self.with_reconnect(ReconnectPolicy::disabled())
    }

    /// Completion kinds in effect, with the default set applied.
    pub fn effective_completion_kinds(&self) -> Vec<String> {
        if self.completion_kinds.is_empty() {
            DEFAULT_COMPLETION_KINDS.iter().map(|k| k.to_string()).collect()
        } else {
            self.completion_kinds.iter().cloned().collect()
        }
    }

    /// Builds the dispatch table for this subscription.
    pub fn kind_table(&self) -> KindTable {
        KindTable::new(
            self.watched_kinds.iter().cloned(),
            self.effective_completion_kinds(),
        )
    }

    /// Whether transport errors are retried.
    #[inline]
    pub fn reconnect_enabled(&self) -> bool {
        self.reconnect.enabled
    }

    /// Delay before the first reconnect attempt.
    #[inline]
    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect.backoff.delay(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::Disposition;

    #[test]
    fn test_defaults_apply_when_empty() {
        let cfg = SubscriptionConfig::parse("http://localhost/stream/abc").unwrap();
        let table = cfg.kind_table();
        assert_eq!(table.classify("completed"), Disposition::Terminal);
        assert_eq!(table.classify("error"), Disposition::Terminal);
        assert_eq!(table.classify("message"), Disposition::Deliver);
        assert_eq!(table.classify("progress"), Disposition::Ignore);
        assert_eq!(cfg.reconnect_delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_explicit_completion_kinds_replace_defaults() {
        let cfg = SubscriptionConfig::parse("http://localhost/s")
            .unwrap()
            .with_completion_kinds(["done"]);
        let table = cfg.kind_table();
        assert_eq!(table.classify("done"), Disposition::Terminal);
        assert_eq!(table.classify("completed"), Disposition::Ignore);
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = SubscriptionConfig::parse("not a url").unwrap_err();
        assert_eq!(err.as_label(), "stream_invalid_endpoint");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_without_reconnect() {
        let cfg = SubscriptionConfig::parse("http://localhost/s")
            .unwrap()
            .without_reconnect();
        assert!(!cfg.reconnect_enabled());
    }
}
