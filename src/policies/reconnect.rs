//! # Reconnection policy.
//!
//! [`ReconnectPolicy`] decides **whether** a failed stream is re-opened and
//! **how long** to wait first. It holds no history: the lifecycle passes in
//! the attempt count and the latest server hint on every call.
//!
//! ## Choosing a policy
//! ```text
//! ReconnectPolicy::default()          → retry forever, fixed 3s delay
//! ReconnectPolicy::disabled()         → first transport error closes the stream
//! ReconnectPolicy::fixed(d)
//!     .with_max_attempts(5)           → give up after 5 consecutive failures
//! ```
//!
//! Attempts are unbounded by default; a cap must be asked for explicitly.

use std::time::Duration;

use super::backoff::Backoff;

/// Whether and when to re-open a failed stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReconnectPolicy {
    /// Reconnect at all.
    pub enabled: bool,
    /// Delay schedule.
    pub backoff: Backoff,
    /// Maximum consecutive failed attempts (`None` = unbounded).
    pub max_attempts: Option<u32>,
    /// Let a server `retry:` field override the computed delay.
    pub honor_retry_hint: bool,
}

impl Default for ReconnectPolicy {
    /// Enabled, fixed 3 second delay, unbounded, server hints ignored.
    fn default() -> Self {
        Self {
            enabled: true,
            backoff: Backoff::default(),
            max_attempts: None,
            honor_retry_hint: false,
        }
    }
}

impl ReconnectPolicy {
    /// Never reconnect.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Reconnect forever after a fixed delay.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            backoff: Backoff::fixed(delay),
            ..Self::default()
        }
    }

    /// Replaces the delay schedule.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Caps consecutive failed attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = Some(max);
        self
    }

    /// Honors (or ignores) server `retry:` hints.
    #[must_use]
    pub fn with_retry_hint(mut self, honor: bool) -> Self {
        self.honor_retry_hint = honor;
        self
    }

    /// Returns the delay before reconnect attempt `attempt` (1-based count of
    /// consecutive failures), or `None` when the policy gives up.
    ///
    /// # Example
    /// ```rust
    /// use std::time::Duration;
    /// use streamvisor::ReconnectPolicy;
    ///
    /// let policy = ReconnectPolicy::fixed(Duration::from_secs(1)).with_max_attempts(2);
    /// assert_eq!(policy.next_delay(1, None), Some(Duration::from_secs(1)));
    /// assert_eq!(policy.next_delay(2, None), Some(Duration::from_secs(1)));
    /// assert_eq!(policy.next_delay(3, None), None);
    ///
    /// assert_eq!(ReconnectPolicy::disabled().next_delay(1, None), None);
    /// ```
    pub fn next_delay(&self, attempt: u32, hint: Option<Duration>) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        if self.max_attempts.is_some_and(|max| attempt > max) {
            return None;
        }
        match hint {
            Some(hint) if self.honor_retry_hint => Some(hint),
            _ => Some(self.backoff.delay(attempt.saturating_sub(1))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retries_forever() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.next_delay(1, None), Some(Duration::from_secs(3)));
        assert_eq!(policy.next_delay(10_000, None), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_hint_ignored_unless_honored() {
        let hint = Some(Duration::from_millis(250));
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.next_delay(1, hint), Some(Duration::from_secs(3)));
        assert_eq!(
            policy.with_retry_hint(true).next_delay(1, hint),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_exponential_uses_zero_based_retry() {
        let policy = ReconnectPolicy::default().with_backoff(Backoff::exponential(
            Duration::from_millis(100),
            Duration::from_secs(1),
            2.0,
        ));
        assert_eq!(policy.next_delay(1, None), Some(Duration::from_millis(100)));
        assert_eq!(policy.next_delay(2, None), Some(Duration::from_millis(200)));
    }
}
