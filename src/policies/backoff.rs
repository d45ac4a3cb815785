//! # Reconnect delay schedule.
//!
//! [`Backoff`] maps the number of the upcoming retry to a delay. The default
//! is a **fixed** 3 second delay; an exponential schedule is available for
//! servers that prefer clients to back off harder.
//!
//! The base delay for retry `n` (0-indexed) is `first × factor^n`, clamped to
//! `max`, then [`Jitter`] is applied. The base never depends on a previous
//! jittered value.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use streamvisor::Backoff;
//!
//! let fixed = Backoff::default();
//! assert_eq!(fixed.delay(0), Duration::from_secs(3));
//! assert_eq!(fixed.delay(7), Duration::from_secs(3));
//!
//! let exp = Backoff::exponential(Duration::from_millis(500), Duration::from_secs(4), 2.0);
//! assert_eq!(exp.delay(0), Duration::from_millis(500));
//! assert_eq!(exp.delay(2), Duration::from_secs(2));
//! assert_eq!(exp.delay(9), Duration::from_secs(4));
//! ```

use std::time::Duration;

use super::jitter::Jitter;

/// Default reconnect delay.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Delay schedule between reconnect attempts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backoff {
    /// Delay before the first retry.
    pub first: Duration,
    /// Upper bound for any retry delay.
    pub max: Duration,
    /// Growth per retry (`1.0` = fixed).
    pub factor: f64,
    /// Randomization applied after clamping.
    pub jitter: Jitter,
}

impl Default for Backoff {
    /// Fixed [`DEFAULT_RECONNECT_DELAY`], no jitter.
    fn default() -> Self {
        Self::fixed(DEFAULT_RECONNECT_DELAY)
    }
}

impl Backoff {
    /// Same delay before every retry.
    pub const fn fixed(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: Jitter::None,
        }
    }

    /// Delay growing by `factor` per retry, capped at `max`.
    pub const fn exponential(first: Duration, max: Duration, factor: f64) -> Self {
        Self {
            first,
            max,
            factor,
            jitter: Jitter::None,
        }
    }

    /// Replaces the jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Computes the delay before retry number `retry` (0-indexed).
    pub fn delay(&self, retry: u32) -> Duration {
        let exp = retry.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);
        let base = if secs.is_finite() && secs >= 0.0 && secs <= self.max.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max
        };
        self.jitter.apply(base.min(self.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fixed_three_seconds() {
        let b = Backoff::default();
        for retry in [0, 1, 5, 100] {
            assert_eq!(b.delay(retry), Duration::from_secs(3));
        }
    }

    #[test]
    fn test_exponential_growth() {
        let b = Backoff::exponential(Duration::from_millis(100), Duration::from_secs(30), 2.0);
        assert_eq!(b.delay(0), Duration::from_millis(100));
        assert_eq!(b.delay(1), Duration::from_millis(200));
        assert_eq!(b.delay(3), Duration::from_millis(800));
    }

    #[test]
    fn test_first_above_max_is_clamped() {
        let b = Backoff::exponential(Duration::from_secs(10), Duration::from_secs(5), 2.0);
        assert_eq!(b.delay(0), Duration::from_secs(5));
    }

    #[test]
    fn test_overflow_clamps_to_max() {
        let b = Backoff::exponential(Duration::from_millis(100), Duration::from_secs(10), 2.0);
        assert_eq!(b.delay(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_jitter_stays_below_base() {
        let b = Backoff::fixed(Duration::from_secs(2)).with_jitter(Jitter::Full);
        for retry in 0..50 {
            assert!(b.delay(retry) <= Duration::from_secs(2));
        }
    }
}
