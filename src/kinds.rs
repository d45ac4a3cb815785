//! # Completion detector: kind → disposition dispatch table.
//!
//! [`KindTable`] decides, per record kind, whether a record is dropped,
//! delivered, or delivered **and** ends the stream. The decision is one map
//! lookup; there is no per-kind listener registration.
//!
//! ## Rules
//! - [`DEFAULT_KIND`] (`"message"`) is always watched.
//! - Completion kinds are unioned into the watched set, so a terminal record
//!   is always appended before the stream closes.
//! - Everything else is [`Disposition::Ignore`]: parsed, never delivered.
//!
//! ## Example
//! ```rust
//! use streamvisor::{Disposition, KindTable};
//!
//! let table = KindTable::new(["progress"], ["completed"]);
//! assert_eq!(table.classify("progress"), Disposition::Deliver);
//! assert_eq!(table.classify("message"), Disposition::Deliver);
//! assert_eq!(table.classify("completed"), Disposition::Terminal);
//! assert_eq!(table.classify("heartbeat"), Disposition::Ignore);
//! ```

use std::collections::HashMap;

use crate::frames::DEFAULT_KIND;

/// What to do with a record of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Unwatched: drop silently.
    Ignore,
    /// Append to the log and forward to observers.
    Deliver,
    /// Append, forward, then close the stream as completed.
    Terminal,
}

impl Disposition {
    /// True for dispositions that reach the event log.
    #[inline]
    pub fn is_delivered(&self) -> bool {
        !matches!(self, Disposition::Ignore)
    }
}

/// Dispatch table built once per subscription.
#[derive(Debug, Clone)]
pub struct KindTable {
    table: HashMap<String, Disposition>,
}

impl KindTable {
    /// Builds the table from watched and completion kinds.
    pub fn new<W, C>(watched: W, completion: C) -> Self
    where
        W: IntoIterator,
        W::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let mut table = HashMap::new();
        table.insert(DEFAULT_KIND.to_string(), Disposition::Deliver);
        for kind in watched {
            table.insert(kind.into(), Disposition::Deliver);
        }
        for kind in completion {
            table.insert(kind.into(), Disposition::Terminal);
        }
        Self { table }
    }

    /// Looks up the disposition of `kind`.
    #[inline]
    pub fn classify(&self, kind: &str) -> Disposition {
        self.table.get(kind).copied().unwrap_or(Disposition::Ignore)
    }
}
