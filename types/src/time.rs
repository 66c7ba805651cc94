//! Timestamp type used throughout the service.
//!
//! Timestamps are Unix epoch seconds (UTC). Credential expiry is a lazy
//! wall-clock comparison evaluated at validation time; callers pass `now`
//! explicitly so tests can simulate the clock without timer machinery.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds in one day.
pub const SECS_PER_DAY: u64 = 86_400;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// This timestamp advanced by `secs`, saturating at `u64::MAX`.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Whether this timestamp (treated as a deadline) has passed.
    pub fn is_past(&self, now: Timestamp) -> bool {
        now.0 > self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_semantics() {
        let deadline = Timestamp::new(1000);
        assert!(!deadline.is_past(Timestamp::new(999)));
        assert!(!deadline.is_past(Timestamp::new(1000)));
        assert!(deadline.is_past(Timestamp::new(1001)));
    }

    #[test]
    fn plus_secs_saturates() {
        let t = Timestamp::new(u64::MAX - 5);
        assert_eq!(t.plus_secs(100).as_secs(), u64::MAX);
    }
}
