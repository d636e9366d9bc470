//! Domain types for the hubscale lease store.

use serde::{Deserialize, Serialize};

/// A single-flight lease: whoever holds it may run the watch loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaseRecord {
    /// Fixed lease name (one per watch loop system-wide).
    pub name: String,
    /// Identity of the holding process.
    pub holder: String,
    /// Unix timestamp (seconds) when the lease was first acquired.
    pub acquired_at: u64,
    /// Unix timestamp (seconds) of the last renewal.
    pub renewed_at: u64,
}

impl LeaseRecord {
    /// Whether the lease has gone unrenewed for longer than `ttl_secs`.
    pub fn is_stale(&self, ttl_secs: u64, now: u64) -> bool {
        now.saturating_sub(self.renewed_at) > ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staleness_is_strict() {
        let lease = LeaseRecord {
            name: "watch".to_string(),
            holder: "a".to_string(),
            acquired_at: 100,
            renewed_at: 100,
        };
        assert!(!lease.is_stale(60, 160));
        assert!(lease.is_stale(60, 161));
    }

    #[test]
    fn staleness_tolerates_clock_skew() {
        let lease = LeaseRecord {
            name: "watch".to_string(),
            holder: "a".to_string(),
            acquired_at: 100,
            renewed_at: 200,
        };
        // A renewal in the future never counts as stale.
        assert!(!lease.is_stale(60, 150));
    }
}
