//! Run statistics
//!
//! Lock-free counters using atomic operations, shared across scenarios and
//! concurrent stress workers without mutex contention.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one smoke run.
#[derive(Debug, Default)]
pub struct RunStats {
    sessions_opened: AtomicU64,
    sessions_closed: AtomicU64,
    iterations_attempted: AtomicU64,
    iterations_failed: AtomicU64,
    checks_passed: AtomicU64,
    checks_failed: AtomicU64,
}

impl RunStats {
    /// Create new run stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a browser session launch
    pub fn record_session_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a browser session close
    pub fn record_session_closed(&self) {
        self.sessions_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one stress iteration attempt
    pub fn record_iteration_attempt(&self) {
        self.iterations_attempted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one failed stress iteration
    pub fn record_iteration_failure(&self) {
        self.iterations_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a passed scenario check (non-fatal assertion)
    pub fn record_check_passed(&self) {
        self.checks_passed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed scenario check (non-fatal assertion)
    pub fn record_check_failed(&self) {
        self.checks_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get sessions opened
    pub fn sessions_opened(&self) -> u64 {
        self.sessions_opened.load(Ordering::Relaxed)
    }

    /// Get sessions closed
    pub fn sessions_closed(&self) -> u64 {
        self.sessions_closed.load(Ordering::Relaxed)
    }

    /// Get snapshot for serialization
    pub fn snapshot(&self) -> RunStatsSnapshot {
        RunStatsSnapshot {
            sessions_opened: self.sessions_opened.load(Ordering::Relaxed),
            sessions_closed: self.sessions_closed.load(Ordering::Relaxed),
            iterations_attempted: self.iterations_attempted.load(Ordering::Relaxed),
            iterations_failed: self.iterations_failed.load(Ordering::Relaxed),
            checks_passed: self.checks_passed.load(Ordering::Relaxed),
            checks_failed: self.checks_failed.load(Ordering::Relaxed),
        }
    }
}

/// Serializable snapshot of run stats
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatsSnapshot {
    pub sessions_opened: u64,
    pub sessions_closed: u64,
    pub iterations_attempted: u64,
    pub iterations_failed: u64,
    pub checks_passed: u64,
    pub checks_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_round_trip() {
        let stats = RunStats::new();
        stats.record_session_opened();
        stats.record_session_opened();
        stats.record_session_closed();
        stats.record_iteration_attempt();
        stats.record_iteration_failure();
        stats.record_check_passed();
        stats.record_check_failed();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.sessions_opened, 2);
        assert_eq!(snapshot.sessions_closed, 1);
        assert_eq!(snapshot.iterations_attempted, 1);
        assert_eq!(snapshot.iterations_failed, 1);
        assert_eq!(snapshot.checks_passed, 1);
        assert_eq!(snapshot.checks_failed, 1);
    }

    #[test]
    fn test_new_stats_are_zeroed() {
        let snapshot = RunStats::new().snapshot();
        assert_eq!(snapshot.sessions_opened, 0);
        assert_eq!(snapshot.iterations_attempted, 0);
    }
}
