//! Internal health tracking for API-free health checks

use crate::types::SourceHealth;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Tracks request outcomes so `health()` never has to spend API quota
pub struct HealthTracker {
    /// Timestamp of last successful request (millis since epoch)
    last_success_ms: AtomicU64,
    /// Timestamp of last failed request (millis since epoch)
    last_failure_ms: AtomicU64,
    /// Recent success count (approximation)
    success_count: AtomicU64,
    /// Recent failure count (approximation)
    failure_count: AtomicU64,
    /// Last known latency in ms
    last_latency_ms: AtomicU64,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            last_success_ms: AtomicU64::new(0),
            last_failure_ms: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            last_latency_ms: AtomicU64::new(0),
        }
    }

    pub fn record_success(&self, latency_ms: u64) {
        let now_ms = Utc::now().timestamp_millis() as u64;
        self.last_success_ms.store(now_ms, Ordering::Relaxed);
        self.last_latency_ms.store(latency_ms, Ordering::Relaxed);
        self.success_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        let now_ms = Utc::now().timestamp_millis() as u64;
        self.last_failure_ms.store(now_ms, Ordering::Relaxed);
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    fn is_healthy(&self) -> bool {
        let last_success = self.last_success_ms.load(Ordering::Relaxed);
        let last_failure = self.last_failure_ms.load(Ordering::Relaxed);

        // Healthy if: had at least one success AND (no failures OR last success > last failure)
        last_success > 0 && (last_failure == 0 || last_success > last_failure)
    }

    fn success_rate(&self) -> f64 {
        let successes = self.success_count.load(Ordering::Relaxed);
        let failures = self.failure_count.load(Ordering::Relaxed);
        let total = successes + failures;
        if total == 0 {
            return 1.0; // No requests yet, assume healthy
        }
        successes as f64 / total as f64
    }

    /// Build a `SourceHealth` snapshot from the internal counters
    pub fn to_health(&self, source: &str) -> SourceHealth {
        let last_success_ms = self.last_success_ms.load(Ordering::Relaxed);
        let last_success = if last_success_ms > 0 {
            DateTime::from_timestamp_millis(last_success_ms as i64)
        } else {
            None
        };

        let is_healthy = self.is_healthy();

        SourceHealth {
            source: source.to_string(),
            is_healthy,
            last_success,
            last_error: if is_healthy {
                None
            } else {
                Some("Recent failures detected".to_string())
            },
            success_rate: self.success_rate(),
            avg_latency_ms: self.last_latency_ms.load(Ordering::Relaxed),
        }
    }
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_tracker_reports_unhealthy() {
        let tracker = HealthTracker::new();
        let health = tracker.to_health("test");
        assert!(!health.is_healthy);
        assert!(health.last_success.is_none());
        assert_eq!(health.success_rate, 1.0);
    }

    #[test]
    fn test_success_after_failure_recovers() {
        let tracker = HealthTracker::new();
        tracker.record_failure();
        assert!(!tracker.to_health("test").is_healthy);

        // Millisecond timestamps break the tie between failure and success
        std::thread::sleep(std::time::Duration::from_millis(2));
        tracker.record_success(42);
        let health = tracker.to_health("test");
        assert!(health.is_healthy);
        assert_eq!(health.avg_latency_ms, 42);
        assert_eq!(health.success_rate, 0.5);
    }
}
