//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics for a single dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Completed dispatch calls
    batch_count: AtomicU64,
    /// Submission attempts across all dispatch calls
    attempt_count: AtomicU64,
    /// Records durably accepted
    accepted_count: AtomicU64,
    /// Records permanently failed
    failed_count: AtomicU64,
    /// Throttled record retries (one per record per retried attempt)
    throttled_count: AtomicU64,
    /// Total time spent waiting on the limiter, in microseconds
    limiter_wait_micros: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get completed dispatch call count
    pub fn batch_count(&self) -> u64 {
        self.batch_count.load(Ordering::Relaxed)
    }

    /// Increment completed dispatch call count
    pub fn inc_batch_count(&self) {
        self.batch_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get submission attempt count
    pub fn attempt_count(&self) -> u64 {
        self.attempt_count.load(Ordering::Relaxed)
    }

    /// Increment submission attempt count
    pub fn inc_attempt_count(&self) {
        self.attempt_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get accepted record count
    pub fn accepted_count(&self) -> u64 {
        self.accepted_count.load(Ordering::Relaxed)
    }

    /// Add accepted records
    pub fn add_accepted(&self, n: usize) {
        self.accepted_count.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Get permanently failed record count
    pub fn failed_count(&self) -> u64 {
        self.failed_count.load(Ordering::Relaxed)
    }

    /// Add permanently failed records
    pub fn add_failed(&self, n: usize) {
        self.failed_count.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Get throttled retry count
    pub fn throttled_count(&self) -> u64 {
        self.throttled_count.load(Ordering::Relaxed)
    }

    /// Add throttled records
    pub fn add_throttled(&self, n: usize) {
        self.throttled_count.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Get cumulative limiter wait
    pub fn limiter_wait(&self) -> Duration {
        Duration::from_micros(self.limiter_wait_micros.load(Ordering::Relaxed))
    }

    /// Add limiter wait time
    pub fn add_limiter_wait(&self, wait: Duration) {
        self.limiter_wait_micros
            .fetch_add(wait.as_micros() as u64, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batch_count: self.batch_count(),
            attempt_count: self.attempt_count(),
            accepted_count: self.accepted_count(),
            failed_count: self.failed_count(),
            throttled_count: self.throttled_count(),
            limiter_wait: self.limiter_wait(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub batch_count: u64,
    pub attempt_count: u64,
    pub accepted_count: u64,
    pub failed_count: u64,
    pub throttled_count: u64,
    pub limiter_wait: Duration,
}
