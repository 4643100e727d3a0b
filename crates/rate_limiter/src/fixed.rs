//! Fixed-rate limiter: constant permit rate, feedback ignored.

use std::time::Duration;

use crate::pacer::Pacer;

/// Limiter that issues permits at a constant configured rate.
#[derive(Debug)]
pub struct FixedLimiter {
    rate: f64,
    pacer: Pacer,
}

impl FixedLimiter {
    /// Create a fixed limiter. `rate` must be > 0 (validated by the factory).
    pub fn new(rate: f64) -> Self {
        Self {
            rate,
            pacer: Pacer::new(),
        }
    }

    /// Block until `permits` permits have been issued; returns the wait incurred
    pub async fn acquire(&self, permits: usize) -> Duration {
        self.pacer.acquire(permits, self.rate).await
    }

    /// Configured rate (permits/sec)
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_acquire_paces_at_configured_rate() {
        let limiter = FixedLimiter::new(200.0);

        let wait = limiter.acquire(100).await;
        let expected = Duration::from_millis(500);
        let diff = if wait > expected {
            wait - expected
        } else {
            expected - wait
        };
        assert!(diff < Duration::from_millis(5), "got {wait:?}");
    }

    #[test]
    fn test_rate_is_inert() {
        let limiter = FixedLimiter::new(42.0);
        // No update surface exists on the fixed variant; the rate is what
        // it was constructed with, forever.
        assert_eq!(limiter.rate(), 42.0);
    }
}
