//! Adaptive limiter: multiplicative back-off on throttling, additive
//! creep when the channel is clear.
//!
//! The control loop is deliberately asymmetric. Throttling feedback means
//! the stream's capacity was exceeded right now, so the rate drops fast
//! (divide by `backoff_divisor`). A clean attempt only proves the current
//! rate is safe, so the rate recovers slowly (add `creep_increment`).

use std::time::Duration;

use tracing::debug;

use crate::pacer::Pacer;
use crate::rate::SharedRate;

/// Limiter whose rate is tuned by submission feedback.
///
/// One instance may be shared by concurrent dispatch calls against the
/// same stream; the rate lives in a single atomic cell so interleaved
/// `acquire`/`update` calls stay consistent.
#[derive(Debug)]
pub struct AdaptiveLimiter {
    rate: SharedRate,
    backoff_divisor: f64,
    creep_increment: f64,
    pacer: Pacer,
}

impl AdaptiveLimiter {
    /// Create an adaptive limiter.
    ///
    /// Parameter ranges (`initial_rate` > 0, `backoff_divisor` > 1,
    /// `creep_increment` >= 0) are validated by the factory.
    pub fn new(initial_rate: f64, backoff_divisor: f64, creep_increment: f64) -> Self {
        Self {
            rate: SharedRate::new(initial_rate),
            backoff_divisor,
            creep_increment,
            pacer: Pacer::new(),
        }
    }

    /// Block until `permits` permits have been issued at the rate current
    /// at reservation time; returns the wait incurred
    pub async fn acquire(&self, permits: usize) -> Duration {
        self.pacer.acquire(permits, self.rate.get()).await
    }

    /// Adjust the rate from one attempt's feedback.
    ///
    /// `throttled > 0` backs the rate off; `throttled == 0` creeps it up.
    pub fn update(&self, issued: usize, throttled: usize) {
        if throttled > 0 {
            let rate = self.rate.backoff(self.backoff_divisor);
            debug!(issued, throttled, rate, "rate backed off");
        } else {
            let rate = self.rate.creep(self.creep_increment);
            debug!(issued, rate, "rate crept up");
        }
    }

    /// Current rate (permits/sec)
    pub fn rate(&self) -> f64 {
        self.rate.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limiter(initial: f64) -> AdaptiveLimiter {
        AdaptiveLimiter::new(initial, 2.0, 1.0 / 60.0)
    }

    #[test]
    fn test_backoff_divides_rate() {
        let limiter = limiter(100.0);
        limiter.update(10, 3);
        assert_eq!(limiter.rate(), 50.0);
        limiter.update(10, 10);
        assert_eq!(limiter.rate(), 25.0);
    }

    #[test]
    fn test_creep_adds_increment() {
        let limiter = limiter(100.0);
        limiter.update(10, 0);
        assert!((limiter.rate() - (100.0 + 1.0 / 60.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rate_stays_positive() {
        let limiter = limiter(1.0);
        for _ in 0..1000 {
            limiter.update(5, 5);
        }
        assert!(limiter.rate() > 0.0);

        // And recovers from the floor
        limiter.update(5, 0);
        assert!(limiter.rate() > crate::rate::MIN_RATE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_reflects_backed_off_rate() {
        let limiter = limiter(100.0);

        let before = limiter.acquire(10).await;
        limiter.update(10, 10); // halve to 50/s
        let after = limiter.acquire(10).await;

        // Same permit count costs about twice the wait at half the rate
        assert!(after > before);
        let ratio = after.as_secs_f64() / before.as_secs_f64();
        assert!((ratio - 2.0).abs() < 0.1, "ratio {ratio}");
    }

    #[tokio::test]
    async fn test_concurrent_updates_stay_consistent() {
        let limiter = Arc::new(limiter(1024.0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                for _ in 0..256 {
                    limiter.update(8, 0);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // 4 tasks * 256 creeps, none lost
        let expected = 1024.0 + 4.0 * 256.0 / 60.0;
        assert!((limiter.rate() - expected).abs() < 1e-9);
    }
}
