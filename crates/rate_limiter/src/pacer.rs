//! Reservation pacer: serializes permit issuance onto a virtual timeline.
//!
//! Each acquisition reserves a slice of the timeline sized
//! `permits / rate` starting at the later of "now" and the previous
//! reservation's end, then sleeps until its slice has elapsed. The lock
//! only guards the timeline bookkeeping; the sleep happens outside it so
//! a long wait never blocks other reservations from queueing up.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Default)]
pub(crate) struct Pacer {
    /// End of the last reservation on the virtual timeline
    next_free: Mutex<Option<Instant>>,
}

impl Pacer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reserve `permits` permits at `rate` permits/sec and wait until
    /// they have all been issued. Returns the wait incurred.
    pub(crate) async fn acquire(&self, permits: usize, rate: f64) -> Duration {
        if permits == 0 {
            return Duration::ZERO;
        }

        let cost = Duration::from_secs_f64(permits as f64 / rate);
        let (deadline, wait) = {
            let mut next_free = self.next_free.lock().unwrap();
            let now = Instant::now();
            let start = match *next_free {
                Some(end) if end > now => end,
                _ => now,
            };
            let deadline = start + cost;
            *next_free = Some(deadline);
            (deadline, deadline - now)
        };

        tokio::time::sleep_until(deadline).await;
        wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: Duration = Duration::from_millis(5);

    fn close_to(actual: Duration, expected: Duration) -> bool {
        let diff = if actual > expected {
            actual - expected
        } else {
            expected - actual
        };
        diff < EPS
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_scales_with_permits() {
        let pacer = Pacer::new();

        let w1 = pacer.acquire(10, 100.0).await;
        assert!(close_to(w1, Duration::from_millis(100)), "got {w1:?}");

        let w2 = pacer.acquire(20, 100.0).await;
        assert!(close_to(w2, Duration::from_millis(200)), "got {w2:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_backlog_accumulates() {
        let pacer = Pacer::new();
        let started = Instant::now();

        // Two back-to-back reservations serialize on the timeline
        pacer.acquire(50, 100.0).await;
        pacer.acquire(50, 100.0).await;

        let elapsed = started.elapsed();
        assert!(close_to(elapsed, Duration::from_secs(1)), "got {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeline_resets() {
        let pacer = Pacer::new();

        pacer.acquire(10, 100.0).await;
        // Let the timeline fall behind the clock
        tokio::time::sleep(Duration::from_secs(5)).await;

        let wait = pacer.acquire(10, 100.0).await;
        assert!(close_to(wait, Duration::from_millis(100)), "got {wait:?}");
    }

    #[tokio::test]
    async fn test_zero_permits_returns_immediately() {
        let pacer = Pacer::new();
        assert_eq!(pacer.acquire(0, 1.0).await, Duration::ZERO);
    }
}
