//! Shared rate cell: a single f64 updated by compare-and-swap.
//!
//! The rate is stored as raw bits in an `AtomicU64` so concurrent
//! `acquire` reads and `update` read-modify-writes never lose updates
//! and never need a lock.

use std::sync::atomic::{AtomicU64, Ordering};

/// Floor for the permit rate (permits/sec).
///
/// Invariant: the stored rate is always > 0. Repeated back-offs clamp
/// here instead of collapsing to zero, which would stall `acquire`
/// forever.
pub const MIN_RATE: f64 = 1e-3;

/// Lock-free f64 rate shared between acquire and update paths
#[derive(Debug)]
pub(crate) struct SharedRate {
    bits: AtomicU64,
}

impl SharedRate {
    pub(crate) fn new(rate: f64) -> Self {
        debug_assert!(rate > 0.0);
        Self {
            bits: AtomicU64::new(rate.max(MIN_RATE).to_bits()),
        }
    }

    /// Current rate
    pub(crate) fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Multiplicative decrease: divide by `divisor`, clamped to [`MIN_RATE`]
    pub(crate) fn backoff(&self, divisor: f64) -> f64 {
        self.transform(|rate| (rate / divisor).max(MIN_RATE))
    }

    /// Additive increase: add `increment`
    pub(crate) fn creep(&self, increment: f64) -> f64 {
        self.transform(|rate| rate + increment)
    }

    fn transform(&self, f: impl Fn(f64) -> f64) -> f64 {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            let next = f(f64::from_bits(current));
            match self.bits.compare_exchange_weak(
                current,
                next.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_backoff_halves_and_clamps() {
        let rate = SharedRate::new(8.0);
        assert_eq!(rate.backoff(2.0), 4.0);
        assert_eq!(rate.backoff(2.0), 2.0);

        // Drive the rate into the floor
        for _ in 0..100 {
            rate.backoff(2.0);
        }
        assert_eq!(rate.get(), MIN_RATE);
        assert!(rate.get() > 0.0);
    }

    #[test]
    fn test_creep_adds_increment() {
        let rate = SharedRate::new(10.0);
        let increment = 1.0 / 60.0;
        rate.creep(increment);
        rate.creep(increment);
        assert!((rate.get() - (10.0 + 2.0 * increment)).abs() < 1e-12);
    }

    #[test]
    fn test_concurrent_creep_loses_no_updates() {
        let rate = Arc::new(SharedRate::new(0.001));
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let rate = Arc::clone(&rate);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        rate.creep(1.0);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert!((rate.get() - (0.001 + 8000.0)).abs() < 1e-6);
    }
}
