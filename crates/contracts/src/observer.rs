//! DispatchObserver trait - observability hook around dispatch calls

use std::time::Duration;

/// Observer notified once per dispatch call.
///
/// Implementations must be cheap; both hooks are called on the dispatch
/// path (the duration hook fires on every exit, including fatal errors).
pub trait DispatchObserver: Send + Sync {
    /// Final accepted/failed counts for one dispatch call
    fn record_outcome(&self, accepted: usize, failed: usize);

    /// Wall-clock duration of one dispatch call including all retries
    fn record_send_duration(&self, elapsed: Duration);
}

/// Observer that discards all notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {
    fn record_outcome(&self, _accepted: usize, _failed: usize) {}

    fn record_send_duration(&self, _elapsed: Duration) {}
}
