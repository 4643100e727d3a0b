//! MetricsObserver - DispatchObserver backed by the metrics registry

use std::time::Duration;

use contracts::DispatchObserver;

use crate::metrics::{record_records_accepted, record_records_failed, record_send_latency_ms};

/// Observer that forwards dispatch notifications to the metrics registry.
///
/// Labeled with the target stream so concurrent producers stay separable
/// in Prometheus.
#[derive(Debug, Clone)]
pub struct MetricsObserver {
    stream: String,
}

impl MetricsObserver {
    /// Create an observer for one stream
    pub fn new(stream: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
        }
    }
}

impl DispatchObserver for MetricsObserver {
    fn record_outcome(&self, accepted: usize, failed: usize) {
        record_records_accepted(&self.stream, accepted);
        record_records_failed(&self.stream, failed);
    }

    fn record_send_duration(&self, elapsed: Duration) {
        record_send_latency_ms(elapsed.as_secs_f64() * 1000.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observer_is_cheaply_cloneable() {
        let observer = MetricsObserver::new("orders");
        let clone = observer.clone();

        // Both handles record without a live recorder installed
        observer.record_outcome(10, 0);
        clone.record_send_duration(Duration::from_millis(5));
    }
}
