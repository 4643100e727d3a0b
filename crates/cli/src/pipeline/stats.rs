//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::DispatchAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total batches dispatched to completion
    pub batches_sent: u64,

    /// Total records durably accepted
    pub records_accepted: u64,

    /// Total records permanently failed
    pub records_failed: u64,

    /// Batches abandoned after a fatal collaborator error
    pub batches_aborted: u64,

    /// Total submission attempts (including retries)
    pub attempts: u64,

    /// Total throttled record retries
    pub throttled_retries: u64,

    /// Cumulative time spent waiting on the limiter
    pub limiter_wait: Duration,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of workers that were active
    pub active_workers: usize,

    /// Per-batch dispatch aggregates
    pub dispatch_metrics: DispatchAggregator,
}

impl PipelineStats {
    /// Calculate records-per-second throughput
    pub fn rps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records_accepted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate failure rate as percentage
    #[allow(dead_code)]
    pub fn failure_rate(&self) -> f64 {
        let total = self.records_accepted + self.records_failed;
        if total > 0 {
            (self.records_failed as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Batches sent: {}", self.batches_sent);
        println!("   ├─ Records accepted: {}", self.records_accepted);
        println!("   ├─ Records failed: {}", self.records_failed);
        if self.batches_aborted > 0 {
            println!("   ├─ Batches aborted: {}", self.batches_aborted);
        }
        println!("   ├─ Throughput: {:.2} records/s", self.rps());
        println!("   └─ Active workers: {}", self.active_workers);

        let summary = self.dispatch_metrics.summary();

        println!("\n📈 Dispatch Metrics");
        println!("   ├─ Submission attempts: {}", self.attempts);
        println!("   ├─ Throttled retries: {}", self.throttled_retries);
        println!(
            "   ├─ Limiter wait: {:.2}s total",
            self.limiter_wait.as_secs_f64()
        );
        println!("   ├─ Batch size: {}", summary.batch_size);
        println!("   └─ Send latency (ms): {}", summary.latency_ms);

        println!();
    }
}
