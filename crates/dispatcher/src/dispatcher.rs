//! BatchDispatcher - rate-limited submit/classify/retry loop

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use contracts::{Batch, DispatchObserver, ProducerError, RecordOutcome, StreamClient};
use rate_limiter::Limiter;

use crate::error::DispatchError;
use crate::metrics::{DispatchMetrics, MetricsSnapshot};

/// Dispatcher for batches destined to one partitioned stream.
///
/// Owns one limiter (possibly shared with other dispatchers through the
/// `Arc`), one stream client, and one observer. `send` performs blocking
/// work (the limiter wait and the network submission); callers that need
/// concurrency run it from a worker pool.
pub struct BatchDispatcher<C, O> {
    client: C,
    limiter: Arc<Limiter>,
    observer: O,
    metrics: Arc<DispatchMetrics>,
}

/// Classification of one submission attempt's response
struct AttemptOutcome {
    accepted: usize,
    failed: usize,
    /// Positions to resubmit, ascending
    retryable: Vec<usize>,
}

impl<C, O> BatchDispatcher<C, O>
where
    C: StreamClient,
    O: DispatchObserver,
{
    /// Create a dispatcher
    pub fn new(client: C, limiter: Arc<Limiter>, observer: O) -> Self {
        Self {
            client,
            limiter,
            observer,
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    /// Get current metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Shared limiter handle
    pub fn limiter(&self) -> &Arc<Limiter> {
        &self.limiter
    }

    /// Tear down the dispatcher and recover the client, so the caller can
    /// run its close lifecycle hook
    pub fn into_client(self) -> C {
        self.client
    }

    /// Dispatch a batch, retrying throughput-rejected records until the
    /// whole batch is accepted or a fatal collaborator error occurs.
    ///
    /// Returns the count of permanently failed records. Throttled records
    /// never surface here; they are resubmitted (in their original
    /// relative order) on the next attempt.
    ///
    /// Retries on throughput rejection are unbounded: back-pressure is
    /// treated as self-resolving once the limiter has adapted. Callers
    /// that need a ceiling wrap this call in `tokio::time::timeout`.
    ///
    /// # Errors
    /// Any collaborator error other than the throughput rejection aborts
    /// immediately; the error carries the permanently-failed count
    /// accumulated up to that point.
    #[instrument(
        name = "dispatcher_send",
        skip(self, batch),
        fields(stream = %batch.stream, records = batch.len())
    )]
    pub async fn send(&self, mut batch: Batch) -> Result<usize, DispatchError> {
        let _timing = TimingScope::new(&self.observer);

        if batch.is_empty() {
            self.observer.record_outcome(0, 0);
            return Ok(0);
        }

        let mut accepted_total = 0usize;
        let mut failed_total = 0usize;
        let mut attempt = 0u64;

        loop {
            attempt += 1;
            let issued = batch.len();

            let waited = self.limiter.acquire(issued).await;
            self.metrics.add_limiter_wait(waited);
            self.metrics.inc_attempt_count();

            let result = match self.client.submit(&batch).await {
                Ok(result) => result,
                Err(err) if err.is_throughput_exceeded() => {
                    // Batch-level rejection: every record is retryable
                    // as-is, so the batch contents stay untouched.
                    self.limiter.update(issued, issued);
                    self.metrics.add_throttled(issued);
                    warn!(attempt, issued, "whole batch throttled, retrying");
                    continue;
                }
                Err(err) => {
                    self.observer.record_outcome(accepted_total, failed_total);
                    return Err(DispatchError::aborted(failed_total, err));
                }
            };

            if result.fully_accepted() {
                accepted_total += issued;
                self.limiter.update(issued, 0);
                self.metrics.add_accepted(issued);
                debug!(attempt, issued, "batch fully accepted");
                break;
            }

            if result.results.len() != issued {
                let err = ProducerError::MalformedResponse {
                    expected: issued,
                    got: result.results.len(),
                };
                self.observer.record_outcome(accepted_total, failed_total);
                return Err(DispatchError::aborted(failed_total, err));
            }

            let outcome = classify_attempt(&result.results, attempt);
            accepted_total += outcome.accepted;
            failed_total += outcome.failed;

            let throttled = outcome.retryable.len();
            self.limiter.update(issued, throttled);
            self.metrics.add_accepted(outcome.accepted);
            self.metrics.add_failed(outcome.failed);
            self.metrics.add_throttled(throttled);

            if throttled == 0 {
                debug!(attempt, accepted = accepted_total, failed = failed_total, "batch settled");
                break;
            }

            batch.shrink_to(&outcome.retryable);
            debug!(attempt, retrying = throttled, "retrying throttled subset");
        }

        self.metrics.inc_batch_count();
        self.observer.record_outcome(accepted_total, failed_total);
        Ok(failed_total)
    }
}

/// Classify one attempt's per-position results
fn classify_attempt(results: &[contracts::RecordResult], attempt: u64) -> AttemptOutcome {
    let mut outcome = AttemptOutcome {
        accepted: 0,
        failed: 0,
        retryable: Vec::new(),
    };

    for (position, record_result) in results.iter().enumerate() {
        match record_result.outcome() {
            RecordOutcome::Accepted => outcome.accepted += 1,
            RecordOutcome::Throttled => outcome.retryable.push(position),
            RecordOutcome::Failed(code) => {
                outcome.failed += 1;
                warn!(
                    attempt,
                    position,
                    code = %code,
                    message = record_result.error_message.as_deref().unwrap_or(""),
                    "record failed permanently"
                );
            }
        }
    }

    outcome
}

/// Timing scope spanning one dispatch call; releases on every exit path
struct TimingScope<'a, O: DispatchObserver> {
    observer: &'a O,
    started: Instant,
}

impl<'a, O: DispatchObserver> TimingScope<'a, O> {
    fn new(observer: &'a O) -> Self {
        Self {
            observer,
            started: Instant::now(),
        }
    }
}

impl<O: DispatchObserver> Drop for TimingScope<'_, O> {
    fn drop(&mut self) {
        self.observer.record_send_duration(self.started.elapsed());
    }
}
