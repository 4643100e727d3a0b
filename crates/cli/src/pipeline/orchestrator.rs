//! Pipeline orchestrator - coordinates all components.
//!
//! Builds the limiter, client, and dispatcher from the blueprint, then
//! drives batches from the record file through a worker pool sharing one
//! dispatcher (and therefore one limiter).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use contracts::{Batch, ClientType, ProducerBlueprint, StreamClient};
use dispatcher::BatchDispatcher;
use observability::{record_limiter_rate, DispatchAggregator, MetricsObserver};
use rate_limiter::build_limiter;
use stream_client::{MockStreamClient, RemoteStreamClient};

use super::{chunk_batches, read_records, PipelineStats};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The producer blueprint configuration
    pub blueprint: ProducerBlueprint,

    /// Path to the JSONL record file
    pub records_path: PathBuf,

    /// Maximum number of batches to dispatch (None = all)
    pub max_batches: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Per-batch outcome reported by a worker
struct BatchReport {
    accepted: usize,
    failed: usize,
    latency_ms: f64,
}

/// One worker's full report
struct WorkerReport {
    batches: Vec<BatchReport>,
    aborted: u64,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let client_config = &self.config.blueprint.stream.client;
        match client_config.client_type {
            ClientType::Mock => {
                info!("Running in MOCK mode (no stream service required)");
                self.run_with_client(MockStreamClient::new()).await
            }
            ClientType::Remote => {
                let client = RemoteStreamClient::from_params("remote", &client_config.params)
                    .context("Failed to build remote stream client")?;
                self.run_with_client(client).await
            }
        }
    }

    /// Common pipeline logic shared between mock and remote modes
    async fn run_with_client<C>(self, mut client: C) -> Result<PipelineStats>
    where
        C: StreamClient + Send + Sync + 'static,
    {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;
        let stream_name = blueprint.stream.name.clone();

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Open client and probe the stream
        info!(client = client.name(), stream = %stream_name, "Opening stream client...");
        client
            .open()
            .await
            .context("Failed to open stream client")?;

        match client.healthy().await {
            Ok(true) => info!("Stream is available"),
            Ok(false) => warn!("Stream reported unavailable, dispatching anyway"),
            Err(e) => warn!(error = %e, "Health probe failed"),
        }

        // Build limiter and dispatcher
        let limiter = Arc::new(
            build_limiter(&blueprint.limiter).context("Failed to build limiter")?,
        );
        info!(
            strategy = blueprint.limiter.strategy_name(),
            rate = ?limiter.current_rate(),
            "Limiter configured"
        );

        let observer = MetricsObserver::new(&stream_name);
        let dispatcher = Arc::new(BatchDispatcher::new(
            client,
            Arc::clone(&limiter),
            observer,
        ));

        // Load records and chunk into batches
        let records = read_records(&self.config.records_path)?;
        let mut batches = chunk_batches(&stream_name, records, blueprint.batching.max_records);

        if let Some(max) = self.config.max_batches {
            if batches.len() as u64 > max {
                warn!(
                    total = batches.len(),
                    max, "Truncating batch list to max_batches"
                );
                batches.truncate(max as usize);
            }
        }

        let workers = blueprint.workers.max(1);
        info!(
            batches = batches.len(),
            workers,
            batch_size = blueprint.batching.max_records,
            "Pipeline running"
        );

        // Round-robin batches across the worker pool; every worker shares
        // the one dispatcher, so they all draw on the same limiter.
        let mut queues: Vec<Vec<Batch>> = (0..workers).map(|_| Vec::new()).collect();
        for (index, batch) in batches.into_iter().enumerate() {
            queues[index % workers].push(batch);
        }

        let handles: Vec<JoinHandle<WorkerReport>> = queues
            .into_iter()
            .enumerate()
            .map(|(worker_id, queue)| {
                let dispatcher = Arc::clone(&dispatcher);
                let stream_name = stream_name.clone();
                tokio::spawn(async move {
                    run_worker(worker_id, queue, dispatcher, &stream_name).await
                })
            })
            .collect();

        let abort_handles: Vec<_> = handles.iter().map(|h| h.abort_handle()).collect();

        let collect = async {
            let mut reports = Vec::new();
            for handle in handles {
                match handle.await {
                    Ok(report) => reports.push(report),
                    Err(e) => error!(error = ?e, "Worker task panicked"),
                }
            }
            reports
        };

        // Run with optional timeout
        let reports = if let Some(timeout) = self.config.timeout {
            match tokio::time::timeout(timeout, collect).await {
                Ok(reports) => reports,
                Err(_) => {
                    warn!(timeout_secs = timeout.as_secs(), "Pipeline timed out");
                    for abort in abort_handles {
                        abort.abort();
                    }
                    Vec::new()
                }
            }
        } else {
            collect.await
        };

        // Aggregate worker reports
        let mut aggregator = DispatchAggregator::new();
        let mut aborted = 0u64;
        for report in reports {
            aborted += report.aborted;
            for batch in report.batches {
                aggregator.record_batch(batch.accepted as u64, batch.failed as u64, batch.latency_ms);
            }
        }

        if let Some(rate) = limiter.current_rate() {
            record_limiter_rate(&stream_name, rate);
        }

        let snapshot = dispatcher.metrics();

        // Recover the client for a clean close
        match Arc::try_unwrap(dispatcher) {
            Ok(dispatcher) => {
                let mut client = dispatcher.into_client();
                if let Err(e) = client.close().await {
                    warn!(error = %e, "Error closing stream client");
                }
            }
            Err(_) => warn!("Dispatcher still shared, skipping client close"),
        }

        let stats = PipelineStats {
            batches_sent: aggregator.total_batches,
            records_accepted: snapshot.accepted_count,
            records_failed: snapshot.failed_count,
            batches_aborted: aborted,
            attempts: snapshot.attempt_count,
            throttled_retries: snapshot.throttled_count,
            limiter_wait: snapshot.limiter_wait,
            duration: start_time.elapsed(),
            active_workers: workers,
            dispatch_metrics: aggregator,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            rps = format!("{:.2}", stats.rps()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}

/// Worker loop: dispatch this worker's batches sequentially.
///
/// A fatal dispatch error abandons the worker's remaining batches; the
/// rest of the pool keeps going.
async fn run_worker<C, O>(
    worker_id: usize,
    queue: Vec<Batch>,
    dispatcher: Arc<BatchDispatcher<C, O>>,
    stream_name: &str,
) -> WorkerReport
where
    C: StreamClient,
    O: contracts::DispatchObserver,
{
    let total = queue.len();
    let mut report = WorkerReport {
        batches: Vec::with_capacity(total),
        aborted: 0,
    };

    for (index, batch) in queue.into_iter().enumerate() {
        let size = batch.len();
        let started = Instant::now();

        match dispatcher.send(batch).await {
            Ok(failed) => {
                report.batches.push(BatchReport {
                    accepted: size - failed,
                    failed,
                    latency_ms: started.elapsed().as_secs_f64() * 1000.0,
                });
            }
            Err(e) => {
                report.aborted = (total - index) as u64;
                error!(
                    worker_id,
                    batch = index,
                    remaining = report.aborted,
                    error = %e,
                    "Fatal dispatch error, abandoning worker queue"
                );
                break;
            }
        }

        if let Some(rate) = dispatcher.limiter().current_rate() {
            record_limiter_rate(stream_name, rate);
        }
    }

    report
}
