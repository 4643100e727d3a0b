//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref stream) = args.stream {
        info!(stream = %stream, "Overriding stream name from CLI");
        blueprint.stream.name = stream.clone();
    }
    if let Some(workers) = args.workers {
        info!(workers, "Overriding worker count from CLI");
        blueprint.workers = workers.max(1);
    }

    info!(
        stream = %blueprint.stream.name,
        client = ?blueprint.stream.client.client_type,
        limiter = blueprint.limiter.strategy_name(),
        batch_size = blueprint.batching.max_records,
        workers = blueprint.workers,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    if !args.records.exists() {
        anyhow::bail!("Record file not found: {}", args.records.display());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        records_path: args.records.clone(),
        max_batches: if args.max_batches == 0 {
            None
        } else {
            Some(args.max_batches)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        batches_sent = stats.batches_sent,
                        records_accepted = stats.records_accepted,
                        records_failed = stats.records_failed,
                        duration_secs = stats.duration.as_secs_f64(),
                        rps = format!("{:.2}", stats.rps()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("Stream Producer finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::ProducerBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Stream:");
    println!("  Name: {}", blueprint.stream.name);
    println!(
        "  Client: {:?}",
        blueprint.stream.client.client_type
    );

    println!("\nLimiter:");
    println!("  Strategy: {}", blueprint.limiter.strategy_name());
    match blueprint.limiter {
        contracts::LimiterConfig::Fixed { rate } => {
            println!("  Rate: {rate} permits/s");
        }
        contracts::LimiterConfig::Adaptive {
            initial_rate,
            backoff_divisor,
            creep_increment,
        } => {
            println!("  Initial rate: {initial_rate} permits/s");
            println!("  Backoff divisor: {backoff_divisor}");
            println!("  Creep increment: {creep_increment} permits/s");
        }
        contracts::LimiterConfig::Unlimited => {}
    }

    println!("\nBatching:");
    println!("  Max records per batch: {}", blueprint.batching.max_records);
    println!("  Workers: {}", blueprint.workers);

    println!();
}
