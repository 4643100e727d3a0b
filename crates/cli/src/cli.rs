//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Stream Producer - Rate-limited batch producer for partitioned record streams
#[derive(Parser, Debug)]
#[command(
    name = "stream-producer",
    author,
    version,
    about = "Rate-limited batch producer pipeline",
    long_about = "A rate-limited batch producer for partitioned append-only record streams.\n\n\
                  Reads records from a JSONL file, chunks them into batches, throttles \n\
                  outbound throughput with an adaptively-tuned limiter, and retries \n\
                  throughput-rejected records until every record is settled."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "STREAM_PRODUCER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "STREAM_PRODUCER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the producer pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "STREAM_PRODUCER_CONFIG"
    )]
    pub config: PathBuf,

    /// Path to JSONL record file (one record per line)
    #[arg(short, long, env = "STREAM_PRODUCER_RECORDS")]
    pub records: PathBuf,

    /// Override target stream name from configuration
    #[arg(long, env = "STREAM_PRODUCER_STREAM")]
    pub stream: Option<String>,

    /// Override worker-pool width from configuration
    #[arg(long, env = "STREAM_PRODUCER_WORKERS")]
    pub workers: Option<usize>,

    /// Maximum number of batches to dispatch (0 = unlimited)
    #[arg(long, default_value = "0", env = "STREAM_PRODUCER_MAX_BATCHES")]
    pub max_batches: u64,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "STREAM_PRODUCER_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "STREAM_PRODUCER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show limiter tuning details
    #[arg(long)]
    pub limiter: bool,

    /// Show client parameters
    #[arg(long)]
    pub client: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
