//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::LimiterConfig;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    stream: StreamInfo,
    limiter: LimiterInfo,
    batching: BatchingInfo,
    workers: usize,
}

#[derive(Serialize)]
struct StreamInfo {
    name: String,
    client_type: String,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    client_params: std::collections::HashMap<String, String>,
}

#[derive(Serialize)]
struct LimiterInfo {
    strategy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    backoff_divisor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    creep_increment: Option<f64>,
}

#[derive(Serialize)]
struct BatchingInfo {
    max_records: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::ProducerBlueprint, args: &InfoArgs) -> ConfigInfo {
    let limiter = match blueprint.limiter {
        LimiterConfig::Fixed { rate } => LimiterInfo {
            strategy: "fixed".to_string(),
            rate: Some(rate),
            backoff_divisor: None,
            creep_increment: None,
        },
        LimiterConfig::Adaptive {
            initial_rate,
            backoff_divisor,
            creep_increment,
        } => LimiterInfo {
            strategy: "adaptive".to_string(),
            rate: Some(initial_rate),
            backoff_divisor: args.limiter.then_some(backoff_divisor),
            creep_increment: args.limiter.then_some(creep_increment),
        },
        LimiterConfig::Unlimited => LimiterInfo {
            strategy: "unlimited".to_string(),
            rate: None,
            backoff_divisor: None,
            creep_increment: None,
        },
    };

    let client_params = if args.client {
        blueprint.stream.client.params.clone()
    } else {
        Default::default()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        stream: StreamInfo {
            name: blueprint.stream.name.clone(),
            client_type: format!("{:?}", blueprint.stream.client.client_type),
            client_params,
        },
        limiter,
        batching: BatchingInfo {
            max_records: blueprint.batching.max_records,
        },
        workers: blueprint.workers,
    }
}

fn print_config_info(blueprint: &contracts::ProducerBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Stream Producer Configuration                  ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Stream info
    println!("📤 Stream");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Name: {}", blueprint.stream.name);
    println!(
        "   └─ Client: {:?}",
        blueprint.stream.client.client_type
    );

    if args.client && !blueprint.stream.client.params.is_empty() {
        println!("\n🔌 Client Parameters");
        let params: Vec<_> = blueprint.stream.client.params.iter().collect();
        for (i, (key, value)) in params.iter().enumerate() {
            let prefix = if i == params.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            println!("   {} {}: {}", prefix, key, value);
        }
    }

    // Limiter
    println!("\n⚙️  Limiter");
    match blueprint.limiter {
        LimiterConfig::Fixed { rate } => {
            println!("   ├─ Strategy: fixed");
            println!("   └─ Rate: {} permits/s", rate);
        }
        LimiterConfig::Adaptive {
            initial_rate,
            backoff_divisor,
            creep_increment,
        } => {
            println!("   ├─ Strategy: adaptive");
            if args.limiter {
                println!("   ├─ Initial rate: {} permits/s", initial_rate);
                println!("   ├─ Backoff divisor: {}", backoff_divisor);
                println!("   └─ Creep increment: {} permits/s", creep_increment);
            } else {
                println!("   └─ Initial rate: {} permits/s", initial_rate);
            }
        }
        LimiterConfig::Unlimited => {
            println!("   └─ Strategy: unlimited (no throughput control)");
        }
    }

    // Batching
    println!("\n📦 Batching");
    println!("   ├─ Max records per batch: {}", blueprint.batching.max_records);
    println!("   └─ Workers: {}", blueprint.workers);

    println!();
}
