//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{ClientType, LimiterConfig};

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    stream: String,
    client_type: String,
    limiter_strategy: String,
    max_records: usize,
    workers: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    stream: blueprint.stream.name.clone(),
                    client_type: format!("{:?}", blueprint.stream.client.client_type),
                    limiter_strategy: blueprint.limiter.strategy_name().to_string(),
                    max_records: blueprint.batching.max_records,
                    workers: blueprint.workers,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::ProducerBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    // An unlimited limiter disables throughput control entirely
    if blueprint.limiter == LimiterConfig::Unlimited {
        warnings.push(
            "limiter strategy is 'unlimited' - no throughput control will be applied".to_string(),
        );
    }

    // An adaptive limiter that never creeps back up stays degraded forever
    if let LimiterConfig::Adaptive {
        creep_increment, ..
    } = blueprint.limiter
    {
        if creep_increment == 0.0 {
            warnings.push(
                "limiter.creep_increment is 0 - rate will never recover after back-off"
                    .to_string(),
            );
        }
    }

    // Mock client ignores remote params
    if blueprint.stream.client.client_type == ClientType::Mock
        && !blueprint.stream.client.params.is_empty()
    {
        warnings.push("mock client ignores stream.client.params".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Stream: {}", summary.stream);
            println!("  Client: {}", summary.client_type);
            println!("  Limiter: {}", summary.limiter_strategy);
            println!("  Max records/batch: {}", summary.max_records);
            println!("  Workers: {}", summary.workers);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
