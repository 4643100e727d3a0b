//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `ProducerBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("config.toml")).unwrap();
//! println!("Stream: {}", blueprint.stream.name);
//! ```

mod parser;
mod validator;

pub use contracts::ProducerBlueprint;
pub use parser::ConfigFormat;

use contracts::ProducerError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ProducerBlueprint, ProducerError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ProducerBlueprint, ProducerError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize ProducerBlueprint to TOML string
    pub fn to_toml(blueprint: &ProducerBlueprint) -> Result<String, ProducerError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ProducerError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize ProducerBlueprint to JSON string
    pub fn to_json(blueprint: &ProducerBlueprint) -> Result<String, ProducerError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ProducerError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ProducerError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ProducerError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ProducerError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ProducerError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ProducerBlueprint, ProducerError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
workers = 2

[stream]
name = "orders"

[stream.client]
client_type = "mock"

[limiter]
strategy = "adaptive"
initial_rate = 500.0

[batching]
max_records = 200
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.stream.name, "orders");
        assert_eq!(bp.workers, 2);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.stream.name, bp2.stream.name);
        assert_eq!(bp.batching.max_records, bp2.batching.max_records);
        assert_eq!(bp.limiter, bp2.limiter);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.stream.name, bp2.stream.name);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // Invalid limiter tuning should fail validation, not parsing
        let content = r#"
[stream]
name = "orders"

[limiter]
strategy = "adaptive"
initial_rate = -5.0
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("initial_rate"));
    }
}
