//! YAML configuration for blob transaction verification.
//!
//! ```yaml
//! chain_id: "blobsig-1"
//! blob:
//!   max_square_size: 128
//!   min_square_size: 1
//! ```
//!
//! Validation collects every error before returning so all problems can be
//! fixed in one pass.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("config validation failed:\n{}", .0.join("\n"))]
    ValidationFailed(Vec<String>),
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlobConfig {
    /// Chain id every admitted transaction must be signed for.
    pub chain_id: String,

    #[serde(default)]
    pub blob: BlobParams,
}

/// Square size bounds applied when malleating wrapped messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlobParams {
    /// Largest square size a candidate may name.
    #[serde(default = "BlobParams::default_max_square_size")]
    pub max_square_size: u64,

    /// Smallest square size a candidate may name.
    #[serde(default = "BlobParams::default_min_square_size")]
    pub min_square_size: u64,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            max_square_size: Self::default_max_square_size(),
            min_square_size: Self::default_min_square_size(),
        }
    }
}

impl BlobParams {
    const fn default_max_square_size() -> u64 {
        128
    }

    const fn default_min_square_size() -> u64 {
        1
    }
}

/// Load and validate configuration from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BlobConfig, ConfigError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path_str.clone(),
        source: e,
    })?;

    load_config_from_str(&content, &path_str)
}

/// Load and validate configuration from a YAML string.
pub fn load_config_from_str(content: &str, source_name: &str) -> Result<BlobConfig, ConfigError> {
    let config: BlobConfig = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
        path: source_name.to_string(),
        source: e,
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Validate the whole configuration, reporting every problem found.
pub fn validate_config(config: &BlobConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.chain_id.trim().is_empty() {
        errors.push("chain_id cannot be empty".to_string());
    }
    validate_blob_params(&config.blob, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed(errors))
    }
}

fn validate_blob_params(params: &BlobParams, errors: &mut Vec<String>) {
    if !params.max_square_size.is_power_of_two() {
        errors.push(format!(
            "blob.max_square_size must be a power of two, got {}",
            params.max_square_size
        ));
    }
    if !params.min_square_size.is_power_of_two() {
        errors.push(format!(
            "blob.min_square_size must be a power of two, got {}",
            params.min_square_size
        ));
    }
    if params.min_square_size > params.max_square_size {
        errors.push(format!(
            "blob.min_square_size ({}) cannot exceed blob.max_square_size ({})",
            params.min_square_size, params.max_square_size
        ));
    }
}
