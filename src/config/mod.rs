//! Configuration module for Sheetstream
//!
//! Handles loading and parsing of YAML configuration files with support for
//! environment variable expansion and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Expand environment variables in a string.
///
/// Supports two syntaxes:
/// - `${VAR_NAME}` - Simple expansion, keeps placeholder if var not found
/// - `${VAR_NAME:-default}` - Expansion with default value
///
/// Variable names must start with a letter or underscore and contain only
/// uppercase letters, digits, and underscores.
fn expand_env_vars(s: &str) -> String {
    let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]+))?\}").unwrap();
    let mut last_match = 0;
    let mut result = String::with_capacity(s.len());

    for cap in re.captures_iter(s) {
        let full_match = cap.get(0).unwrap();
        let var_name = cap.get(1).unwrap().as_str();

        result.push_str(&s[last_match..full_match.start()]);

        let value = match std::env::var(var_name) {
            Ok(val) => val,
            Err(_) => {
                if let Some(default) = cap.get(2) {
                    default.as_str().to_string()
                } else {
                    // No env var and no default. Keep the original placeholder.
                    full_match.as_str().to_string()
                }
            }
        };
        result.push_str(&value);

        last_match = full_match.end();
    }

    result.push_str(&s[last_match..]);

    result
}

/// Validate that a URL starts with http:// or https://
fn is_valid_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// S3 imposes a 5 MiB minimum on every part except the last one.
const MIN_PART_SIZE: usize = 5 * 1024 * 1024;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from a YAML file, expanding `${VAR}` placeholders
    /// before parsing.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let expanded = expand_env_vars(&content);
        let config: Config = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.bucket.is_empty() {
            return Err(ConfigError::ValidationError(
                "store.bucket must not be empty".into(),
            ));
        }

        if self.store.region.is_empty() {
            return Err(ConfigError::ValidationError(
                "store.region must not be empty".into(),
            ));
        }

        if let Some(ref endpoint) = self.store.endpoint {
            if !is_valid_http_url(endpoint) {
                return Err(ConfigError::ValidationError(
                    "store.endpoint must start with http:// or https://".into(),
                ));
            }
        }

        if self.export.key.is_empty() {
            return Err(ConfigError::ValidationError(
                "export.key must not be empty".into(),
            ));
        }

        if self.export.part_size < MIN_PART_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "export.part_size {} is below the 5 MiB S3 part minimum",
                self.export.part_size
            )));
        }

        if self.export.batch_rows == 0 {
            return Err(ConfigError::ValidationError(
                "export.batch_rows must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

/// Object store backend configuration.
///
/// When `endpoint` is set the client switches to path-style addressing, which
/// is what LocalStack and MinIO expect. When `access_key`/`secret_key` are
/// omitted the default AWS credential provider chain is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub bucket: String,
    pub region: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
}

/// Output format for the exported table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Object key the export is written to
    #[serde(default = "default_key")]
    pub key: String,

    /// Output format: "csv" or "excel". Default: csv
    #[serde(default)]
    pub format: ExportFormat,

    /// Target size of each uploaded part in bytes. Default: 10 MiB
    #[serde(default = "default_part_size")]
    pub part_size: usize,

    /// Rows pulled from the source per serialization batch. Default: 2000
    #[serde(default = "default_batch_rows")]
    pub batch_rows: usize,

    /// Total number of synthetic rows to generate. Default: 200000
    #[serde(default = "default_row_limit")]
    pub row_limit: u64,

    /// Lifetime of the presigned download URL in seconds. Default: 18000 (5h)
    #[serde(default = "default_presign_expiry_secs")]
    pub presign_expiry_secs: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            format: ExportFormat::default(),
            part_size: default_part_size(),
            batch_rows: default_batch_rows(),
            row_limit: default_row_limit(),
            presign_expiry_secs: default_presign_expiry_secs(),
        }
    }
}

fn default_key() -> String {
    "export-multipart.csv".to_string()
}

fn default_part_size() -> usize {
    10485760 // 10 MiB
}

fn default_batch_rows() -> usize {
    2000
}

fn default_row_limit() -> u64 {
    200000
}

fn default_presign_expiry_secs() -> u64 {
    18000
}
