//! TOML-based configuration for tablesample.
//!
//! Supports a config file (tablesample.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [sampler]
//! sample_limit = 50
//! seed = 42
//!
//! [tables.orders]
//! paths = ["${DATA_DIR}/orders/part-0.jsonl", "${DATA_DIR}/orders/part-1.jsonl"]
//!
//! [tables.orders.sample]
//! profile_sample_type = "ROW_COUNT"
//! profile_sample = 1000
//!
//! [tables.orders.sample.partition_details]
//! column = "region"
//! interval_type = "COLUMN-VALUE"
//! values = ["emea", "apac"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::sample::SampleConfig;

/// Default number of sample rows handed to the profiler.
pub const DEFAULT_SAMPLE_LIMIT: usize = 50;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Sampler-wide settings.
    pub sampler: SamplerSettings,

    /// Named tables backed by local files.
    pub tables: HashMap<String, TableSettings>,
}

/// Sampler-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplerSettings {
    /// Hard upper bound on returned sample rows.
    pub sample_limit: usize,

    /// Seed for reproducible sampling. Uses OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            seed: None,
        }
    }
}

/// A table backed by one or more local files.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableSettings {
    /// One file per frame (supports ${ENV_VAR} expansion).
    pub paths: Vec<String>,

    /// Service type used to pick a sampler (see `service_spec`).
    #[serde(default = "default_service_type")]
    pub service_type: String,

    /// Sampling configuration for this table.
    #[serde(default)]
    pub sample: SampleConfig,
}

fn default_service_type() -> String {
    "datalake".to_string()
}

impl TableSettings {
    /// Get the file paths with environment variables expanded.
    pub fn resolved_paths(&self) -> Result<Vec<PathBuf>, SettingsError> {
        self.paths
            .iter()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .collect()
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `TABLESAMPLE_CONFIG`
    /// 2. `./tablesample.toml`
    /// 3. `~/.config/tablesample/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("TABLESAMPLE_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("tablesample.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tablesample").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Result<&TableSettings, SettingsError> {
        self.tables
            .get(name)
            .ok_or_else(|| SettingsError::TableNotFound(name.to_string()))
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.sampler.sample_limit == 0 {
            return Err(SettingsError::InvalidConfig(
                "sampler.sample_limit must be greater than zero".to_string(),
            ));
        }
        if let Some((name, _)) = self.tables.iter().find(|(_, t)| t.paths.is_empty()) {
            return Err(SettingsError::InvalidConfig(format!(
                "table '{}' has no paths",
                name
            )));
        }
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let braced = chars.next_if_eq(&'{').is_some();
        let mut var_name = String::new();
        if braced {
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            // $VAR ends at the first non-alphanumeric/underscore
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
        }

        if var_name.is_empty() && !braced {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
