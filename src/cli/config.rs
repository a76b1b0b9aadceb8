//! Configuration file
//!
//! ```json
//! {
//!   "data_dir": "./inspectdb-data",
//!   "schema_dir": "./inspectdb-data/schemas",
//!   "high_rating_threshold": 4,
//!   "log_level": "info"
//! }
//! ```
//!
//! Only `data_dir` is required.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::observability::Severity;

use super::errors::{CliError, CliResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    /// Directory holding `<collection>.json` schema files (default `<data_dir>/schemas`)
    #[serde(default)]
    pub schema_dir: Option<String>,

    /// Exclusive lower bound for `query high-rated` without `--min` (default 4)
    #[serde(default = "default_high_rating_threshold")]
    pub high_rating_threshold: i32,

    /// Minimum log severity: trace, info, warn or error (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_high_rating_threshold() -> i32 {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if matches!(&self.schema_dir, Some(dir) if dir.trim().is_empty()) {
            return Err(CliError::config_error("schema_dir must not be empty"));
        }

        if !(0..=5).contains(&self.high_rating_threshold) {
            return Err(CliError::config_error(format!(
                "Invalid high_rating_threshold: {}. Must be between 0 and 5.",
                self.high_rating_threshold
            )));
        }

        self.min_severity()?;

        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn schema_path(&self) -> PathBuf {
        match &self.schema_dir {
            Some(dir) => PathBuf::from(dir),
            None => self.data_path().join("schemas"),
        }
    }

    pub fn min_severity(&self) -> CliResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of trace, info, warn, error.",
                self.log_level
            ))
        })
    }
}
