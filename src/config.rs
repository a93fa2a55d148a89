//! Configuration file
//!
//! ```json
//! {
//!   "data_dir": "./data",
//!   "log_filter": "info",
//!   "log_json": false,
//!   "min_alert_mentions": 3,
//!   "min_alert_risk": "medium"
//! }
//! ```
//!
//! Only `data_dir` is required.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::priority::{AlertPolicy, RiskLevel, MIN_ALERT_MENTIONS, MIN_ALERT_RISK};

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "./neurochain.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the store file (required)
    pub data_dir: PathBuf,

    /// `tracing` filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit log lines as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Mentions at which a scored post puts its incident under monitoring
    #[serde(default = "default_min_alert_mentions")]
    pub min_alert_mentions: i64,

    /// Minimum risk for an alert
    #[serde(default = "default_min_alert_risk")]
    pub min_alert_risk: RiskLevel,
}

fn default_log_filter() -> String {
    "info".to_string()
}
fn default_min_alert_mentions() -> i64 {
    MIN_ALERT_MENTIONS
}
fn default_min_alert_risk() -> RiskLevel {
    MIN_ALERT_RISK
}

impl Config {
    /// Defaults for everything but the data directory.
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_filter: default_log_filter(),
            log_json: false,
            min_alert_mentions: default_min_alert_mentions(),
            min_alert_risk: default_min_alert_risk(),
        }
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".into()));
        }
        if self.min_alert_mentions <= 0 {
            return Err(ConfigError::Invalid(format!(
                "min_alert_mentions must be > 0, got {}",
                self.min_alert_mentions
            )));
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter must not be empty".into()));
        }
        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        &self.data_dir
    }

    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy {
            min_risk: self.min_alert_risk,
            min_mentions: self.min_alert_mentions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::from_json(r#"{"data_dir": "/var/lib/nc"}"#).unwrap();
        assert_eq!(config, Config::for_data_dir("/var/lib/nc"));
        assert_eq!(config.alert_policy(), AlertPolicy::default());
        assert_eq!(config.log_filter, "info");
        assert!(!config.log_json);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_json(
            r#"{"data_dir": "d", "min_alert_mentions": 10, "min_alert_risk": "high", "log_json": true}"#,
        )
        .unwrap();
        assert_eq!(config.alert_policy().min_mentions, 10);
        assert_eq!(config.alert_policy().min_risk, RiskLevel::High);
        assert!(config.log_json);
    }

    #[test]
    fn test_missing_data_dir() {
        assert!(matches!(
            Config::from_json("{}"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_zero_mentions() {
        assert!(matches!(
            Config::from_json(r#"{"data_dir": "d", "min_alert_mentions": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_risk_literal() {
        assert!(Config::from_json(r#"{"data_dir": "d", "min_alert_risk": "Medium"}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("neurochain.json");
        fs::write(&path, r#"{"data_dir": "data"}"#).unwrap();
        assert_eq!(Config::load(&path).unwrap().data_dir, PathBuf::from("data"));

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            Config::load(&missing),
            Err(ConfigError::Read { .. })
        ));
    }
}
