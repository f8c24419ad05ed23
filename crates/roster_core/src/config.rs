//! Store and logging configuration.
//!
//! # Responsibility
//! - Describe where the store lives and how the process logs.
//! - Load settings from TOML and overlay `ROSTER_*` environment variables.
//!
//! # Invariants
//! - Missing keys fall back to defaults; unknown keys are rejected.
//! - A config without `db_path` describes a throwaway in-memory store.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "ROSTER_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "ROSTER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ROSTER_LOG_DIR";
pub const ENV_BUSY_TIMEOUT_MS: &str = "ROSTER_BUSY_TIMEOUT_MS";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RosterConfig {
    /// SQLite file; `None` opens an in-memory store.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<String>,
    pub busy_timeout_ms: u64,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl RosterConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(ConfigError::Parse)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `ROSTER_*` overrides resolved through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let resolve = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = resolve(ENV_DB_PATH) {
            self.db_path = Some(PathBuf::from(value));
        }
        if let Some(value) = resolve(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = resolve(ENV_LOG_DIR) {
            self.log_dir = Some(value);
        }
        if let Some(value) = resolve(ENV_BUSY_TIMEOUT_MS) {
            self.busy_timeout_ms = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_BUSY_TIMEOUT_MS,
                value: value.clone(),
            })?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, RosterConfig, ENV_BUSY_TIMEOUT_MS, ENV_DB_PATH, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = RosterConfig::from_toml_str("").unwrap();
        assert_eq!(config, RosterConfig::default());
        assert_eq!(config.busy_timeout_ms, 5_000);
        assert!(config.db_path.is_none());
    }

    #[test]
    fn toml_sets_known_keys_and_rejects_unknown_ones() {
        let config = RosterConfig::from_toml_str(
            "db_path = \"/tmp/roster.db\"\nlog_level = \"warn\"\nbusy_timeout_ms = 250\n",
        )
        .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/roster.db")));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.busy_timeout_ms, 250);

        let err = RosterConfig::from_toml_str("dbpath = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_win_over_file_values_and_skip_blanks() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_DB_PATH, "/data/roster.db"),
            (ENV_LOG_LEVEL, "  "),
            (ENV_BUSY_TIMEOUT_MS, "1200"),
        ]);
        let config = RosterConfig::from_toml_str("log_level = \"error\"")
            .unwrap()
            .with_overrides(|key| env.get(key).map(|value| value.to_string()))
            .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/data/roster.db")));
        assert_eq!(config.log_level, "error");
        assert_eq!(config.busy_timeout_ms, 1200);
    }

    #[test]
    fn invalid_timeout_override_is_rejected() {
        let err = RosterConfig::default()
            .with_overrides(|key| (key == ENV_BUSY_TIMEOUT_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: ENV_BUSY_TIMEOUT_MS,
                ..
            }
        ));
    }
}
