use crate::search::{MAX_K_CAP, MIN_K};
use log::{LevelFilter, trace};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for the cluster-count search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Upper bound on the number of clusters tried, at most 10; the
    /// effective bound is also limited by the number of rows.
    pub max_k_cap: usize,
    /// Seedings per candidate; values below 10 are raised to 10.
    pub n_init: usize,
    pub random_state: u64,
    pub max_iter: usize,
    pub tolerance: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_k_cap: 10,
            n_init: 10,
            random_state: 42,
            max_iter: 300,
            tolerance: 1e-4,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_K..=MAX_K_CAP).contains(&self.max_k_cap) {
            return Err(ConfigError::Invalid(format!(
                "max_k_cap must be in {}..={}, got {}",
                MIN_K, MAX_K_CAP, self.max_k_cap
            )));
        }
        if self.n_init == 0 {
            return Err(ConfigError::Invalid("n_init must be > 0".to_string()));
        }
        if self.max_iter == 0 {
            return Err(ConfigError::Invalid("max_iter must be > 0".to_string()));
        }
        if !(self.tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// The single artifact slot.
    pub artifact_path: PathBuf,
    pub search: SearchConfig,
    /// One of off, error, warn, info, debug, trace.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("server_model.json"),
            search: SearchConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        trace!("Loading configuration from: {:?}", path.as_ref());

        let content = fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()?;
        if self.artifact_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("artifact_path must not be empty".to_string()));
        }
        self.get_log_level()?;
        Ok(())
    }

    pub fn get_log_level(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.max_k_cap, 10);
        assert_eq!(config.search.random_state, 42);
        assert_eq!(config.get_log_level().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"artifact_path": "model.json", "search": {{"max_k_cap": 5}}}}"#).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.artifact_path, PathBuf::from("model.json"));
        assert_eq!(config.search.max_k_cap, 5);
        assert_eq!(config.search.n_init, 10);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.search.max_k_cap = 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.search.max_k_cap = 15;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.search.tolerance = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            AppConfig::from_file("/nonexistent/autocluster.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
