//! Service configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) gives the stock
//! dashboard: four symbols, Yahoo Finance with a 5-second timeout, entropy
//! seeding, and the five standard performance targets.

use dashlab_core::data::{
    CircuitBreaker, CsvProvider, DataError, DataProvider, YahooProvider, YahooSettings,
};
use dashlab_core::domain::{default_targets, PerformanceTarget, DEFAULT_SYMBOLS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Upper limit for `provider.max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Symbols a Financial request may ask for.
    pub allowed_symbols: Vec<String>,

    /// Master seed for synthetic sales data. Absent = OS entropy.
    pub seed: Option<u64>,

    pub provider: ProviderConfig,

    pub performance_targets: Vec<PerformanceTarget>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            allowed_symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            seed: None,
            provider: ProviderConfig::default(),
            performance_targets: default_targets(),
        }
    }
}

impl ServiceConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_symbols.is_empty() {
            return Err(ConfigError::Invalid("allowed_symbols is empty".into()));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider.timeout_secs must be > 0".into()));
        }
        if self.provider.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "provider.max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
                self.provider.max_retries
            )));
        }
        if let Some(t) = self
            .performance_targets
            .iter()
            .find(|t| !t.current_value.is_finite() || !t.target_value.is_finite())
        {
            return Err(ConfigError::Invalid(format!(
                "performance target '{}' has a non-finite value",
                t.metric_name
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Yahoo,
    Csv,
}

/// Which market-data provider backs Financial mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Budget for one fetch, retries included; running out is treated as no data.
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Directory of `<SYMBOL>.csv` files (csv provider only).
    pub dir: PathBuf,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            timeout_secs: 5,
            max_retries: 2,
            dir: PathBuf::from("data"),
        }
    }
}

impl ProviderConfig {
    pub fn build(&self) -> Result<Box<dyn DataProvider>, DataError> {
        match self.kind {
            ProviderKind::Yahoo => {
                let settings = YahooSettings {
                    timeout: Duration::from_secs(self.timeout_secs),
                    max_retries: self.max_retries,
                    ..YahooSettings::default()
                };
                let breaker = Arc::new(CircuitBreaker::default_provider());
                Ok(Box::new(YahooProvider::new(breaker, settings)?))
            }
            ProviderKind::Csv => Ok(Box::new(CsvProvider::new(&self.dir))),
        }
    }
}
