//! Configuration for a rebinding run.
//!
//! Defaults can be layered under an optional config file and `RELINK_*`
//! environment variable overrides.

use crate::error::RelinkError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelinkConfig {
    /// Display name of the source library whose variables form the catalog.
    #[serde(default)]
    pub source_library: String,

    /// Maximum concurrently in-flight node tasks.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Submission chunk size; affects submission locality and logging only.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Total attempts for rate-limited host calls.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// First retry delay in milliseconds; doubles on each further attempt.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_max_concurrency() -> usize {
    5
}

fn default_chunk_size() -> usize {
    50
}

fn default_max_attempts() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

impl Default for RelinkConfig {
    fn default() -> Self {
        Self {
            source_library: String::new(),
            max_concurrency: default_max_concurrency(),
            chunk_size: default_chunk_size(),
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RelinkConfig {
    /// Load configuration: defaults, then an optional file, then `RELINK_*`
    /// environment overrides (e.g. `RELINK_MAX_CONCURRENCY=10`).
    pub fn load(path: Option<&Path>) -> Result<Self, RelinkError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("RELINK")
                .separator("__")
                .try_parsing(true),
        );
        let loaded: Self = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), RelinkError> {
        if self.source_library.is_empty() {
            return Err(RelinkError::Config(
                "source_library cannot be empty".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(RelinkError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(RelinkError::Config(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(RelinkError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}
