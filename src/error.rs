//! Error types for the rebinding engine.

use thiserror::Error;

/// Failures surfaced by host calls and run orchestration.
///
/// Only `RateLimited` is transient and worth retrying; everything else is
/// either a skip condition (`NotFound`, `CapabilityUnavailable`) or a
/// node-scoped failure that gets logged and contained.
#[derive(Debug, Clone, Error)]
pub enum RelinkError {
    #[error("rate limited by host: {0}")]
    RateLimited(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("host capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("host call failed: {0}")]
    Host(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl RelinkError {
    /// Whether this failure is the transient rate-limit signal.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RelinkError::RateLimited(_))
    }
}

impl From<config::ConfigError> for RelinkError {
    fn from(err: config::ConfigError) -> Self {
        RelinkError::Config(err.to_string())
    }
}
