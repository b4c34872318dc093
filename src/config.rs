use crate::constants::*;
use crate::errors::{AppError, AppResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved fetch and cache configuration with all values filled in (no Options).
///
/// Passed explicitly into the source layer; there is no process-wide cache setting.
/// Every field has a default, so a TOML file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolvedConfig {
    /// Whether fetched documents are stored in and served from `cache_dir`
    pub should_cache: bool,
    /// Directory holding cached responses
    pub cache_dir: PathBuf,
    /// Age in seconds after which a cached response is refetched (0 = never expires)
    pub cache_max_age_secs: u64,
    /// Total request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,

    // Retries
    /// Maximum number of retry attempts for failed fetches
    pub max_retries: u32,
    /// Initial delay in milliseconds before the first retry
    pub retry_initial_delay_ms: u64,
    /// Maximum delay in milliseconds between retries
    pub retry_max_delay_ms: u64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            should_cache: true,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            cache_max_age_secs: DEFAULT_CACHE_MAX_AGE_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: 3,
            retry_initial_delay_ms: 1000,
            retry_max_delay_ms: 10000,
        }
    }
}

impl ResolvedConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// Missing keys fall back to [`ResolvedConfig::default`]. Unknown keys are rejected
    /// so typos are not silently ignored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the TOML is malformed, unknown keys are present,
    /// `timeout_secs` is 0, or `retry_initial_delay_ms` exceeds `retry_max_delay_ms`.
    /// Returns `Io` if the file cannot be read.
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> AppResult<Self> {
        let config: ResolvedConfig = toml::from_str(contents)
            .map_err(|e| AppError::InvalidInput(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.timeout_secs == 0 {
            return Err(AppError::InvalidInput(
                "Timeout must be greater than 0".into(),
            ));
        }
        if self.retry_initial_delay_ms > self.retry_max_delay_ms {
            return Err(AppError::InvalidInput(
                "Initial retry delay must not exceed the maximum retry delay".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Cache expiry, `None` when cached responses never expire.
    pub fn cache_max_age(&self) -> Option<Duration> {
        (self.cache_max_age_secs > 0).then(|| Duration::from_secs(self.cache_max_age_secs))
    }
}
