use super::Fetcher;
use crate::config::ResolvedConfig;
use crate::errors::{AppError, AppResult};
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, warn};
use url::Url;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RetryConfig {
    max_retries: u32,
    initial_delay_ms: u64,
    max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 10000,
        }
    }
}

impl From<&ResolvedConfig> for RetryConfig {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay_ms: config.retry_initial_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }
}

/// Calculates exponential backoff delay in milliseconds.
///
/// Formula: `min(initial_delay * 2^attempt, max_delay)`
fn calculate_backoff(attempt: u32, config: &RetryConfig) -> u64 {
    let delay = config
        .initial_delay_ms
        .saturating_mul(2_u64.saturating_pow(attempt));
    delay.min(config.max_delay_ms)
}

/// Blocking on the private runtime is not allowed from a thread that already drives
/// an async runtime.
fn ensure_outside_runtime() -> AppResult<()> {
    if Handle::try_current().is_ok() {
        return Err(AppError::Fetch(
            "Blocking HTTP fetch called from inside an async runtime".into(),
        ));
    }
    Ok(())
}

/// Fetches documents over HTTP(S).
///
/// Requests run on a private current-thread tokio runtime, so [`Fetcher::fetch`] blocks
/// the caller until the body is read or the attempt budget is spent. Redirects are
/// followed; non-success statuses are errors.
///
/// Creating or using a fetcher on a thread that is already running a tokio runtime
/// returns a `Fetch` error instead of panicking.
pub struct HttpFetcher {
    client: reqwest::Client,
    runtime: Runtime,
    retry: RetryConfig,
}

impl HttpFetcher {
    pub fn new(config: &ResolvedConfig) -> AppResult<Self> {
        ensure_outside_runtime()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AppError::Io(format!("Failed to start HTTP runtime: {e}")))?;

        Ok(Self {
            client,
            runtime,
            retry: RetryConfig::from(config),
        })
    }

    async fn fetch_once(&self, url: &Url) -> AppResult<Vec<u8>> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await?
            .error_for_status()?;
        debug!(url = %url, status = response.status().as_u16(), "Received response");
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }

    async fn fetch_with_retry(&self, url: &Url) -> AppResult<Vec<u8>> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.retry.max_retries && e.is_retryable() => {
                    let delay_ms = calculate_backoff(attempt, &self.retry);
                    warn!(
                        url = %url,
                        attempt = attempt + 1,
                        max_attempts = self.retry.max_retries + 1,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying fetch after error"
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> AppResult<Vec<u8>> {
        ensure_outside_runtime()?;
        self.runtime.block_on(self.fetch_with_retry(url))
    }
}
