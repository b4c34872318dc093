//! Source resolution: turning a caller-supplied string into raw document bytes.
//!
//! A source is either literal XML text or a location to fetch. Fetching is delegated to
//! a [`Fetcher`]; [`HttpFetcher`] is the network implementation and [`CachedFetcher`]
//! adds an on-disk cache in front of any fetcher. The main entry point is
//! [`SourceResolver::resolve`].

mod cache;
mod http;

use crate::config::ResolvedConfig;
use crate::errors::{AppError, AppResult};
use tracing::{debug, info};
use url::Url;

// Re-export public API
pub use cache::{CachedFetcher, FileCache};
pub use http::HttpFetcher;

/// Retrieves the raw bytes stored at a location.
///
/// Implementations own transport concerns (timeouts, retries, caching) and report
/// every failure as [`AppError::Fetch`].
pub trait Fetcher {
    fn fetch(&self, url: &Url) -> AppResult<Vec<u8>>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &Url) -> AppResult<Vec<u8>> {
        (**self).fetch(url)
    }
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn fetch(&self, url: &Url) -> AppResult<Vec<u8>> {
        (**self).fetch(url)
    }
}

/// Builds the fetcher described by `config`: HTTP, wrapped in the file cache when
/// caching is enabled.
pub fn fetcher_from_config(config: &ResolvedConfig) -> AppResult<Box<dyn Fetcher>> {
    let http = HttpFetcher::new(config)?;
    if config.should_cache {
        let cache = FileCache::new(&config.cache_dir, config.cache_max_age())?;
        Ok(Box::new(CachedFetcher::new(http, cache)))
    } else {
        Ok(Box::new(http))
    }
}

/// Checks that `source` is an absolute URL with a scheme and a host.
///
/// # Errors
///
/// Returns `InvalidSource` when the string does not parse or has no host.
pub fn parse_location(source: &str) -> AppResult<Url> {
    let url = Url::parse(source.trim())
        .map_err(|e| AppError::InvalidSource(format!("'{source}' is not a valid URL: {e}")))?;
    if !url.has_host() {
        return Err(AppError::InvalidSource(format!(
            "'{source}' has no host"
        )));
    }
    Ok(url)
}

/// Resolves sources into raw bytes, fetching locations through its [`Fetcher`].
pub struct SourceResolver<F> {
    fetcher: F,
}

impl<F: Fetcher> SourceResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Returns the raw bytes for `source`.
    ///
    /// With `is_data_string` set, `source` is literal XML and its bytes are returned
    /// unchanged; no content sniffing happens. Otherwise `source` must be a URL and is
    /// fetched once, without retries at this level.
    ///
    /// # Errors
    ///
    /// - `InvalidSource` if a location is not a well-formed URL
    /// - `Fetch` if the fetcher fails
    pub fn resolve(&self, source: &str, is_data_string: bool) -> AppResult<Vec<u8>> {
        if is_data_string {
            debug!(bytes = source.len(), "Using literal XML source");
            return Ok(source.as_bytes().to_vec());
        }

        let url = parse_location(source)?;
        info!(url = %url, "Fetching sitemap");
        let data = self.fetcher.fetch(&url)?;
        debug!(url = %url, bytes = data.len(), "Fetched sitemap");
        Ok(data)
    }
}
