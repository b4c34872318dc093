use super::Fetcher;
use crate::errors::{AppError, AppResult};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use url::Url;

/// On-disk response cache, one file per URL named after the URL's SHA-256.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    max_age: Option<Duration>,
}

impl FileCache {
    /// Opens (and creates if needed) a cache in `dir`.
    ///
    /// Entries older than `max_age` are treated as missing; `None` keeps them forever.
    pub fn new(dir: &Path, max_age: Option<Duration>) -> AppResult<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Io(format!(
                "Failed to create cache directory {}: {e}",
                dir.display()
            ))
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            max_age,
        })
    }

    /// Path of the cache file for `url`.
    pub fn entry_path(&self, url: &Url) -> PathBuf {
        let digest = Sha256::digest(url.as_str().as_bytes());
        self.dir.join(format!("{digest:x}.xml"))
    }

    /// Returns the cached body for `url` if present and fresh.
    pub fn get(&self, url: &Url) -> Option<Vec<u8>> {
        let path = self.entry_path(url);
        let metadata = fs::metadata(&path).ok()?;

        if let Some(max_age) = self.max_age {
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| modified.elapsed().ok());
            match age {
                Some(age) if age <= max_age => {}
                _ => {
                    debug!(url = %url, "Cached entry is stale");
                    return None;
                }
            }
        }

        match fs::read(&path) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read cached entry");
                None
            }
        }
    }

    /// Stores `data` for `url`, replacing any previous entry atomically.
    pub fn put(&self, url: &Url, data: &[u8]) -> AppResult<()> {
        let path = self.entry_path(url);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(data)?;
        tmp.persist(&path).map_err(|e| {
            AppError::Io(format!(
                "Failed to store cache entry {}: {}",
                path.display(),
                e.error
            ))
        })?;
        Ok(())
    }
}

/// Serves fetches from a [`FileCache`] and stores fresh responses in it.
///
/// Cache failures are logged and never fail the fetch itself.
pub struct CachedFetcher<F> {
    inner: F,
    cache: FileCache,
}

impl<F: Fetcher> CachedFetcher<F> {
    pub fn new(inner: F, cache: FileCache) -> Self {
        Self { inner, cache }
    }
}

impl<F: Fetcher> Fetcher for CachedFetcher<F> {
    fn fetch(&self, url: &Url) -> AppResult<Vec<u8>> {
        if let Some(data) = self.cache.get(url) {
            info!(url = %url, "Retrieved from cache");
            return Ok(data);
        }

        let data = self.inner.fetch(url)?;
        if let Err(e) = self.cache.put(url, &data) {
            warn!(url = %url, error = %e, "Failed to cache response");
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct CountingFetcher {
        calls: Cell<usize>,
    }

    impl Fetcher for CountingFetcher {
        fn fetch(&self, _url: &Url) -> AppResult<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            Ok(format!("<urlset n=\"{}\"/>", self.calls.get()).into_bytes())
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_put_then_get() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path(), None).unwrap();
        let u = url("https://example.com/sitemap.xml");

        assert_eq!(cache.get(&u), None);
        cache.put(&u, b"<urlset/>").unwrap();
        assert_eq!(cache.get(&u), Some(b"<urlset/>".to_vec()));
    }

    #[test]
    fn test_entry_paths_differ_per_url() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path(), None).unwrap();
        let a = cache.entry_path(&url("https://example.com/a.xml"));
        let b = cache.entry_path(&url("https://example.com/b.xml"));
        assert_ne!(a, b);
        assert!(a.starts_with(dir.path()));
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested/cache");
        let cache = FileCache::new(&nested, None).unwrap();
        assert!(nested.is_dir());
        assert!(cache.entry_path(&url("https://example.com/")).starts_with(&nested));
    }

    #[test]
    fn test_expired_entry_is_ignored() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path(), Some(Duration::ZERO)).unwrap();
        let u = url("https://example.com/sitemap.xml");
        cache.put(&u, b"<urlset/>").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&u), None);
    }

    #[test]
    fn test_cached_fetcher_fetches_once() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path(), None).unwrap();
        let fetcher = CachedFetcher::new(CountingFetcher { calls: Cell::new(0) }, cache);
        let u = url("https://example.com/sitemap.xml");

        let first = fetcher.fetch(&u).unwrap();
        let second = fetcher.fetch(&u).unwrap();
        assert_eq!(first, second);
        assert_eq!(fetcher.inner.calls.get(), 1);
    }
}
