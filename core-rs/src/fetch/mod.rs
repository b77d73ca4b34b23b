/**
 * fetch module
 * Ontology source URL → local file in the cache directory
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{KnError, Result};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

pub trait OntologyFetcher {
    /// Local path of the source, downloading it if needed
    fn fetch(&self, url: &str) -> Result<PathBuf>;
}

/// File name for a source URL: its last path segment
pub fn cache_file_name(url: &str) -> Result<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && !name.contains(':'))
        .map(str::to_string)
        .ok_or_else(|| KnError::Fetch(format!("Cannot derive a file name from '{}'", url)))
}

/// Downloads into a cache directory, reusing files already present
pub struct CachedFetcher {
    cache_dir: PathBuf,
}

impl CachedFetcher {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cached_path(&self, url: &str) -> Result<PathBuf> {
        Ok(self.cache_dir.join(cache_file_name(url)?))
    }

    fn download(&self, url: &str, path: &Path) -> Result<()> {
        info!("[CachedFetcher] Downloading {}", url);
        let client = reqwest::blocking::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()?;
        let response = client.get(url).send()?;
        if !response.status().is_success() {
            return Err(KnError::Fetch(format!("{} returned {}", url, response.status())));
        }
        let bytes = response.bytes()?;

        // Only complete downloads appear under the cached name
        let partial = path.with_extension("part");
        fs::write(&partial, &bytes)?;
        fs::rename(&partial, path)?;
        info!("[CachedFetcher] Saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

impl OntologyFetcher for CachedFetcher {
    /// Local paths and `file://` URLs are used in place
    fn fetch(&self, url: &str) -> Result<PathBuf> {
        if url.starts_with("file://") || !url.contains("://") {
            return LocalFetcher.fetch(url);
        }

        let path = self.cached_path(url)?;
        if path.exists() {
            debug!("[CachedFetcher] Using cached {}", path.display());
            return Ok(path);
        }
        fs::create_dir_all(&self.cache_dir)?;
        self.download(url, &path)?;
        Ok(path)
    }
}

/// Treats every source as an existing local path
pub struct LocalFetcher;

impl OntologyFetcher for LocalFetcher {
    fn fetch(&self, url: &str) -> Result<PathBuf> {
        let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
        if !path.exists() {
            return Err(KnError::FileNotFound(path.display().to_string()));
        }
        Ok(path)
    }
}
