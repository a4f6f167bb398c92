// Asset Cache Store
//
// Named, versioned cache of pre-declared static assets. Priming is
// all-or-nothing: a single failed fetch fails the whole prime and
// nothing is committed. Bumping the cache name is the only way stale
// entries are ever invalidated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Cache name; bump the version suffix to invalidate every entry
pub const CACHE_NAME: &str = "yo-heladerias-v1";

/// Fixed, ordered asset list primed at install time
pub const PRECACHE_URLS: [&str; 5] = [
    "/",
    "/static/css/bootstrap.min.css",
    "/static/js/bootstrap.bundle.min.js",
    "/static/images/logo_yo_heladeria_blanco.png",
    "/offline.html",
];

/// A cached response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAsset {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl CachedAsset {
    pub fn new(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            body,
        }
    }
}

/// Cache errors
#[derive(Debug)]
pub enum CacheError {
    Fetch { url: String, reason: String },
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch { url, reason } => write!(f, "failed to fetch '{}': {}", url, reason),
        }
    }
}

impl std::error::Error for CacheError {}

/// URL-keyed static asset cache
#[derive(Debug)]
pub struct AssetCache {
    name: String,
    entries: HashMap<String, CachedAsset>,
}

impl AssetCache {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a cached response by URL path
    pub fn match_url(&self, url: &str) -> Option<&CachedAsset> {
        self.entries.get(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prime the cache from a fixed URL list, all-or-nothing.
    ///
    /// Every URL is fetched into a staging set first; only when all of
    /// them succeed is the staging set committed. On failure the live
    /// entries are left untouched and the error names the failing URL.
    pub fn prime_with<F>(&mut self, urls: &[&str], fetcher: F) -> Result<usize, CacheError>
    where
        F: Fn(&str) -> Result<CachedAsset, String>,
    {
        let mut staged: HashMap<String, CachedAsset> = HashMap::new();

        for url in urls {
            match fetcher(url) {
                Ok(asset) => {
                    staged.insert(url.to_string(), asset);
                }
                Err(reason) => {
                    return Err(CacheError::Fetch {
                        url: url.to_string(),
                        reason,
                    });
                }
            }
        }

        let count = staged.len();
        self.entries.extend(staged);
        Ok(count)
    }
}

// Type alias for the shared cache
pub type SharedCache = Arc<Mutex<AssetCache>>;

/// Create the shared cache handed to the dispatcher and the protocol handler
pub fn shared() -> SharedCache {
    Arc::new(Mutex::new(AssetCache::new(CACHE_NAME)))
}
