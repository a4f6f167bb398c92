// Cache Module - Static asset prime/serve
//
// This module primes a fixed asset list at install time and serves it
// through a custom protocol with network fallback

pub mod prime;
pub mod protocol;
pub mod store;

// Re-export public API
pub use store::{AssetCache, CachedAsset, SharedCache, CACHE_NAME, PRECACHE_URLS};
