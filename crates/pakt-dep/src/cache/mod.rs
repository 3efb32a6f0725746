//! Tiered, checksum-verified artifact cache.
//!
//! Each tier stores a verified artifact at `<tier>/<sha256>/<file name>`
//! next to a sidecar `<tier>/<sha256>.toml` holding the descriptor it was
//! downloaded for. A tier only serves an artifact when the sidecar equals
//! the requested descriptor.

mod config;
mod dependency_cache;
mod tier;

pub use config::{CacheConfig, DEFAULT_CACHE_PATH};
pub use dependency_cache::DependencyCache;
pub use tier::CacheTier;
