use std::path::PathBuf;

use crate::http::HttpClientConfig;

/// Default location of the read-only permanent tier
pub const DEFAULT_CACHE_PATH: &str = "dependencies";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Permanent tier, shipped alongside the catalog and never written to
    pub cache_path: PathBuf,
    /// Ephemeral tier and scratch space for downloads
    pub download_path: PathBuf,
    pub http: HttpClientConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            download_path: std::env::temp_dir(),
            http: HttpClientConfig::default(),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_path(mut self, cache_path: PathBuf) -> Self {
        self.cache_path = cache_path;
        self
    }

    pub fn with_download_path(mut self, download_path: PathBuf) -> Self {
        self.download_path = download_path;
        self
    }

    pub fn with_http(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.cache_path, PathBuf::from("dependencies"));
        assert_eq!(config.download_path, std::env::temp_dir());
        assert_eq!(config.http, HttpClientConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = CacheConfig::new()
            .with_cache_path(PathBuf::from("/opt/deps"))
            .with_download_path(PathBuf::from("/var/tmp/pakt"))
            .with_http(HttpClientConfig::new().with_user_agent("agent".to_string()));

        assert_eq!(config.cache_path, PathBuf::from("/opt/deps"));
        assert_eq!(config.download_path, PathBuf::from("/var/tmp/pakt"));
        assert_eq!(config.http.user_agent, "agent");
    }
}
