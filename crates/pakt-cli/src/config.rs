use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use pakt_dep::{CacheConfig, HttpClientConfig};

pub const CONFIG_FILE: &str = "pakt.toml";
pub const DEFAULT_CATALOG: &str = "buildpack.toml";

/// The pakt configuration file structure (pakt.toml)
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaktConfig {
    /// Where the dependency catalog lives
    pub catalog: CatalogConfig,

    /// Resolver settings
    pub resolver: ResolverConfig,

    /// Cache tiers and download settings
    pub cache: CacheSection,

    /// Directory holding the loaded file; relative paths resolve against it
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// TOML file carrying a [metadata] table
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Stack id dependencies must support
    pub stack: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CacheSection {
    /// Read-only tier shipped alongside the buildpack
    pub permanent: Option<PathBuf>,

    /// Writable download tier
    pub ephemeral: Option<PathBuf>,

    pub user_agent: Option<String>,

    pub proxy: Option<String>,
}

impl PaktConfig {
    /// Load configuration from pakt.toml, searching upward from the given directory
    pub fn load(start_dir: &Path) -> Result<Option<Self>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE);

            if config_path.is_file() {
                return Self::load_file(&config_path).map(Some);
            }

            if !current.pop() {
                return Ok(None);
            }
        }
    }

    /// Load a specific configuration file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: PaktConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `--config` when given, otherwise the nearest pakt.toml, otherwise defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self::load(&cwd)?.unwrap_or_default())
    }

    /// Catalog path: flag, then config file, then buildpack.toml in the working directory
    pub fn catalog_path(&self, flag: Option<&Path>) -> PathBuf {
        match (flag, &self.catalog.path) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(path)) => self.relative_to_file(path),
            (None, None) => PathBuf::from(DEFAULT_CATALOG),
        }
    }

    /// Stack id: flag, then `PAKT_STACK_ID`, then config file
    pub fn stack<F>(&self, flag: Option<&str>, env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        flag.map(str::to_string)
            .or_else(|| env("PAKT_STACK_ID"))
            .or_else(|| self.resolver.stack.clone())
    }

    /// Build the cache configuration, with proxy variables taking precedence over the file
    pub fn cache_config<F>(&self, env: F) -> CacheConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut http = HttpClientConfig::new();
        if let Some(user_agent) = &self.cache.user_agent {
            http = http.with_user_agent(user_agent.clone());
        }

        let proxy = env("HTTPS_PROXY")
            .or_else(|| env("HTTP_PROXY"))
            .or_else(|| self.cache.proxy.clone());
        if let Some(proxy) = proxy {
            http = http.with_proxy(proxy);
        }

        let mut config = CacheConfig::new().with_http(http);
        if let Some(permanent) = &self.cache.permanent {
            config = config.with_cache_path(self.relative_to_file(permanent));
        }
        if let Some(ephemeral) = &self.cache.ephemeral {
            config = config.with_download_path(self.relative_to_file(ephemeral));
        }
        config
    }

    fn relative_to_file(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Read an environment variable, treating empty values as unset
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
