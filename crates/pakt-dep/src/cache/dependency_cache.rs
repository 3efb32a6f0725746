use std::fs::File;
use std::io::{Seek, SeekFrom};

use tempfile::NamedTempFile;

use super::{CacheConfig, CacheTier};
use crate::digest::HashingWriter;
use crate::http::HttpClient;
use crate::{Dependency, PaktError, Result};

/// Fetches dependency artifacts through the permanent and ephemeral tiers,
/// falling back to the origin
pub struct DependencyCache {
    config: CacheConfig,
    client: HttpClient,
}

impl DependencyCache {
    pub fn new(config: CacheConfig) -> Result<Self> {
        let client = HttpClient::with_config(config.http.clone())?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: CacheConfig, client: HttpClient) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Tiers in lookup order
    pub fn tiers(&self) -> [CacheTier; 2] {
        [
            CacheTier::permanent(&self.config.cache_path),
            CacheTier::ephemeral(&self.config.download_path),
        ]
    }

    /// Return the artifact for `dependency`, positioned at the start
    ///
    /// Without a digest the artifact is downloaded into an anonymous
    /// temporary file on every call and never cached.
    pub fn artifact(&self, dependency: &Dependency) -> Result<File> {
        dependency.validate()?;

        let sha256 = match &dependency.sha256 {
            Some(sha256) => sha256,
            None => {
                log::warn!(
                    "Dependency {} has no SHA256, downloading without verification",
                    dependency
                );
                return self.download_unverified(dependency);
            }
        };

        for tier in self.tiers() {
            if let Some(path) = tier.lookup(dependency, sha256)? {
                log::info!(
                    "Reusing {} download of {} from {}",
                    tier.name(),
                    dependency,
                    path.display()
                );
                return Ok(File::open(path)?);
            }
        }

        self.download_verified(dependency, sha256)
    }

    fn download_unverified(&self, dependency: &Dependency) -> Result<File> {
        log::info!("Downloading {} from {}", dependency, dependency.uri);

        std::fs::create_dir_all(&self.config.download_path)?;
        let mut file = tempfile::tempfile_in(&self.config.download_path)?;
        self.client.download(&dependency.uri, &mut file)?;
        file.seek(SeekFrom::Start(0))?;

        Ok(file)
    }

    fn download_verified(&self, dependency: &Dependency, sha256: &str) -> Result<File> {
        log::info!("Downloading {} from {}", dependency, dependency.uri);

        let tier = CacheTier::ephemeral(&self.config.download_path);
        let staging = self.config.download_path.join(sha256);
        std::fs::create_dir_all(&staging)?;

        let mut artifact = NamedTempFile::new_in(&staging)?;
        let mut writer = HashingWriter::new(artifact.as_file_mut());
        let size = self.client.download(&dependency.uri, &mut writer)?;
        let (_, actual) = writer.finish()?;

        log::debug!("Verifying checksum of {} ({} bytes)", dependency.uri, size);

        if actual != sha256 {
            return Err(PaktError::IntegrityMismatch {
                uri: dependency.uri.clone(),
                expected: sha256.to_string(),
                actual,
            });
        }

        artifact.as_file().sync_all()?;
        let mut file = tier.store(dependency, sha256, artifact)?;
        file.seek(SeekFrom::Start(0))?;

        Ok(file)
    }
}
