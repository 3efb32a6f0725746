use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{Dependency, PaktError, Result};

/// One on-disk cache tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheTier {
    name: &'static str,
    root: PathBuf,
}

impl CacheTier {
    /// The read-only tier shipped with the catalog
    pub fn permanent(root: impl Into<PathBuf>) -> Self {
        Self {
            name: "permanent",
            root: root.into(),
        }
    }

    /// The tier downloads are written to
    pub fn ephemeral(root: impl Into<PathBuf>) -> Self {
        Self {
            name: "ephemeral",
            root: root.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sidecar_path(&self, sha256: &str) -> PathBuf {
        self.root.join(format!("{}.toml", sha256))
    }

    pub fn artifact_path(&self, sha256: &str, file_name: &str) -> PathBuf {
        self.root.join(sha256).join(file_name)
    }

    /// Find the artifact recorded for `dependency`
    ///
    /// A missing sidecar, or one recording a different descriptor, is a miss.
    /// A sidecar that cannot be decoded is an error.
    pub fn lookup(&self, dependency: &Dependency, sha256: &str) -> Result<Option<PathBuf>> {
        let sidecar = self.sidecar_path(sha256);

        let content = match std::fs::read_to_string(&sidecar) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::trace!("No {} cache entry at {}", self.name, sidecar.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let recorded: Dependency = toml::from_str(&content)?;
        if recorded != *dependency {
            log::debug!(
                "Ignoring {} cache entry {}: descriptor differs",
                self.name,
                sidecar.display()
            );
            return Ok(None);
        }

        Ok(Some(self.artifact_path(sha256, &dependency.artifact_name())))
    }

    /// Move a verified download into place and record its descriptor
    ///
    /// Both files are renamed into place, the artifact first, so a visible
    /// sidecar always refers to a complete artifact.
    pub fn store(
        &self,
        dependency: &Dependency,
        sha256: &str,
        artifact: NamedTempFile,
    ) -> Result<File> {
        let artifact_path = self.artifact_path(sha256, &dependency.artifact_name());
        if let Some(parent) = artifact_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = artifact
            .persist(&artifact_path)
            .map_err(|e| PaktError::Io(e.error))?;

        let encoded = toml::to_string(dependency)?;
        let mut sidecar = NamedTempFile::new_in(&self.root)?;
        sidecar.write_all(encoded.as_bytes())?;
        sidecar.as_file().sync_all()?;
        sidecar
            .persist(self.sidecar_path(sha256))
            .map_err(|e| PaktError::Io(e.error))?;

        log::debug!("Stored {} in {} cache", dependency, self.name);

        Ok(file)
    }
}
