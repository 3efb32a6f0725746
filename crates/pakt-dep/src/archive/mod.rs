//! Archive extraction (tar, tar.gz, tar.xz, tar.bz2, zip) and tar creation.

mod create;
mod extract;

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use crate::{PaktError, Result};

pub use create::{create_tar, create_tar_from_files, create_tar_gz, create_tar_gz_from_files};
pub use extract::{extract_tar, extract_tar_bz2, extract_tar_gz, extract_tar_xz, extract_zip};

/// Supported archive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    Tar,
    TarGz,
    TarXz,
    TarBz2,
    Zip,
}

impl ArchiveType {
    /// Detect archive type from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let path_str = path.to_string_lossy().to_lowercase();

        if path_str.ends_with(".zip") || path_str.ends_with(".jar") {
            Some(ArchiveType::Zip)
        } else if path_str.ends_with(".tar.gz") || path_str.ends_with(".tgz") {
            Some(ArchiveType::TarGz)
        } else if path_str.ends_with(".tar.bz2") || path_str.ends_with(".tbz2") {
            Some(ArchiveType::TarBz2)
        } else if path_str.ends_with(".tar.xz") || path_str.ends_with(".txz") {
            Some(ArchiveType::TarXz)
        } else if path_str.ends_with(".tar") {
            Some(ArchiveType::Tar)
        } else {
            None
        }
    }

    /// Parse a format name as given on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "tar" => Some(ArchiveType::Tar),
            "tar.gz" | "tgz" => Some(ArchiveType::TarGz),
            "tar.xz" | "txz" => Some(ArchiveType::TarXz),
            "tar.bz2" | "tbz2" => Some(ArchiveType::TarBz2),
            "zip" => Some(ArchiveType::Zip),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveType::Tar => "tar",
            ArchiveType::TarGz => "tar.gz",
            ArchiveType::TarXz => "tar.xz",
            ArchiveType::TarBz2 => "tar.bz2",
            ArchiveType::Zip => "zip",
        }
    }
}

impl std::fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extract an archive of the given type into `destination`
///
/// The first `strip_components` path segments of every entry are dropped;
/// entries with no segments left are skipped.
pub fn extract<R: Read + Seek>(
    archive_type: ArchiveType,
    reader: R,
    destination: &Path,
    strip_components: usize,
) -> Result<()> {
    std::fs::create_dir_all(destination)?;

    log::debug!(
        "Extracting {} archive to {} (strip {})",
        archive_type,
        destination.display(),
        strip_components
    );

    match archive_type {
        ArchiveType::Tar => extract_tar(reader, destination, strip_components),
        ArchiveType::TarGz => extract_tar_gz(reader, destination, strip_components),
        ArchiveType::TarXz => extract_tar_xz(reader, destination, strip_components),
        ArchiveType::TarBz2 => extract_tar_bz2(reader, destination, strip_components),
        ArchiveType::Zip => extract_zip(reader, destination, strip_components),
    }
}

/// Extract an archive file, detecting its type from the extension
pub fn extract_file(archive_path: &Path, destination: &Path, strip_components: usize) -> Result<()> {
    let archive_type = ArchiveType::from_path(archive_path).ok_or_else(|| {
        PaktError::ArchiveFormat(format!("unknown archive type: {}", archive_path.display()))
    })?;

    let file = File::open(archive_path)?;
    extract(archive_type, BufReader::new(file), destination, strip_components)
}

/// Drop the leading `strip_components` segments of an entry name
///
/// Returns `None` when nothing is left. Names that are absolute or climb
/// out with `..` after stripping are rejected.
pub(crate) fn stripped_path(name: &str, strip_components: usize) -> Result<Option<PathBuf>> {
    let segments: Vec<&str> = name.split('/').filter(|s| !s.is_empty()).collect();

    if segments.len() <= strip_components {
        return Ok(None);
    }

    let remaining = &segments[strip_components..];
    let absolute = strip_components == 0 && name.starts_with('/');
    if absolute || remaining.iter().any(|s| *s == "..") {
        return Err(PaktError::ArchiveFormat(format!(
            "entry {} escapes the destination",
            name
        )));
    }

    Ok(Some(remaining.iter().collect()))
}

pub(crate) fn archive_error(err: impl std::fmt::Display) -> PaktError {
    PaktError::ArchiveFormat(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_type_from_path() {
        assert_eq!(
            ArchiveType::from_path(Path::new("package.zip")),
            Some(ArchiveType::Zip)
        );
        assert_eq!(
            ArchiveType::from_path(Path::new("jdk-11.0.2.tar.gz")),
            Some(ArchiveType::TarGz)
        );
        assert_eq!(
            ArchiveType::from_path(Path::new("package.tgz")),
            Some(ArchiveType::TarGz)
        );
        assert_eq!(
            ArchiveType::from_path(Path::new("package.tar.xz")),
            Some(ArchiveType::TarXz)
        );
        assert_eq!(
            ArchiveType::from_path(Path::new("package.tar.bz2")),
            Some(ArchiveType::TarBz2)
        );
        assert_eq!(
            ArchiveType::from_path(Path::new("package.tar")),
            Some(ArchiveType::Tar)
        );
        assert_eq!(ArchiveType::from_path(Path::new("package.txt")), None);
    }

    #[test]
    fn test_archive_type_from_name() {
        assert_eq!(ArchiveType::from_name("tar.xz"), Some(ArchiveType::TarXz));
        assert_eq!(ArchiveType::from_name("ZIP"), Some(ArchiveType::Zip));
        assert_eq!(ArchiveType::from_name("rar"), None);
        assert_eq!(ArchiveType::TarBz2.to_string(), "tar.bz2");
    }

    #[test]
    fn test_stripped_path() {
        assert_eq!(stripped_path("a/b/c.txt", 1).unwrap(), Some(PathBuf::from("b/c.txt")));
        assert_eq!(stripped_path("a/b/", 1).unwrap(), Some(PathBuf::from("b")));
        assert_eq!(stripped_path("a/", 1).unwrap(), None);
        assert_eq!(stripped_path("a/b/c.txt", 3).unwrap(), None);
        assert_eq!(stripped_path("a/b/c.txt", 0).unwrap(), Some(PathBuf::from("a/b/c.txt")));
    }

    #[test]
    fn test_stripped_path_rejects_escapes() {
        assert!(stripped_path("a/../../etc/passwd", 1).is_err());
        assert!(stripped_path("/etc/passwd", 0).is_err());
        // The leading segment is gone before the check
        assert!(stripped_path("../a/b", 1).unwrap().is_some());
    }
}
