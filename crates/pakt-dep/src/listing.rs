//! Concurrent file manifest of a directory tree.

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use walkdir::WalkDir;

use crate::Result;

/// Default number of entries inspected at once
pub const DEFAULT_CONCURRENCY: usize = 64;

/// Metadata about one entry below the listed root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the root, `/`-separated
    pub path: String,

    /// Mode in `ls` style, e.g. `drwxr-xr-x` or `-rw-r--r--`
    pub mode: String,

    /// RFC 3339 modification time in UTC
    #[serde(rename = "modification-time")]
    pub modification_time: String,

    /// Hex sha256 of the content, for regular files only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// List every entry below `root`, sorted by path
pub async fn build_manifest(root: &Path) -> Result<Vec<FileEntry>> {
    build_manifest_with_concurrency(root, DEFAULT_CONCURRENCY).await
}

/// List every entry below `root` with at most `limit` entries in flight
///
/// The root itself is excluded. The first failure aborts the remaining
/// work and is returned without a partial listing.
pub async fn build_manifest_with_concurrency(root: &Path, limit: usize) -> Result<Vec<FileEntry>> {
    let walk_root = root.to_path_buf();
    let paths = tokio::task::spawn_blocking(move || walk(&walk_root)).await??;

    log::debug!(
        "Listing {} entries under {} ({} at a time)",
        paths.len(),
        root.display(),
        limit.max(1)
    );

    describe_entries(root, paths, limit).await
}

/// Describe already walked `paths` below `root`, failing as a whole
async fn describe_entries(root: &Path, paths: Vec<PathBuf>, limit: usize) -> Result<Vec<FileEntry>> {
    let root = root.to_path_buf();
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut tasks = JoinSet::new();

    for path in paths {
        let semaphore = semaphore.clone();
        let root = root.clone();
        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            file_entry(&root, &path).await
        });
    }

    let mut entries = Vec::new();
    while let Some(result) = tasks.join_next().await {
        // Returning early drops the set, which aborts the remaining tasks
        entries.push(result??);
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn walk(root: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        paths.push(entry.into_path());
    }
    Ok(paths)
}

async fn file_entry(root: &Path, path: &Path) -> Result<FileEntry> {
    let metadata = tokio::fs::symlink_metadata(path).await?;

    let sha256 = if metadata.is_file() {
        Some(hash_file(path).await?)
    } else {
        None
    };

    let modified: DateTime<Utc> = metadata.modified()?.into();

    Ok(FileEntry {
        path: relative_path(root, path),
        mode: mode_string(&metadata),
        modification_time: modified.to_rfc3339_opts(SecondsFormat::Secs, true),
        sha256,
    })
}

async fn hash_file(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Render a mode the way `ls -l` does, with `L` marking symlinks
pub fn mode_string(metadata: &Metadata) -> String {
    let file_type = metadata.file_type();
    let mut mode = String::with_capacity(12);

    #[cfg(unix)]
    let permissions = {
        use std::os::unix::fs::{FileTypeExt, PermissionsExt};

        let bits = metadata.permissions().mode();
        if file_type.is_dir() {
            mode.push('d');
        }
        if file_type.is_symlink() {
            mode.push('L');
        }
        if file_type.is_block_device() || file_type.is_char_device() {
            mode.push('D');
        }
        if file_type.is_fifo() {
            mode.push('p');
        }
        if file_type.is_socket() {
            mode.push('S');
        }
        if bits & 0o4000 != 0 {
            mode.push('u');
        }
        if bits & 0o2000 != 0 {
            mode.push('g');
        }
        if file_type.is_char_device() {
            mode.push('c');
        }
        if bits & 0o1000 != 0 {
            mode.push('t');
        }
        bits & 0o777
    };

    #[cfg(not(unix))]
    let permissions = {
        if file_type.is_dir() {
            mode.push('d');
        }
        if file_type.is_symlink() {
            mode.push('L');
        }
        if metadata.permissions().readonly() {
            0o555
        } else {
            0o755
        }
    };

    if mode.is_empty() {
        mode.push('-');
    }

    const RWX: [char; 3] = ['r', 'w', 'x'];
    for shift in (0..9).rev() {
        if permissions & (1 << shift) != 0 {
            mode.push(RWX[2 - shift % 3]);
        } else {
            mode.push('-');
        }
    }

    mode
}
