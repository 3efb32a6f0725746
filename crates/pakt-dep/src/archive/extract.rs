use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use tar::EntryType;
use xz2::read::XzDecoder;

use super::{archive_error, stripped_path};
use crate::{PaktError, Result};

/// Extract a plain tar stream
pub fn extract_tar<R: Read>(reader: R, destination: &Path, strip_components: usize) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    let mut directories = Vec::new();

    for entry in archive.entries().map_err(archive_error)? {
        let mut entry = entry.map_err(archive_error)?;

        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let relative = match stripped_path(&name, strip_components)? {
            Some(relative) => relative,
            None => continue,
        };
        let target = destination.join(&relative);

        match entry.header().entry_type() {
            EntryType::Directory => {
                fs::create_dir_all(&target)?;
                let mode = entry.header().mode().map_err(archive_error)?;
                directories.push((target, mode));
            }
            EntryType::GNUSparse => {
                return Err(PaktError::ArchiveFormat(format!(
                    "sparse entry {} is not supported",
                    name
                )))
            }
            EntryType::Regular | EntryType::Continuous => {
                let mode = entry.header().mode().map_err(archive_error)?;
                write_file(&mut entry, &target, mode)?;
            }
            EntryType::Symlink => {
                let link = link_name(&entry, &name)?;
                write_symlink(&link, &target)?;
            }
            EntryType::Link => {
                let link = link_name(&entry, &name)?;
                let source = match stripped_path(&link, strip_components)? {
                    Some(source) => destination.join(source),
                    None => {
                        return Err(PaktError::ArchiveFormat(format!(
                            "hard link {} points outside the extracted tree",
                            name
                        )))
                    }
                };
                write_hard_link(&source, &target)?;
            }
            other => log::trace!("Skipping {} entry {}", entry_kind(other), name),
        }
    }

    set_directory_modes(directories)
}

/// Extract a gzip compressed tar stream
pub fn extract_tar_gz<R: Read>(reader: R, destination: &Path, strip_components: usize) -> Result<()> {
    extract_tar(GzDecoder::new(reader), destination, strip_components)
}

/// Extract an xz compressed tar stream
pub fn extract_tar_xz<R: Read>(reader: R, destination: &Path, strip_components: usize) -> Result<()> {
    extract_tar(XzDecoder::new(reader), destination, strip_components)
}

/// Extract a bzip2 compressed tar stream
pub fn extract_tar_bz2<R: Read>(reader: R, destination: &Path, strip_components: usize) -> Result<()> {
    extract_tar(BzDecoder::new(reader), destination, strip_components)
}

/// Extract a zip archive
pub fn extract_zip<R: Read + Seek>(
    reader: R,
    destination: &Path,
    strip_components: usize,
) -> Result<()> {
    let mut archive = zip::ZipArchive::new(reader).map_err(archive_error)?;
    let mut directories = Vec::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(archive_error)?;

        let name = file.name().to_string();
        let relative = match stripped_path(&name, strip_components)? {
            Some(relative) => relative,
            None => continue,
        };
        let target = destination.join(&relative);

        let mode = file.unix_mode();
        if file.is_dir() {
            fs::create_dir_all(&target)?;
            if let Some(mode) = mode {
                directories.push((target, mode));
            }
        } else if mode.map_or(false, |m| m & 0o170000 == 0o120000) {
            let mut link = String::new();
            file.read_to_string(&mut link)?;
            write_symlink(&link, &target)?;
        } else {
            write_file(&mut file, &target, mode.unwrap_or(0o644))?;
        }
    }

    set_directory_modes(directories)
}

fn link_name<R: Read>(entry: &tar::Entry<'_, R>, name: &str) -> Result<String> {
    let link = entry
        .link_name_bytes()
        .ok_or_else(|| PaktError::ArchiveFormat(format!("link {} has no target", name)))?;
    Ok(String::from_utf8_lossy(&link).into_owned())
}

fn write_file<R: Read + ?Sized>(source: &mut R, path: &Path, mode: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode & 0o7777);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut out = options.open(path)?;

    // Read failures are archive damage; write failures stay I/O errors
    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        let n = match source.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(archive_error(e)),
        };
        out.write_all(&buffer[..n])?;
    }

    Ok(())
}

/// Apply archived directory modes once their contents are written
///
/// Deepest directories go first so a read-only parent does not block them.
/// A mode without permission bits keeps the default.
fn set_directory_modes(mut directories: Vec<(PathBuf, u32)>) -> Result<()> {
    directories.sort_by(|a, b| b.0.cmp(&a.0));

    #[cfg(unix)]
    for (path, mode) in directories {
        use std::os::unix::fs::PermissionsExt;

        if mode & 0o777 != 0 {
            fs::set_permissions(&path, fs::Permissions::from_mode(mode & 0o7777))?;
        }
    }

    #[cfg(not(unix))]
    let _ = directories;

    Ok(())
}

fn write_symlink(link: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    std::os::unix::fs::symlink(link, path)?;

    #[cfg(not(unix))]
    log::warn!(
        "Skipping symlink {} -> {}: not supported on this platform",
        path.display(),
        link
    );

    Ok(())
}

fn write_hard_link(source: &Path, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::hard_link(source, path)?;
    Ok(())
}

fn entry_kind(entry_type: EntryType) -> &'static str {
    match entry_type {
        EntryType::Char => "character device",
        EntryType::Block => "block device",
        EntryType::Fifo => "fifo",
        EntryType::XGlobalHeader | EntryType::XHeader => "pax header",
        EntryType::GNULongName | EntryType::GNULongLink => "long name",
        _ => "unsupported",
    }
}
