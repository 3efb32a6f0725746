use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use walkdir::WalkDir;

use super::stripped_path;
use crate::{PaktError, Result};

/// Write a tar of every directory and file below `source` to `writer`
///
/// Entries are added in file-name order with names relative to `source`;
/// `source` itself is not included and directory names end with `/`.
/// Symlinks are stored as links rather than followed.
pub fn create_tar<W: Write>(writer: W, source: &Path) -> Result<()> {
    let mut builder = tar::Builder::new(writer);
    builder.follow_symlinks(false);

    append_tree(&mut builder, source, source)?;

    builder.into_inner()?.flush()?;
    Ok(())
}

/// Write a gzip compressed tar of `source` to `writer`
pub fn create_tar_gz<W: Write>(writer: W, source: &Path) -> Result<()> {
    let mut encoder = GzEncoder::new(writer, Compression::default());
    create_tar(&mut encoder, source)?;
    encoder.finish()?;
    Ok(())
}

/// Write a tar holding only the listed paths below `source`
///
/// Paths are `/`-separated and relative to `source`. They are added in
/// sorted order; a listed directory brings its whole tree. A path that is
/// absolute or climbs out with `..` is rejected, a missing one is an I/O error.
pub fn create_tar_from_files<W: Write>(writer: W, source: &Path, files: &[String]) -> Result<()> {
    let mut names = Vec::with_capacity(files.len());
    for file in files {
        match stripped_path(file, 0)? {
            Some(name) => names.push(name),
            None => {
                return Err(PaktError::ArchiveFormat(format!(
                    "cannot package empty path {:?}",
                    file
                )))
            }
        }
    }
    names.sort();
    names.dedup();

    let mut builder = tar::Builder::new(writer);
    builder.follow_symlinks(false);

    for name in &names {
        let path = source.join(name);
        if std::fs::symlink_metadata(&path)?.is_dir() {
            append_dir(&mut builder, &path, name)?;
            append_tree(&mut builder, source, &path)?;
        } else {
            builder.append_path_with_name(&path, name)?;
            log::trace!("Added {} to archive", name.display());
        }
    }

    builder.into_inner()?.flush()?;
    Ok(())
}

/// Write a gzip compressed tar holding only the listed paths below `source`
pub fn create_tar_gz_from_files<W: Write>(writer: W, source: &Path, files: &[String]) -> Result<()> {
    let mut encoder = GzEncoder::new(writer, Compression::default());
    create_tar_from_files(&mut encoder, source, files)?;
    encoder.finish()?;
    Ok(())
}

/// Add everything below `dir`, named relative to `source`
fn append_tree<W: Write>(builder: &mut tar::Builder<W>, source: &Path, dir: &Path) -> Result<()> {
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        if entry.file_type().is_dir() {
            append_dir(builder, entry.path(), relative)?;
        } else {
            builder.append_path_with_name(entry.path(), relative)?;
            log::trace!("Added {} to archive", relative.display());
        }
    }
    Ok(())
}

fn append_dir<W: Write>(builder: &mut tar::Builder<W>, path: &Path, name: &Path) -> Result<()> {
    let mut dir_name = name.as_os_str().to_owned();
    dir_name.push("/");
    builder.append_dir(&dir_name, path)?;
    log::trace!("Added {} to archive", name.display());
    Ok(())
}
