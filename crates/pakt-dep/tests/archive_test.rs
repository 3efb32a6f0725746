//! Integration tests for archive extraction and packing

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use pakt_dep::archive::{self, ArchiveType};
use pakt_dep::PaktError;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// a/, a/b/, a/b/c.txt
fn nested_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("a/b")).unwrap();
    fs::write(dir.path().join("a/b/c.txt"), b"nested content").unwrap();
    dir
}

fn nested_tar() -> Vec<u8> {
    let source = nested_tree();
    let mut data = Vec::new();
    archive::create_tar(&mut data, source.path()).unwrap();
    data
}

fn nested_zip() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.add_directory("a/", options).unwrap();
    writer.add_directory("a/b/", options).unwrap();
    writer
        .start_file("a/b/c.txt", options.unix_permissions(0o644))
        .unwrap();
    writer.write_all(b"nested content").unwrap();
    writer.finish().unwrap().into_inner()
}

fn file_count(dir: &Path) -> usize {
    walkdir::WalkDir::new(dir).min_depth(1).into_iter().count()
}

#[test]
fn test_tar_strip_one_component() {
    let dest = TempDir::new().unwrap();
    archive::extract(ArchiveType::Tar, Cursor::new(nested_tar()), dest.path(), 1).unwrap();

    assert_eq!(
        fs::read(dest.path().join("b/c.txt")).unwrap(),
        b"nested content"
    );
    assert!(!dest.path().join("a").exists());
}

#[test]
fn test_tar_strip_all_components() {
    let dest = TempDir::new().unwrap();
    archive::extract(ArchiveType::Tar, Cursor::new(nested_tar()), dest.path(), 3).unwrap();

    assert_eq!(file_count(dest.path()), 0);
}

#[test]
fn test_zip_strip_one_component() {
    let dest = TempDir::new().unwrap();
    archive::extract(ArchiveType::Zip, Cursor::new(nested_zip()), dest.path(), 1).unwrap();

    assert_eq!(
        fs::read(dest.path().join("b/c.txt")).unwrap(),
        b"nested content"
    );
}

#[test]
fn test_zip_strip_all_components() {
    let dest = TempDir::new().unwrap();
    archive::extract_zip(Cursor::new(nested_zip()), dest.path(), 3).unwrap();

    assert_eq!(file_count(dest.path()), 0);
}

#[test]
fn test_tar_xz() {
    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    encoder.write_all(&nested_tar()).unwrap();
    let data = encoder.finish().unwrap();

    let dest = TempDir::new().unwrap();
    archive::extract_tar_xz(data.as_slice(), dest.path(), 2).unwrap();

    assert_eq!(fs::read(dest.path().join("c.txt")).unwrap(), b"nested content");
}

#[test]
fn test_tar_bz2() {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(&nested_tar()).unwrap();
    let data = encoder.finish().unwrap();

    let dest = TempDir::new().unwrap();
    archive::extract_tar_bz2(data.as_slice(), dest.path(), 0).unwrap();

    assert!(dest.path().join("a/b/c.txt").is_file());
}

#[test]
fn test_package_and_extract_tar_gz() {
    let source = nested_tree();
    let mut data = Vec::new();
    archive::create_tar_gz(&mut data, source.path()).unwrap();

    let dest = TempDir::new().unwrap();
    archive::extract_tar_gz(data.as_slice(), dest.path(), 0).unwrap();

    assert_eq!(
        fs::read(dest.path().join("a/b/c.txt")).unwrap(),
        b"nested content"
    );
}

#[test]
fn test_extract_file_detects_type() {
    let work = TempDir::new().unwrap();
    let archive_path = work.path().join("dependency.tgz");
    let source = nested_tree();
    archive::create_tar_gz(fs::File::create(&archive_path).unwrap(), source.path()).unwrap();

    let dest = work.path().join("out");
    archive::extract_file(&archive_path, &dest, 1).unwrap();
    assert!(dest.join("b/c.txt").is_file());

    let unknown = work.path().join("dependency.rar");
    fs::write(&unknown, b"").unwrap();
    assert!(matches!(
        archive::extract_file(&unknown, &dest, 0),
        Err(PaktError::ArchiveFormat(_))
    ));
}

#[test]
fn test_tar_hard_link() {
    let mut builder = tar::Builder::new(Vec::new());

    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(4);
    header.set_mode(0o644);
    header.set_path("pkg/original").unwrap();
    header.set_cksum();
    builder.append(&header, &b"data"[..]).unwrap();

    let mut link = tar::Header::new_gnu();
    link.set_entry_type(tar::EntryType::Link);
    link.set_size(0);
    link.set_path("pkg/linked").unwrap();
    link.set_link_name("pkg/original").unwrap();
    link.set_cksum();
    builder.append(&link, std::io::empty()).unwrap();

    let data = builder.into_inner().unwrap();
    let dest = TempDir::new().unwrap();
    archive::extract_tar(data.as_slice(), dest.path(), 1).unwrap();

    assert_eq!(fs::read(dest.path().join("linked")).unwrap(), b"data");
}

#[test]
fn test_tar_skips_fifo_entries() {
    let mut builder = tar::Builder::new(Vec::new());

    let mut fifo = tar::Header::new_gnu();
    fifo.set_entry_type(tar::EntryType::Fifo);
    fifo.set_size(0);
    fifo.set_path("pkg/pipe").unwrap();
    fifo.set_cksum();
    builder.append(&fifo, std::io::empty()).unwrap();

    let data = builder.into_inner().unwrap();
    let dest = TempDir::new().unwrap();
    archive::extract_tar(data.as_slice(), dest.path(), 0).unwrap();

    assert!(!dest.path().join("pkg/pipe").exists());
}

#[cfg(unix)]
#[test]
fn test_tar_symlink() {
    let source = nested_tree();
    std::os::unix::fs::symlink("b/c.txt", source.path().join("a/link")).unwrap();

    let mut data = Vec::new();
    archive::create_tar(&mut data, source.path()).unwrap();

    let dest = TempDir::new().unwrap();
    archive::extract_tar(data.as_slice(), dest.path(), 1).unwrap();

    let link = dest.path().join("link");
    assert_eq!(fs::read_link(&link).unwrap(), Path::new("b/c.txt"));
    assert_eq!(fs::read(&link).unwrap(), b"nested content");
}

#[cfg(unix)]
#[test]
fn test_zip_symlink() {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.start_file("pkg/target.txt", options).unwrap();
    writer.write_all(b"target").unwrap();
    writer.add_symlink("pkg/link", "target.txt", options).unwrap();
    let data = writer.finish().unwrap().into_inner();

    let dest = TempDir::new().unwrap();
    archive::extract_zip(Cursor::new(data), dest.path(), 1).unwrap();

    assert_eq!(
        fs::read_link(dest.path().join("link")).unwrap(),
        Path::new("target.txt")
    );
}

#[test]
fn test_corrupt_zip() {
    let dest = TempDir::new().unwrap();
    let result = archive::extract_zip(Cursor::new(b"PK not really".to_vec()), dest.path(), 0);
    assert!(matches!(result, Err(PaktError::ArchiveFormat(_))));
}
