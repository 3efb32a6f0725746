//! Extract command - unpack an archive into a directory.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use pakt_dep::{archive, ArchiveType};

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Archive to extract
    pub archive: PathBuf,

    /// Destination directory, created when missing
    pub destination: PathBuf,

    /// Leading path components to drop from every entry
    #[arg(long, default_value_t = 0)]
    pub strip: usize,

    /// Archive format (default: detected from the file name)
    #[arg(long, value_parser = parse_format)]
    pub format: Option<ArchiveType>,
}

fn parse_format(value: &str) -> std::result::Result<ArchiveType, String> {
    ArchiveType::from_name(value).ok_or_else(|| {
        format!(
            "unknown archive format '{}' (expected tar, tar.gz, tar.xz, tar.bz2 or zip)",
            value
        )
    })
}

pub fn execute(args: ExtractArgs) -> Result<i32> {
    let archive_type = match args.format {
        Some(archive_type) => archive_type,
        None => ArchiveType::from_path(&args.archive).with_context(|| {
            format!(
                "Cannot tell the archive type of {}; pass --format",
                args.archive.display()
            )
        })?,
    };

    let file = File::open(&args.archive)
        .with_context(|| format!("Failed to open {}", args.archive.display()))?;

    archive::extract(
        archive_type,
        BufReader::new(file),
        &args.destination,
        args.strip,
    )
    .with_context(|| format!("Failed to extract {}", args.archive.display()))?;

    println!(
        "{} Extracted {} archive to {}",
        style("Success:").green().bold(),
        archive_type,
        args.destination.display()
    );

    Ok(0)
}
