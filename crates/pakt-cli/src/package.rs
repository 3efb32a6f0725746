//! Package command - pack a directory into a tar archive.

use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use pakt_dep::{archive, ArchiveType, Catalog};

use crate::config::DEFAULT_CATALOG;
use crate::GlobalArgs;

#[derive(Args, Debug)]
pub struct PackageArgs {
    /// Directory to pack; it is not included itself
    pub source: PathBuf,

    /// Archive to write
    pub output: PathBuf,

    /// Gzip the archive (implied by a .tgz or .tar.gz output name)
    #[arg(long)]
    pub gzip: bool,

    /// Do not run the catalog's pre-package command
    #[arg(long)]
    pub skip_pre_package: bool,
}

pub fn execute(global: &GlobalArgs, args: PackageArgs) -> Result<i32> {
    if !args.source.is_dir() {
        bail!("{} is not a directory", args.source.display());
    }

    let catalog = load_catalog(global.catalog.as_deref(), &args.source)?;

    if let Some(command) = catalog.as_ref().and_then(|c| c.pre_package.as_deref()) {
        if args.skip_pre_package {
            log::info!("Skipping pre-package command {}", command);
        } else {
            run_pre_package(command, &args.source)?;
        }
    }

    let include_files = catalog
        .as_ref()
        .map(|c| c.include_files.as_slice())
        .unwrap_or_default();
    let gzip = args.gzip || ArchiveType::from_path(&args.output) == Some(ArchiveType::TarGz);

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);

    let packed = match (include_files.is_empty(), gzip) {
        (true, true) => archive::create_tar_gz(&mut writer, &args.source),
        (true, false) => archive::create_tar(&mut writer, &args.source),
        (false, true) => archive::create_tar_gz_from_files(&mut writer, &args.source, include_files),
        (false, false) => archive::create_tar_from_files(&mut writer, &args.source, include_files),
    };
    packed.with_context(|| format!("Failed to pack {}", args.source.display()))?;

    writer
        .flush()
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "{} Packed {} into {}",
        style("Success:").green().bold(),
        args.source.display(),
        args.output.display()
    );

    Ok(0)
}

/// The `--catalog` file, else buildpack.toml inside the source directory when present
fn load_catalog(flag: Option<&Path>, source: &Path) -> Result<Option<Catalog>> {
    let path = match flag {
        Some(path) => path.to_path_buf(),
        None => {
            let path = source.join(DEFAULT_CATALOG);
            if !path.is_file() {
                log::debug!("No catalog in {}, packing the whole tree", source.display());
                return Ok(None);
            }
            path
        }
    };

    let catalog = Catalog::from_file(&path)
        .with_context(|| format!("Failed to load catalog {}", path.display()))?;
    Ok(Some(catalog))
}

/// Run the pre-package command from the source directory
///
/// The command is a program, not a shell line. A relative path containing
/// a separator is taken relative to the source directory.
fn run_pre_package(command: &str, source: &Path) -> Result<()> {
    let program = Path::new(command);
    let program = if program.is_relative() && program.components().count() > 1 {
        source.join(program)
    } else {
        program.to_path_buf()
    };

    println!(
        "{} Running pre-package command {}",
        style("Info:").cyan(),
        command
    );

    let status = Command::new(&program)
        .current_dir(source)
        .status()
        .with_context(|| format!("Failed to run pre-package command {}", command))?;

    if !status.success() {
        bail!("Pre-package command {} failed with {}", command, status);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_catalog_from_source() {
        let dir = TempDir::new().unwrap();
        assert!(load_catalog(None, dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(DEFAULT_CATALOG),
            "[metadata]\ninclude-files = [\"bin/build\", \"buildpack.toml\"]\n",
        )
        .unwrap();
        let catalog = load_catalog(None, dir.path()).unwrap().unwrap();
        assert_eq!(catalog.include_files, vec!["bin/build", "buildpack.toml"]);
    }

    #[test]
    fn test_load_catalog_flag_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(load_catalog(Some(&missing), dir.path()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_pre_package_in_source_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("scripts")).unwrap();
        let script = dir.path().join("scripts/build.sh");
        std::fs::write(&script, "#!/bin/sh\necho built > generated.txt\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        run_pre_package("scripts/build.sh", dir.path()).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("generated.txt")).unwrap(),
            "built\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_run_pre_package_failure() {
        let dir = TempDir::new().unwrap();
        let err = run_pre_package("false", dir.path()).unwrap_err();
        assert!(err.to_string().contains("failed"));
        assert!(run_pre_package("./does-not-exist", dir.path()).is_err());
    }
}
