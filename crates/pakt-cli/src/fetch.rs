//! Fetch command - resolve a dependency and pull it through the cache.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use pakt_dep::{archive, ArchiveType, DependencyCache};

use crate::config::{env_var, PaktConfig};
use crate::resolve::{parse_constraint, resolve_dependency};
use crate::GlobalArgs;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Dependency id, e.g. jdk
    pub id: String,

    /// Version constraint (default: the catalog's default-versions entry)
    #[arg(long, value_parser = parse_constraint)]
    pub version: Option<String>,

    /// Stack id the dependency must support
    #[arg(long)]
    pub stack: Option<String>,

    /// Copy the artifact to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Extract the artifact into this directory
    #[arg(long, value_name = "DIR")]
    pub extract: Option<PathBuf>,

    /// Leading path components to drop while extracting
    #[arg(long, default_value_t = 0, requires = "extract")]
    pub strip: usize,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

pub fn execute(global: &GlobalArgs, args: FetchArgs) -> Result<i32> {
    let config = PaktConfig::discover(global.config.as_deref())?;
    let dependency = resolve_dependency(
        &config,
        global.catalog.as_deref(),
        &args.id,
        args.version.as_deref(),
        args.stack.as_deref(),
    )?;

    println!(
        "{} {} {}",
        style("Fetching").green().bold(),
        dependency.id,
        style(&dependency.version).cyan()
    );

    let spinner = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };
    spinner.set_message(format!("Downloading {}", dependency.uri));

    let cache = DependencyCache::new(config.cache_config(env_var))
        .context("Failed to create HTTP client")?;
    let artifact = cache.artifact(&dependency);
    spinner.finish_and_clear();

    let mut artifact = artifact.with_context(|| format!("Failed to fetch {}", dependency))?;

    if let Some(output) = &args.output {
        copy_artifact(&mut artifact, output)?;
        println!(
            "{} Wrote {}",
            style("Success:").green().bold(),
            output.display()
        );
    }

    if let Some(destination) = &args.extract {
        let name = dependency.artifact_name();
        let archive_type = ArchiveType::from_path(Path::new(&name))
            .with_context(|| format!("Cannot tell the archive type of {}", dependency.uri))?;

        artifact.seek(SeekFrom::Start(0))?;
        archive::extract(
            archive_type,
            BufReader::new(artifact),
            destination,
            args.strip,
        )
        .with_context(|| format!("Failed to extract {} to {}", name, destination.display()))?;

        println!(
            "{} Extracted to {}",
            style("Success:").green().bold(),
            destination.display()
        );
    }

    if args.output.is_none() && args.extract.is_none() {
        println!(
            "{} {} {} is cached",
            style("Success:").green().bold(),
            dependency.id,
            dependency.version
        );
    }

    Ok(0)
}

fn copy_artifact(artifact: &mut File, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut file =
        File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;
    std::io::copy(artifact, &mut file)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}
