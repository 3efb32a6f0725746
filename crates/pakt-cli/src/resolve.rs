//! Resolve command - print the newest matching catalog entry.

use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;

use pakt_dep::{Catalog, Dependency, DependencyResolver};
use pakt_semver::VersionParser;

use crate::config::{env_var, PaktConfig};
use crate::GlobalArgs;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Dependency id, e.g. jdk
    pub id: String,

    /// Version constraint (default: the catalog's default-versions entry)
    #[arg(long, value_parser = parse_constraint)]
    pub version: Option<String>,

    /// Stack id the dependency must support
    #[arg(long)]
    pub stack: Option<String>,
}

/// Reject malformed constraints before touching the catalog
pub(crate) fn parse_constraint(value: &str) -> std::result::Result<String, String> {
    VersionParser::new()
        .parse_constraints(value)
        .map(|_| value.to_string())
        .map_err(|e| e.to_string())
}

pub fn execute(global: &GlobalArgs, args: ResolveArgs) -> Result<i32> {
    let config = PaktConfig::discover(global.config.as_deref())?;
    let dependency = resolve_dependency(
        &config,
        global.catalog.as_deref(),
        &args.id,
        args.version.as_deref(),
        args.stack.as_deref(),
    )?;

    let encoded = toml::to_string(&dependency).context("Failed to encode dependency")?;
    print!("{}", encoded);

    Ok(0)
}

/// Load the catalog and pick the dependency for `id`
pub(crate) fn resolve_dependency(
    config: &PaktConfig,
    catalog_flag: Option<&Path>,
    id: &str,
    version: Option<&str>,
    stack: Option<&str>,
) -> Result<Dependency> {
    let catalog_path = config.catalog_path(catalog_flag);
    let catalog = Catalog::from_file(&catalog_path)
        .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;

    let stack = config
        .stack(stack, env_var)
        .context("No stack configured; pass --stack, set PAKT_STACK_ID or add [resolver] stack to pakt.toml")?;

    let constraint = match version {
        Some(version) => version.to_string(),
        None => catalog.default_version(id).to_string(),
    };

    log::info!(
        "Resolving {} {} for stack {}",
        id,
        if constraint.is_empty() { "*" } else { &constraint },
        stack
    );

    let resolver = DependencyResolver::new(catalog.dependencies, stack);
    let dependency = resolver.resolve(id, &constraint)?;

    log::info!("Resolved {} to {}", id, dependency.version);
    Ok(dependency)
}
