//! Listing command - print a JSON file manifest.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use pakt_dep::listing::{build_manifest_with_concurrency, DEFAULT_CONCURRENCY};

#[derive(Args, Debug)]
pub struct ListingArgs {
    /// Directory to list; it is not included itself
    pub directory: PathBuf,

    /// Entries inspected at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,
}

pub async fn execute(args: ListingArgs) -> Result<i32> {
    let entries = build_manifest_with_concurrency(&args.directory, args.concurrency)
        .await
        .with_context(|| format!("Failed to list {}", args.directory.display()))?;

    let json = serde_json::to_string_pretty(&entries).context("Failed to encode listing")?;
    println!("{}", json);

    Ok(0)
}
