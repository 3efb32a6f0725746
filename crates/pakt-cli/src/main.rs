mod completions;
mod config;
mod extract;
mod fetch;
mod listing;
mod package;
mod resolve;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "pakt")]
#[command(about = "Resolve, fetch and unpack buildpack dependencies")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Configuration file (default: nearest pakt.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Catalog file carrying a [metadata] table
    #[arg(long, global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the newest catalog dependency matching a constraint
    Resolve(resolve::ResolveArgs),

    /// Resolve a dependency and fetch it through the cache
    Fetch(fetch::FetchArgs),

    /// Extract an archive into a directory
    Extract(extract::ExtractArgs),

    /// Pack a directory into a tar archive
    Package(package::PackageArgs),

    /// Print a JSON manifest of every file below a directory
    Listing(listing::ListingArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins over -v
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match cli.command {
        Commands::Resolve(args) => resolve::execute(&cli.global, args),
        Commands::Fetch(args) => fetch::execute(&cli.global, args),
        Commands::Extract(args) => extract::execute(args),
        Commands::Package(args) => package::execute(&cli.global, args),
        Commands::Listing(args) => {
            let rt = tokio::runtime::Runtime::new()
                .map_err(|e| anyhow::anyhow!("Failed to create async runtime: {}", e))?;
            rt.block_on(listing::execute(args))
        }
        Commands::Completions(args) => completions::execute(args),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("{} {}", console::style("Error:").red().bold(), e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pakt", "resolve", "jdk", "--catalog", "meta.toml", "-vv",
        ])
        .unwrap();

        assert_eq!(cli.global.catalog, Some(PathBuf::from("meta.toml")));
        assert_eq!(cli.global.verbose, 2);
        match cli.command {
            Commands::Resolve(args) => assert_eq!(args.id, "jdk"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_strip_requires_extract() {
        assert!(Cli::try_parse_from(["pakt", "fetch", "jdk", "--strip", "1"]).is_err());
        assert!(Cli::try_parse_from([
            "pakt", "fetch", "jdk", "--extract", "out", "--strip", "1"
        ])
        .is_ok());
    }

    #[test]
    fn test_invalid_constraint_is_rejected_by_parser() {
        assert!(Cli::try_parse_from(["pakt", "resolve", "jdk", "--version", ">=>1"]).is_err());
        assert!(Cli::try_parse_from(["pakt", "resolve", "jdk", "--version", ">=11 <12"]).is_ok());
    }

    #[test]
    fn test_extract_format_names() {
        let cli = Cli::try_parse_from([
            "pakt", "extract", "a.bin", "out", "--format", "tar.xz",
        ])
        .unwrap();
        match cli.command {
            Commands::Extract(args) => {
                assert_eq!(args.format, Some(pakt_dep::ArchiveType::TarXz))
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["pakt", "extract", "a.bin", "out", "--format", "rar"]).is_err());
    }
}
