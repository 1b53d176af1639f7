//! repoclone CLI - Command line interface for repoclone
//!
//! Clones every repository owned by one or more GitHub users or
//! organizations.

mod commands;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::CloneArgs;

/// Clone every repository of GitHub users and organizations
#[derive(Parser, Debug)]
#[command(name = "repoclone")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    clone: CloneArgs,
}

/// Log filter used when `RUST_LOG` is not set
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,repoclone=debug,repoclone_core=debug,repoclone_github=debug"
    } else {
        "info"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so that stdout carries only results
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(cli.verbose)));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    cli.clone.execute().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_flags() {
        let cli = Cli::try_parse_from(["repoclone", "-o", "doowb", "--owner", "acme", "-v"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.clone.owners(), vec!["doowb", "acme"]);
    }

    #[test]
    fn test_positional_owners_join_flags() {
        let cli = Cli::try_parse_from(["repoclone", "jonschlinkert", "-o", "doowb"]).unwrap();
        assert_eq!(cli.clone.owners(), vec!["doowb", "jonschlinkert"]);
    }

    #[test]
    fn test_parse_limits_and_destination() {
        let cli = Cli::try_parse_from([
            "repoclone",
            "-o",
            "doowb",
            "-d",
            "/srv/mirror",
            "-j",
            "2",
            "--max-attempts",
            "5",
            "--json",
        ])
        .unwrap();
        assert_eq!(
            cli.clone.dest.as_deref(),
            Some(std::path::Path::new("/srv/mirror"))
        );
        assert_eq!(cli.clone.concurrency, Some(2));
        assert_eq!(cli.clone.max_attempts, Some(5));
        assert!(cli.clone.json);
    }

    #[test]
    fn test_invalid_match_pattern_rejected() {
        assert!(Cli::try_parse_from(["repoclone", "-o", "doowb", "-m", "("]).is_err());
    }

    #[test]
    fn test_non_numeric_concurrency_rejected() {
        assert!(Cli::try_parse_from(["repoclone", "-o", "doowb", "-j", "many"]).is_err());
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "info");
        assert!(default_filter(true).contains("repoclone_core=debug"));
    }
}
