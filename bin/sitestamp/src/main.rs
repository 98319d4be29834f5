//! sitestamp CLI
//!
//! Builds the index, category pages, and sitemap of a hand-written HTML site.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for sitestamp.
#[derive(Parser)]
#[command(
    name = "sitestamp",
    version,
    about = "A static site builder that keeps page timestamps stable across rebuilds"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sitestamp.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Generate category pages, index pages, and the sitemap
    Build {
        /// Keep recorded timestamps even for pages whose content changed
        #[arg(long)]
        keep_timestamps: bool,
        /// Override site domain (e.g., https://example.com/)
        #[arg(long)]
        domain: Option<String>,
        /// Start a new ledger if the ledger file does not exist
        #[arg(long)]
        new_ledger: bool,
    },
    /// Validate layout, articles, and categories without writing anything
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    sitestamp::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            keep_timestamps,
            domain,
            new_ledger,
        } => {
            sitestamp::cmd::build::run(&cli.config, keep_timestamps, domain.as_deref(), new_ledger)?;
        }
        Commands::Check { strict } => {
            sitestamp::cmd::check::run(&cli.config, strict)?;
        }
    }

    Ok(())
}
