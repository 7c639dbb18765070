//! Command-line interface for wiregraph.
//!
//! The CLI loads a TOML catalog file (see [`crate::catalog::manifest`]),
//! resolves it into a construction plan and prints the result.
//!
//! # Available Commands
//!
//! - `resolve` - Resolve a catalog and print the construction plan (text or JSON)
//! - `tree` - Show the dependency tree of the plan's roots or of one component
//!
//! # Global Options
//!
//! - `--verbose` / `--quiet` control log output on stderr; `RUST_LOG` wins
//!   when set
//! - `--config` points at a resolver configuration file that must exist;
//!   without it `WIREGRAPH_CONFIG` or the default location is tried
//!
//! # Examples
//!
//! ```bash
//! wiregraph resolve catalog.toml
//! wiregraph resolve catalog.toml --format json --output plan.json
//! wiregraph --verbose tree catalog.toml --component app
//! ```

mod common;
mod resolve;
mod tree;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::ResolverConfig;

pub use common::resolve_catalog;

/// Main CLI structure for wiregraph.
#[derive(Parser)]
#[command(
    name = "wiregraph",
    about = "Resolve dependency-injection component graphs into construction plans",
    version,
    author,
    long_about = "wiregraph resolves component declarations, claims and type information from a \
                  catalog file into an ordered construction plan, reporting unresolved, ambiguous \
                  and circular dependencies."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the resolver configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a catalog and print the construction plan.
    Resolve(resolve::ResolveCommand),

    /// Show dependency trees of a resolved catalog.
    Tree(tree::TreeCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        init_logging(self.log_directive());
        let config = ResolverConfig::load_with_optional(self.config.clone()).await?;
        tracing::debug!("Resolver configuration: {:?}", config);

        match self.command {
            Commands::Resolve(cmd) => cmd.execute(config).await,
            Commands::Tree(cmd) => cmd.execute(config).await,
        }
    }

    fn log_directive(&self) -> &'static str {
        if self.verbose {
            "wiregraph=debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

/// Install the stderr subscriber; `RUST_LOG` overrides `directive`.
fn init_logging(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).try_init();
}
