//! # packlint CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use packlint_cli::check::{run_check, CheckArgs};
use packlint_cli::layers::{run_layers, LayersArgs};

/// packlint — convention checker for ESPHome shared-package trees.
///
/// Verifies include order, secrets hygiene, naming conventions, diagnostic
/// entity categories, debounce filters, required substitutions, and
/// dashboard adoption readiness across a package tree.
#[derive(Parser, Debug)]
#[command(name = "packlint", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a package tree against the convention and report violations.
    Check(CheckArgs),

    /// Print the layer classification of every YAML file in a tree.
    Layers(LayersArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check(args) => run_check(&args),
        Commands::Layers(args) => run_layers(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
