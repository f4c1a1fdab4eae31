//! # xrdgen CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use xrdgen_cli::generate::{run_generate, GenerateArgs};
use xrdgen_cli::kinds::{run_kinds, KindsArgs};
use xrdgen_cli::markers::{run_markers, MarkersArgs};

/// xrdgen — composite resource definition generator.
///
/// Finds resource kinds in a program manifest and renders one composite
/// resource definition per kind.
#[derive(Parser, Debug)]
#[command(name = "xrdgen", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate composite resource definitions.
    Generate(GenerateArgs),

    /// List the resource kinds found in a program.
    Kinds(KindsArgs),

    /// Describe the supported markers.
    Markers(MarkersArgs),
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
        Commands::Generate(args) => run_generate(&args),
        Commands::Kinds(args) => run_kinds(&args),
        Commands::Markers(args) => run_markers(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
