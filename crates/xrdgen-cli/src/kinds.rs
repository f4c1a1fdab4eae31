//! # Kinds Subcommand
//!
//! Lists the resource kinds found in a program, in generation order.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use xrdgen_core::GroupKind;
use xrdgen_engine::{Generator, GeneratorConfig};

use crate::manifest::load_program;

/// Arguments for the kinds subcommand.
#[derive(Args, Debug)]
pub struct KindsArgs {
    /// Program manifest to scan.
    #[arg(long)]
    pub program: PathBuf,
}

/// Resource kinds in the program at `path`.
pub fn list_kinds(path: &std::path::Path) -> Result<Vec<GroupKind>> {
    let program = load_program(path)?;
    let generator = Generator::new(GeneratorConfig::default())?;
    Ok(generator.kinds(&program))
}

/// Execute the kinds subcommand.
pub fn run_kinds(args: &KindsArgs) -> Result<u8> {
    let kinds = list_kinds(&args.program)?;
    for kind in &kinds {
        println!("{kind}");
    }
    tracing::info!(count = kinds.len(), "listed resource kinds");
    Ok(0)
}
