//! # xrdgen-cli — Resource Definition Generator CLI
//!
//! Command-line front end for the synthesis engine. Reads a program
//! manifest, runs the generator and writes one YAML file per resource kind.
//!
//! ## Subcommands
//!
//! - `generate` — render composite resource definitions
//! - `kinds` — list the resource kinds found in a program
//! - `markers` — describe the supported markers
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; generation logic stays in `xrdgen-engine`.
//! - Handlers return an exit code; any diagnostic or failed kind yields `1`.

pub mod config;
pub mod generate;
pub mod kinds;
pub mod manifest;
pub mod markers;
