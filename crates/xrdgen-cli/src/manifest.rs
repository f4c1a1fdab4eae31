//! # Program Manifest Loading
//!
//! Reads a serialized program from disk. Files ending in `.json` are parsed
//! as JSON; anything else as YAML.

use std::path::Path;

use anyhow::{Context, Result};
use xrdgen_core::{Program, ProgramManifest, XrdgenError};

fn read_manifest(path: &Path) -> Result<Program, XrdgenError> {
    let text = std::fs::read_to_string(path)?;
    let manifest: ProgramManifest = if path.extension().is_some_and(|e| e == "json") {
        serde_json::from_str(&text).map_err(|e| XrdgenError::Serialization(e.to_string()))?
    } else {
        serde_yaml::from_str(&text).map_err(|e| XrdgenError::Serialization(e.to_string()))?
    };
    Ok(Program::try_from(manifest)?)
}

/// Load and validate the program manifest at `path`.
pub fn load_program(path: &Path) -> Result<Program> {
    let program = read_manifest(path)
        .with_context(|| format!("failed to load program manifest: {}", path.display()))?;
    tracing::debug!(packages = program.len(), path = %path.display(), "loaded program");
    Ok(program)
}
