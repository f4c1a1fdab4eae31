//! # Generate Subcommand
//!
//! Renders one composite resource definition per resource kind and writes
//! it to `<output-dir>/<group>_<plural>.yaml`.
//!
//! ## Usage
//!
//! ```bash
//! xrdgen generate --program program.yaml --output-dir package/xrds
//! xrdgen generate --program program.yaml --config xrdgen.yaml --max-desc-len 0
//! xrdgen generate --program program.yaml --dry-run
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Args;
use xrdgen_engine::{GenerationOutput, Generator, GeneratorConfig};

use crate::config::CliConfig;
use crate::manifest::load_program;

/// Arguments for the generate subcommand.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Program manifest to generate from.
    #[arg(long)]
    pub program: PathBuf,

    /// Configuration file; flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory to write generated files to. Defaults to the current directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Maximum description length; 0 drops descriptions.
    #[arg(long)]
    pub max_desc_len: Option<usize>,

    /// File whose contents are prepended to every generated file.
    #[arg(long)]
    pub header_file: Option<PathBuf>,

    /// Year substituted for " YEAR" in the header. Defaults to the current year.
    #[arg(long)]
    pub year: Option<String>,

    /// Document API version to generate (repeatable). Only v1 is supported.
    #[arg(long = "xrd-version")]
    pub xrd_versions: Vec<String>,

    /// Allow float fields.
    #[arg(long)]
    pub allow_dangerous_types: bool,

    /// Skip fields whose names start with a lowercase letter.
    #[arg(long)]
    pub ignore_unexported_fields: bool,

    /// Generate the common fields of nested object metadata.
    #[arg(long)]
    pub generate_embedded_object_meta: bool,

    /// Print generated files to stdout instead of writing them.
    #[arg(long)]
    pub dry_run: bool,
}

/// Merge the config file (if any) with command-line overrides.
pub fn resolve_config(args: &GenerateArgs) -> Result<(GeneratorConfig, PathBuf)> {
    let file = match &args.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let mut config = file.generator;

    if let Some(n) = args.max_desc_len {
        config.max_desc_len = Some(n);
    }
    if !args.xrd_versions.is_empty() {
        config.xrd_versions = args.xrd_versions.clone();
    }
    config.allow_dangerous_types |= args.allow_dangerous_types;
    config.ignore_unexported_fields |= args.ignore_unexported_fields;
    config.generate_embedded_object_meta |= args.generate_embedded_object_meta;

    if let Some(year) = &args.year {
        config.year = year.clone();
    } else if config.year.is_empty() {
        config.year = chrono::Utc::now().year().to_string();
    }

    if let Some(header_file) = args.header_file.as_ref().or(file.header_file.as_ref()) {
        config.header = std::fs::read_to_string(header_file)
            .with_context(|| format!("failed to read header file: {}", header_file.display()))?;
    }

    let output_dir = args
        .output_dir
        .clone()
        .or(file.output_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((config, output_dir))
}

/// Write every generated file into `output_dir`.
pub fn write_output(output: &GenerationOutput, output_dir: &Path) -> Result<()> {
    if output.files.is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;
    for file in &output.files {
        let path = output_dir.join(&file.name);
        std::fs::write(&path, &file.contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote");
    }
    Ok(())
}

/// Report diagnostics and failures on stderr; returns the exit code.
pub fn report(output: &GenerationOutput) -> u8 {
    for diagnostic in output.diagnostics.iter() {
        eprintln!("{diagnostic}");
    }
    for failure in &output.failures {
        eprintln!("{}: {}", failure.group_kind, failure.message);
    }
    u8::from(!output.is_clean())
}

/// Execute the generate subcommand.
pub fn run_generate(args: &GenerateArgs) -> Result<u8> {
    let (config, output_dir) = resolve_config(args)?;
    let generator = Generator::new(config)?;
    let program = load_program(&args.program)?;

    let output = generator.generate(&program);

    if args.dry_run {
        for file in &output.files {
            println!("# {}", file.name);
            print!("{}", file.contents);
        }
    } else {
        write_output(&output, &output_dir)?;
        println!(
            "Generated {} file(s) in {}",
            output.files.len(),
            output_dir.display()
        );
    }

    Ok(report(&output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_override_config_file() {
        let mut cfg = tempfile::NamedTempFile::new().unwrap();
        writeln!(cfg, "maxDescLen: 10\nyear: \"1999\"\noutputDir: from-file").unwrap();
        let args = GenerateArgs {
            config: Some(cfg.path().to_path_buf()),
            max_desc_len: Some(0),
            ..GenerateArgs::default()
        };
        let (config, output_dir) = resolve_config(&args).unwrap();
        assert_eq!(config.max_desc_len, Some(0));
        assert_eq!(config.year, "1999");
        assert_eq!(output_dir, PathBuf::from("from-file"));
    }

    #[test]
    fn test_year_defaults_to_current() {
        let (config, output_dir) = resolve_config(&GenerateArgs::default()).unwrap();
        assert_eq!(config.year, chrono::Utc::now().year().to_string());
        assert_eq!(output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_header_file_read() {
        let mut header = tempfile::NamedTempFile::new().unwrap();
        writeln!(header, "# Copyright YEAR.").unwrap();
        let args = GenerateArgs {
            header_file: Some(header.path().to_path_buf()),
            year: Some("2030".into()),
            ..GenerateArgs::default()
        };
        let (config, _) = resolve_config(&args).unwrap();
        assert_eq!(config.header_text(), "# Copyright 2030.\n");
    }

    #[test]
    fn test_unsupported_xrd_version() {
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("program.yaml");
        std::fs::write(&program, "packages: []\n").unwrap();
        let args = GenerateArgs {
            program,
            xrd_versions: vec!["v1beta1".into()],
            ..GenerateArgs::default()
        };
        let err = run_generate(&args).unwrap_err();
        assert!(err.to_string().contains("unsupported XRD version"));
    }
}
