//! # Markers Subcommand
//!
//! Prints help for every registered marker, grouped by category.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::Result;
use clap::Args;
use xrdgen_engine::{AnnotationRegistry, MarkerHelp};

/// Arguments for the markers subcommand.
#[derive(Args, Debug, Default)]
pub struct MarkersArgs {
    /// Only show markers in this category.
    #[arg(long)]
    pub category: Option<String>,
}

/// Render help for the markers in `registry`.
pub fn render_help(registry: &AnnotationRegistry, category: Option<&str>) -> String {
    let mut by_category: BTreeMap<&str, Vec<(&str, &MarkerHelp)>> = BTreeMap::new();
    for def in registry.definitions() {
        if let Some(help) = def.help() {
            by_category
                .entry(help.category.as_str())
                .or_default()
                .push((def.name(), help));
        }
    }

    let mut out = String::new();
    for (cat, markers) in by_category {
        if category.is_some_and(|c| c != cat) {
            continue;
        }
        let _ = writeln!(out, "{cat}");
        for (name, help) in markers {
            let _ = writeln!(out, "  +{name}");
            let _ = writeln!(out, "      {}", help.summary);
            for (field, text) in &help.fields {
                let _ = writeln!(out, "      {field:<12} {text}");
            }
        }
        out.push('\n');
    }
    out
}

/// Execute the markers subcommand.
pub fn run_markers(args: &MarkersArgs) -> Result<u8> {
    let registry = AnnotationRegistry::with_defaults()?;
    print!("{}", render_help(&registry, args.category.as_deref()));
    Ok(0)
}
