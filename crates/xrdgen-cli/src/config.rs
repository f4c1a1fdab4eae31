//! # Configuration File
//!
//! Optional YAML file holding generator options plus the CLI-only header
//! file and output directory. Keys are camelCase:
//!
//! ```yaml
//! maxDescLen: 120
//! allowDangerousTypes: false
//! xrdVersions: [v1]
//! headerFile: hack/boilerplate.go.txt
//! outputDir: package/xrds
//! ```
//!
//! Command-line flags override values read from the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use xrdgen_engine::GeneratorConfig;

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CliConfig {
    /// Generator options.
    #[serde(flatten)]
    pub generator: GeneratorConfig,
    /// File whose contents become the header.
    pub header_file: Option<PathBuf>,
    /// Directory generated files are written to.
    pub output_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: CliConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flattened_generator_options() {
        let text = "maxDescLen: 80\nheaderFile: hack/header.txt\nyear: \"2025\"\n";
        let config: CliConfig = serde_yaml::from_str(text).unwrap();
        assert_eq!(config.generator.max_desc_len, Some(80));
        assert_eq!(config.generator.year, "2025");
        assert_eq!(config.header_file, Some(PathBuf::from("hack/header.txt")));
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: CliConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, CliConfig::default());
    }
}
