//! # Generator
//!
//! Drives the whole pipeline over one program and renders every document
//! in memory. Writing files is left to the caller.
//!
//! ```text
//! envelope imported? ──▶ classify ──▶ assemble each kind
//!        │                                 │
//!        ▼                                 ▼
//!   nothing to do             strip status, reset metadata ──▶ render YAML
//! ```
//!
//! ## Configuration
//!
//! [`GeneratorConfig`] deserializes from camelCase keys:
//!
//! | Key | Default | Meaning |
//! |---|---|---|
//! | `ignoreUnexportedFields` | `false` | skip lowercase fields |
//! | `allowDangerousTypes` | `false` | accept float fields |
//! | `maxDescLen` | unset | truncate descriptions; `0` drops them |
//! | `xrdVersions` | `[v1]` | document API versions; only `v1` exists |
//! | `generateEmbeddedObjectMeta` | `false` | richer nested object metadata |
//! | `header` | empty | text prepended to each file |
//! | `year` | empty | replaces ` YEAR` in the header |

use serde::{Deserialize, Serialize};
use thiserror::Error;
use xrdgen_core::{Diagnostics, GroupKind, Program};
use xrdgen_schema::{
    fix_top_level_metadata, strip_status_property, SchemaOptions, StructuralSchemaProvider,
};

use crate::annotation::{AnnotationRegistry, RegistryError};
use crate::assemble::Assembler;
use crate::classify::{find_resource_kinds, Envelope};
use crate::document::ResourceDocument;
use crate::emit::{remove_status, render_yaml};

/// The only supported document API version.
pub const XRD_VERSION_V1: &str = "v1";

/// Failure setting up a generator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// A requested document API version is not supported.
    #[error("unsupported XRD version {0:?}; only \"v1\" is supported")]
    UnsupportedVersion(String),

    /// The annotation registry could not be built.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Generation options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    /// Skip fields whose names start with a lowercase letter.
    pub ignore_unexported_fields: bool,
    /// Accept `float32`/`float64` fields.
    pub allow_dangerous_types: bool,
    /// Maximum description length; `Some(0)` drops descriptions.
    pub max_desc_len: Option<usize>,
    /// Document API versions to generate. Empty means `[v1]`.
    pub xrd_versions: Vec<String>,
    /// Render nested object metadata with its common fields.
    pub generate_embedded_object_meta: bool,
    /// Header text prepended to every file.
    pub header: String,
    /// Substituted for ` YEAR` in the header.
    pub year: String,
}

impl GeneratorConfig {
    /// Requested document versions, defaulting to `[v1]`.
    pub fn effective_xrd_versions(&self) -> Vec<String> {
        if self.xrd_versions.is_empty() {
            vec![XRD_VERSION_V1.to_string()]
        } else {
            self.xrd_versions.clone()
        }
    }

    /// Header with ` YEAR` replaced by the configured year.
    pub fn header_text(&self) -> String {
        self.header.replace(" YEAR", &format!(" {}", self.year))
    }

    fn schema_options(&self) -> SchemaOptions {
        SchemaOptions {
            ignore_unexported_fields: self.ignore_unexported_fields,
            allow_dangerous_types: self.allow_dangerous_types,
            generate_embedded_object_meta: self.generate_embedded_object_meta,
        }
    }
}

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// Kind the file defines.
    pub group_kind: GroupKind,
    /// File name, `<group>_<plural>.yaml`.
    pub name: String,
    /// Full file contents.
    pub contents: String,
}

/// A kind that could not be generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindFailure {
    /// Kind that failed.
    pub group_kind: GroupKind,
    /// Why.
    pub message: String,
}

/// Everything one run produced.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    /// Rendered files in kind order.
    pub files: Vec<GeneratedFile>,
    /// Located, non-fatal problems.
    pub diagnostics: Diagnostics,
    /// Kinds that were skipped because of a hard error.
    pub failures: Vec<KindFailure>,
}

impl GenerationOutput {
    /// True if nothing was reported.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.failures.is_empty()
    }
}

/// Resource definition generator with a fixed configuration and registry.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    registry: AnnotationRegistry,
    envelope: Envelope,
}

impl Generator {
    /// A generator using the built-in markers.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerateError> {
        Self::with_registry(config, AnnotationRegistry::with_defaults()?)
    }

    /// A generator using a caller-built registry.
    pub fn with_registry(
        config: GeneratorConfig,
        registry: AnnotationRegistry,
    ) -> Result<Self, GenerateError> {
        if let Some(v) = config
            .effective_xrd_versions()
            .into_iter()
            .find(|v| v != XRD_VERSION_V1)
        {
            return Err(GenerateError::UnsupportedVersion(v));
        }
        Ok(Self {
            config,
            registry,
            envelope: Envelope::default(),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The annotation registry.
    pub fn registry(&self) -> &AnnotationRegistry {
        &self.registry
    }

    /// Resource kinds in `program`, in generation order.
    pub fn kinds(&self, program: &Program) -> Vec<GroupKind> {
        if !self.envelope.is_imported_by(program) {
            return Vec::new();
        }
        find_resource_kinds(program, &self.envelope)
    }

    /// Generate every resource definition in `program`.
    pub fn generate(&self, program: &Program) -> GenerationOutput {
        let mut output = GenerationOutput::default();
        if !self.envelope.is_imported_by(program) {
            tracing::info!(envelope = %self.envelope.package, "no package imports the envelope package; nothing to generate");
            return output;
        }
        let kinds = find_resource_kinds(program, &self.envelope);
        if kinds.is_empty() {
            tracing::info!("no resource kinds found");
            return output;
        }

        let header = self.config.header_text();
        let provider = StructuralSchemaProvider::new(program, self.config.schema_options());
        let mut assembler = Assembler::new(program, &self.registry, provider);

        for group_kind in &kinds {
            let doc = match assembler.assemble(group_kind, self.config.max_desc_len) {
                Ok(Some(doc)) => prepare(doc),
                Ok(None) => continue,
                Err(err) => {
                    tracing::error!(group_kind = %group_kind, "{err}");
                    output.failures.push(KindFailure {
                        group_kind: group_kind.clone(),
                        message: err.to_string(),
                    });
                    continue;
                }
            };
            match render_yaml(&header, &doc, &[remove_status]) {
                Ok(contents) => {
                    tracing::info!(group_kind = %group_kind, file = %doc.file_name(), "generated");
                    output.files.push(GeneratedFile {
                        group_kind: group_kind.clone(),
                        name: doc.file_name(),
                        contents,
                    });
                }
                Err(err) => output.failures.push(KindFailure {
                    group_kind: group_kind.clone(),
                    message: err.to_string(),
                }),
            }
        }

        let (_, diagnostics) = assembler.into_parts();
        output.diagnostics = diagnostics;
        output
    }
}

/// Copy of `doc` with version schemas ready for emission.
fn prepare(doc: &ResourceDocument) -> ResourceDocument {
    let mut doc = doc.clone();
    for version in &mut doc.spec.versions {
        if let Some(root) = version.root_schema_mut() {
            strip_status_property(root);
            fix_top_level_metadata(root);
        }
    }
    doc
}
