//! # Built-in Markers
//!
//! Markers understood by the resource definition generator.
//!
//! | Marker | Role | Effect |
//! |---|---|---|
//! | `kubebuilder:storageversion` | document | declaring version becomes referenceable |
//! | `kubebuilder:unservedversion` | document | declaring version is not served |
//! | `kubebuilder:deprecatedversion` | document | declaring version is deprecated |
//! | `kubebuilder:printcolumn` | document | adds a printer column to the declaring version |
//! | `kubebuilder:resource` | spec | overrides resource names |
//! | `kubebuilder:claim` | spec | sets claim names |
//! | `kubebuilder:defaultcompositionref` | spec | sets the default or enforced composition |
//! | `kubebuilder:connectionsecretkeys` | spec | appends connection secret keys |

use serde::Deserialize;

use super::registry::{AnnotationSource, Definition, MarkerHelp, RegistryBuilder, RegistryError};
use super::{AnnotationError, DocumentMutator, SpecMutator};
use crate::document::{
    CompositionReference, PrinterColumn, ResourceDocument, ResourceNames, ResourceSpec,
};
use crate::naming::pluralize;

const CATEGORY: &str = "XRD";

pub const STORAGE_VERSION: &str = "kubebuilder:storageversion";
pub const UNSERVED_VERSION: &str = "kubebuilder:unservedversion";
pub const DEPRECATED_VERSION: &str = "kubebuilder:deprecatedversion";
pub const PRINT_COLUMN: &str = "kubebuilder:printcolumn";
pub const RESOURCE: &str = "kubebuilder:resource";
pub const CLAIM: &str = "kubebuilder:claim";
pub const DEFAULT_COMPOSITION_REF: &str = "kubebuilder:defaultcompositionref";
pub const CONNECTION_SECRET_KEYS: &str = "kubebuilder:connectionsecretkeys";

/// Source registering every built-in marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct XrdMarkers;

impl AnnotationSource for XrdMarkers {
    fn register(&self, builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
        builder
            .register(Definition::document::<StorageVersion>(STORAGE_VERSION).with_help(StorageVersion::help()))?
            .register(Definition::document::<UnservedVersion>(UNSERVED_VERSION).with_help(UnservedVersion::help()))?
            .register(Definition::document::<DeprecatedVersion>(DEPRECATED_VERSION).with_help(DeprecatedVersion::help()))?
            .register(Definition::document::<PrintColumn>(PRINT_COLUMN).with_help(PrintColumn::help()))?
            .register(Definition::spec::<Resource>(RESOURCE).with_help(Resource::help()))?
            .register(Definition::spec::<Claim>(CLAIM).with_help(Claim::help()))?
            .register(
                Definition::spec::<DefaultCompositionRef>(DEFAULT_COMPOSITION_REF)
                    .with_help(DefaultCompositionRef::help()),
            )?
            .register(
                Definition::spec::<ConnectionSecretKeys>(CONNECTION_SECRET_KEYS)
                    .with_help(ConnectionSecretKeys::help()),
            )?;
        Ok(())
    }
}

// ─── Version markers ────────────────────────────────────────────────

/// Marks the declaring version as the referenceable (storage) version.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageVersion {}

impl StorageVersion {
    pub fn help() -> MarkerHelp {
        MarkerHelp::new(
            CATEGORY,
            "marks the version of an XRD that compositions reference, i.e. its storage version",
        )
    }
}

impl DocumentMutator for StorageVersion {
    fn apply_to_document(
        &self,
        doc: &mut ResourceDocument,
        version: &str,
    ) -> Result<(), AnnotationError> {
        // Without a version context there is a single version, which is
        // defaulted to referenceable after assembly.
        if version.is_empty() {
            return Ok(());
        }
        if let Some(entry) = doc.spec.version_mut(version) {
            entry.referenceable = true;
        }
        Ok(())
    }
}

/// Stops the declaring version from being served.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnservedVersion {}

impl UnservedVersion {
    pub fn help() -> MarkerHelp {
        MarkerHelp::new(CATEGORY, "does not serve this version")
    }
}

impl DocumentMutator for UnservedVersion {
    fn apply_to_document(
        &self,
        doc: &mut ResourceDocument,
        version: &str,
    ) -> Result<(), AnnotationError> {
        if let Some(entry) = doc.spec.version_mut(version) {
            entry.served = false;
        }
        Ok(())
    }
}

/// Marks the declaring version deprecated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeprecatedVersion {
    /// Message returned to clients using the version.
    #[serde(default)]
    pub warning: Option<String>,
}

impl DeprecatedVersion {
    pub fn help() -> MarkerHelp {
        MarkerHelp::new(CATEGORY, "marks this version as deprecated")
            .field("warning", "message to be shown on the deprecated version")
    }
}

impl DocumentMutator for DeprecatedVersion {
    fn apply_to_document(
        &self,
        doc: &mut ResourceDocument,
        version: &str,
    ) -> Result<(), AnnotationError> {
        if let Some(entry) = doc.spec.version_mut(version) {
            entry.deprecated = Some(true);
            if self.warning.is_some() {
                entry.deprecation_warning = self.warning.clone();
            }
        }
        Ok(())
    }
}

/// Adds a column to table output of the declaring version.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrintColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(rename = "JSONPath")]
    pub json_path: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub priority: i32,
}

impl PrintColumn {
    pub fn help() -> MarkerHelp {
        MarkerHelp::new(CATEGORY, "adds a column to \"kubectl get\" output for this version")
            .field("name", "column header")
            .field("type", "OpenAPI type of the column: integer, number, string, boolean or date")
            .field("JSONPath", "JSON path evaluated against each object")
            .field("description", "human-readable column description")
            .field("format", "optional OpenAPI format of the column")
            .field("priority", "column importance; 0 is shown in the standard view")
    }
}

const COLUMN_TYPES: &[&str] = &["integer", "number", "string", "boolean", "date"];

impl DocumentMutator for PrintColumn {
    fn apply_to_document(
        &self,
        doc: &mut ResourceDocument,
        version: &str,
    ) -> Result<(), AnnotationError> {
        if !COLUMN_TYPES.contains(&self.column_type.as_str()) {
            return Err(AnnotationError::InvalidValue {
                marker: PRINT_COLUMN.to_string(),
                reason: format!("unknown column type {:?}", self.column_type),
            });
        }
        if let Some(entry) = doc.spec.version_mut(version) {
            entry.additional_printer_columns.push(PrinterColumn {
                name: self.name.clone(),
                column_type: self.column_type.clone(),
                format: self.format.clone(),
                description: self.description.clone(),
                priority: self.priority,
                json_path: self.json_path.clone(),
            });
        }
        Ok(())
    }
}

// ─── Spec markers ───────────────────────────────────────────────────

/// Overrides the resource names of the defined resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Resource {
    /// Plural resource name.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub singular: Option<String>,
    #[serde(default)]
    pub short_name: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Composite resources are always cluster scoped.
    #[serde(default)]
    pub scope: Option<String>,
}

impl Resource {
    pub fn help() -> MarkerHelp {
        MarkerHelp::new(CATEGORY, "configures naming of the defined composite resource")
            .field("path", "plural resource name")
            .field("singular", "singular resource name")
            .field("shortName", "short aliases")
            .field("categories", "resource categories, e.g. crossplane")
            .field("scope", "must be Cluster when given")
    }
}

impl SpecMutator for Resource {
    fn apply_to_spec(&self, spec: &mut ResourceSpec) -> Result<(), AnnotationError> {
        if let Some(scope) = self.scope.as_deref() {
            if scope != "Cluster" {
                return Err(AnnotationError::InvalidValue {
                    marker: RESOURCE.to_string(),
                    reason: format!("composite resources are cluster scoped, got scope {scope:?}"),
                });
            }
        }
        if let Some(path) = self.path.as_deref().filter(|p| !p.is_empty()) {
            spec.names.plural = path.to_string();
        }
        if let Some(singular) = self.singular.as_deref().filter(|s| !s.is_empty()) {
            spec.names.singular = singular.to_string();
        }
        if !self.short_name.is_empty() {
            spec.names.short_names = self.short_name.clone();
        }
        if !self.categories.is_empty() {
            spec.names.categories = self.categories.clone();
        }
        Ok(())
    }
}

/// Requests a namespaced claim resource for the defined resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Claim {
    #[serde(default)]
    pub singular: String,
    #[serde(default)]
    pub plural: String,
    #[serde(default)]
    pub short_names: Vec<String>,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub list_kind: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Claim {
    pub fn help() -> MarkerHelp {
        MarkerHelp::new(CATEGORY, "the XRD provides a namespaced claim resource")
            .field("singular", "singular claim name; required")
            .field("plural", "plural claim name; defaults to the plural of singular")
            .field("shortNames", "short aliases of the claim")
            .field("kind", "claim kind; required")
            .field("listKind", "claim list kind; defaults to kind + \"List\"")
            .field("categories", "claim categories")
    }
}

impl SpecMutator for Claim {
    fn apply_to_spec(&self, spec: &mut ResourceSpec) -> Result<(), AnnotationError> {
        if self.singular.is_empty() {
            return Err(AnnotationError::MissingField {
                marker: CLAIM,
                field: "singular",
            });
        }
        if self.kind.is_empty() {
            return Err(AnnotationError::MissingField {
                marker: CLAIM,
                field: "kind",
            });
        }
        let plural = if self.plural.is_empty() {
            pluralize(&self.singular)
        } else {
            self.plural.clone()
        };
        let list_kind = if self.list_kind.is_empty() {
            format!("{}List", self.kind)
        } else {
            self.list_kind.clone()
        };
        spec.claim_names = Some(ResourceNames {
            plural,
            singular: self.singular.clone(),
            short_names: self.short_names.clone(),
            kind: self.kind.clone(),
            list_kind,
            categories: self.categories.clone(),
        });
        Ok(())
    }
}

/// Names the composition used when none is selected, or that every
/// instance must use when `enforced`. A kind carries at most one of the two.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultCompositionRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enforced: bool,
}

impl DefaultCompositionRef {
    pub fn help() -> MarkerHelp {
        MarkerHelp::new(CATEGORY, "composition used for instances of this XRD")
            .field("name", "composition name; required")
            .field("enforced", "every instance must use this composition")
    }
}

impl SpecMutator for DefaultCompositionRef {
    fn apply_to_spec(&self, spec: &mut ResourceSpec) -> Result<(), AnnotationError> {
        if self.name.is_empty() {
            return Err(AnnotationError::MissingField {
                marker: DEFAULT_COMPOSITION_REF,
                field: "name",
            });
        }
        let existing = spec
            .default_composition_ref
            .as_ref()
            .map(|r| ("default", r))
            .or_else(|| spec.enforced_composition_ref.as_ref().map(|r| ("enforced", r)));
        if let Some((label, existing)) = existing {
            return Err(AnnotationError::Conflict {
                marker: DEFAULT_COMPOSITION_REF,
                message: format!(
                    "{label} composition is already set to {:?}, cannot set it to {:?}",
                    existing.name, self.name
                ),
            });
        }
        let slot = if self.enforced {
            &mut spec.enforced_composition_ref
        } else {
            &mut spec.default_composition_ref
        };
        *slot = Some(CompositionReference {
            name: self.name.clone(),
        });
        Ok(())
    }
}

/// Connection secret keys exposed to users of the defined resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionSecretKeys {
    #[serde(default)]
    pub keys: Vec<String>,
}

impl ConnectionSecretKeys {
    pub fn help() -> MarkerHelp {
        MarkerHelp::new(CATEGORY, "connection secret keys exposed to users; empty exposes all")
            .field("keys", "key names")
    }
}

impl SpecMutator for ConnectionSecretKeys {
    fn apply_to_spec(&self, spec: &mut ResourceSpec) -> Result<(), AnnotationError> {
        for key in &self.keys {
            if !spec.connection_secret_keys.contains(key) {
                spec.connection_secret_keys.push(key.clone());
            }
        }
        Ok(())
    }
}
