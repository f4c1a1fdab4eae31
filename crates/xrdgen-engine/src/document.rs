//! # Resource Document Model
//!
//! The in-memory composite resource definition produced per resource kind.
//! Field names serialize in the camelCase form the API server expects.
//!
//! ```text
//! ResourceDocument
//! ├── apiVersion / kind          (fixed document type tag)
//! ├── metadata.name              (always <plural>.<group>)
//! └── spec (ResourceSpec)
//!     ├── group
//!     ├── names / claimNames     (ResourceNames)
//!     ├── connectionSecretKeys
//!     ├── defaultCompositionRef / enforcedCompositionRef
//!     └── versions[]             (VersionEntry, sorted by name)
//! ```

use serde::{Deserialize, Serialize};
use xrdgen_core::GroupKind;
use xrdgen_schema::SchemaNode;

/// API version of the emitted document type.
pub const DOCUMENT_API_VERSION: &str = "apiextensions.crossplane.io/v1";
/// Kind of the emitted document type.
pub const DOCUMENT_KIND: &str = "CompositeResourceDefinition";

/// Resource and kind names of a defined resource or its claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNames {
    /// Lowercase plural resource name; forms the document name.
    pub plural: String,
    /// Lowercase singular name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub singular: String,
    /// Short aliases.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_names: Vec<String>,
    /// CamelCase kind.
    pub kind: String,
    /// CamelCase list kind.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub list_kind: String,
    /// Grouped resource categories, e.g. `all`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

/// Reference to a composition by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionReference {
    /// Composition name.
    pub name: String,
}

/// An additional column shown in table output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterColumn {
    /// Column header.
    pub name: String,
    /// OpenAPI type of the column value.
    #[serde(rename = "type")]
    pub column_type: String,
    /// Optional format of the column value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Relative importance; zero is shown in standard view.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub priority: i32,
    /// JSON path evaluated against each object.
    pub json_path: String,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

/// Schema wrapper of a version entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSchema {
    /// OpenAPI v3 validation schema.
    #[serde(rename = "openAPIV3Schema")]
    pub open_api_v3_schema: SchemaNode,
}

/// One served version of the defined resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    /// Version name, e.g. `v1beta1`.
    pub name: String,
    /// Whether compositions may reference this version. Exactly one
    /// version of a document is referenceable.
    pub referenceable: bool,
    /// Whether the version is served over the REST API.
    pub served: bool,
    /// Whether the version is deprecated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    /// Warning returned to clients using a deprecated version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation_warning: Option<String>,
    /// Validation schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<VersionSchema>,
    /// Extra table columns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_printer_columns: Vec<PrinterColumn>,
}

impl VersionEntry {
    /// A served, non-referenceable version carrying `schema`.
    pub fn new(name: impl Into<String>, schema: SchemaNode) -> Self {
        Self {
            name: name.into(),
            referenceable: false,
            served: true,
            deprecated: None,
            deprecation_warning: None,
            schema: Some(VersionSchema {
                open_api_v3_schema: schema,
            }),
            additional_printer_columns: Vec::new(),
        }
    }

    /// The root schema, if any.
    pub fn root_schema_mut(&mut self) -> Option<&mut SchemaNode> {
        self.schema.as_mut().map(|s| &mut s.open_api_v3_schema)
    }
}

/// Version-agnostic body of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    /// API group of the defined resource.
    pub group: String,
    /// Names of the defined resource.
    pub names: ResourceNames,
    /// Names of the optional namespaced claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_names: Option<ResourceNames>,
    /// Connection secret keys exposed to users; empty publishes all keys.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connection_secret_keys: Vec<String>,
    /// Composition used when no selector is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_composition_ref: Option<CompositionReference>,
    /// Composition every instance must use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforced_composition_ref: Option<CompositionReference>,
    /// Versions, sorted by name before emission.
    pub versions: Vec<VersionEntry>,
}

impl ResourceSpec {
    /// The version entry named `name`.
    pub fn version_mut(&mut self, name: &str) -> Option<&mut VersionEntry> {
        self.versions.iter_mut().find(|v| v.name == name)
    }

    /// The version entry named `name`.
    pub fn version(&self, name: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.name == name)
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Document name.
    pub name: String,
}

/// A composite resource definition for one resource kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDocument {
    /// Document type API version.
    pub api_version: String,
    /// Document type kind.
    pub kind: String,
    /// Document metadata.
    pub metadata: ObjectMeta,
    /// Definition body.
    pub spec: ResourceSpec,
}

impl ResourceDocument {
    /// A document for `group_kind` with the given names and no versions.
    pub fn new(group_kind: &GroupKind, names: ResourceNames) -> Self {
        let mut doc = Self {
            api_version: DOCUMENT_API_VERSION.to_string(),
            kind: DOCUMENT_KIND.to_string(),
            metadata: ObjectMeta::default(),
            spec: ResourceSpec {
                group: group_kind.group.clone(),
                names,
                claim_names: None,
                connection_secret_keys: Vec::new(),
                default_composition_ref: None,
                enforced_composition_ref: None,
                versions: Vec::new(),
            },
        };
        doc.recompute_name();
        doc
    }

    /// The document name, `<plural>.<group>`.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Recompute the name from the current plural and group.
    pub fn recompute_name(&mut self) {
        self.metadata.name = format!("{}.{}", self.spec.names.plural, self.spec.group);
    }

    /// Output file name, `<group>_<plural>.yaml`.
    pub fn file_name(&self) -> String {
        format!("{}_{}.yaml", self.spec.group, self.spec.names.plural)
    }
}
