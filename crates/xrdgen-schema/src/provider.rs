//! # Schema Provider
//!
//! Produces a fully flattened [`SchemaNode`] for a declared type. Every
//! named type reachable from the root is inlined; the result contains no
//! references.
//!
//! ## Caching
//!
//! [`StructuralSchemaProvider`] memoizes one tree per [`TypeIdentity`].
//! [`SchemaProvider::schema_for`] hands the cached tree out by shared
//! reference; callers that need to edit a tree (truncating descriptions,
//! stripping status) clone it first.
//!
//! ## Field Rules
//!
//! - Fields without a `json` tag have custom serialization and are skipped,
//!   as are fields tagged `json:"-"`.
//! - With `ignore_unexported_fields`, lowercase fields are skipped.
//! - Embedded fields with no json name, and `inline` fields, merge their
//!   properties into the parent.
//! - A field is required unless it is `omitempty` or marked `optional`.
//!
//! ## Well-Known Types
//!
//! Types from the object-meta, intstr and runtime packages have fixed
//! schemas and are never looked up in the program.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use thiserror::Error;
use xrdgen_core::{Field, MarkerValue, Program, TypeBody, TypeDecl, TypeIdentity, TypeRef};

use crate::node::SchemaNode;

/// Package holding the standard object envelope types.
pub const META_V1_PACKAGE: &str = "k8s.io/apimachinery/pkg/apis/meta/v1";
const INTSTR_PACKAGE: &str = "k8s.io/apimachinery/pkg/util/intstr";
const RUNTIME_PACKAGE: &str = "k8s.io/apimachinery/pkg/runtime";

const API_VERSION_DESCRIPTION: &str = "APIVersion defines the versioned schema of this \
representation of an object. Servers should convert recognized schemas to the latest internal \
value, and may reject unrecognized values.";
const KIND_DESCRIPTION: &str = "Kind is a string value representing the REST resource this \
object represents. Servers may infer this from the endpoint the client submits requests to. \
Cannot be updated. In CamelCase.";

/// Error producing a schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The type is neither declared in the program nor well known.
    #[error("unknown type {0}")]
    UnknownType(TypeIdentity),

    /// The type contains itself.
    #[error("type {0} refers to itself; recursive types are not supported")]
    Recursive(TypeIdentity),

    /// A floating point type was used without `allow_dangerous_types`.
    #[error("{context}: {type_name} is not allowed unless dangerous types are enabled")]
    DangerousType {
        /// Type being converted.
        context: TypeIdentity,
        /// Offending builtin.
        type_name: String,
    },

    /// A map key is not a string.
    #[error("{context}: map keys must be strings")]
    NonStringMapKey {
        /// Type being converted.
        context: TypeIdentity,
    },

    /// A validation marker carries a value of the wrong shape.
    #[error("{context}: invalid value for marker {marker}: expected {expected}")]
    InvalidMarker {
        /// Type being converted.
        context: TypeIdentity,
        /// Marker name.
        marker: String,
        /// Expected value shape.
        expected: &'static str,
    },

    /// The construct has no schema representation.
    #[error("{context}: {reason}")]
    Unsupported {
        /// Type being converted.
        context: TypeIdentity,
        /// Why it is unsupported.
        reason: String,
    },
}

/// Knobs controlling schema generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaOptions {
    /// Skip fields whose names start with a lowercase letter.
    pub ignore_unexported_fields: bool,
    /// Accept `float32`/`float64` fields.
    pub allow_dangerous_types: bool,
    /// Render nested object metadata with its common fields instead of a bare object.
    pub generate_embedded_object_meta: bool,
}

/// Source of flattened schemas, keyed by type identity.
pub trait SchemaProvider {
    /// The flattened schema for `ident`.
    ///
    /// The returned tree is shared with the provider's cache and must be
    /// cloned before it is modified.
    fn schema_for(&mut self, ident: &TypeIdentity) -> Result<&SchemaNode, SchemaError>;
}

/// Schema provider that flattens declarations from a loaded [`Program`].
#[derive(Debug)]
pub struct StructuralSchemaProvider<'p> {
    program: &'p Program,
    options: SchemaOptions,
    cache: HashMap<TypeIdentity, SchemaNode>,
    in_progress: HashSet<TypeIdentity>,
}

impl<'p> StructuralSchemaProvider<'p> {
    /// A provider over `program` with an empty cache.
    pub fn new(program: &'p Program, options: SchemaOptions) -> Self {
        Self {
            program,
            options,
            cache: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Number of memoized trees.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Schema for a named type, memoized.
    fn named_schema(&mut self, ident: &TypeIdentity) -> Result<SchemaNode, SchemaError> {
        if let Some(node) = self.cache.get(ident) {
            return Ok(node.clone());
        }
        if let Some(node) = self.well_known(ident) {
            self.cache.insert(ident.clone(), node.clone());
            return Ok(node);
        }
        let program = self.program;
        let decl = program
            .type_decl(ident)
            .ok_or_else(|| SchemaError::UnknownType(ident.clone()))?;
        if !self.in_progress.insert(ident.clone()) {
            return Err(SchemaError::Recursive(ident.clone()));
        }
        let result = self.decl_schema(ident, decl);
        self.in_progress.remove(ident);
        let node = result?;
        self.cache.insert(ident.clone(), node.clone());
        Ok(node)
    }

    fn decl_schema(
        &mut self,
        ident: &TypeIdentity,
        decl: &TypeDecl,
    ) -> Result<SchemaNode, SchemaError> {
        let mut node = match &decl.body {
            TypeBody::Struct { fields } => self.struct_schema(ident, fields)?,
            TypeBody::Alias { target } => self.type_ref_schema(ident, target)?,
            TypeBody::Interface => {
                return Err(SchemaError::Unsupported {
                    context: ident.clone(),
                    reason: "interface types have no schema".to_string(),
                })
            }
        };
        apply_validation_markers(ident, &decl.markers, &mut node)?;
        if let Some(doc) = decl.doc.as_deref() {
            node.description = doc.trim().to_string();
        }
        Ok(node)
    }

    fn struct_schema(
        &mut self,
        ident: &TypeIdentity,
        fields: &[Field],
    ) -> Result<SchemaNode, SchemaError> {
        let mut node = SchemaNode::object();
        for field in fields {
            // No json tag means custom serialization.
            let Some(tag) = field.json_tag() else {
                continue;
            };
            if tag.skip {
                continue;
            }
            if self.options.ignore_unexported_fields && !field.is_exported() {
                continue;
            }

            let mut schema = self.type_ref_schema(ident, &field.ty)?;

            if tag.inline || (field.is_embedded() && tag.name.is_empty()) {
                for name in schema.required {
                    if !node.required.contains(&name) {
                        node.required.push(name);
                    }
                }
                node.properties.extend(schema.properties);
                continue;
            }

            let name = if tag.name.is_empty() {
                field.name.clone().unwrap_or_default()
            } else {
                tag.name.clone()
            };

            apply_validation_markers(ident, &field.markers, &mut schema)?;
            if let Some(doc) = field.doc.as_deref() {
                schema.description = doc.trim().to_string();
            }

            let optional = tag.omit_empty
                || field.marker("optional").is_some()
                || field.marker("kubebuilder:validation:Optional").is_some();
            let required =
                field.marker("kubebuilder:validation:Required").is_some() || !optional;
            if required && !node.required.contains(&name) {
                node.required.push(name.clone());
            }
            node.properties.insert(name, schema);
        }
        Ok(node)
    }

    fn type_ref_schema(
        &mut self,
        context: &TypeIdentity,
        ty: &TypeRef,
    ) -> Result<SchemaNode, SchemaError> {
        match ty {
            TypeRef::Named {
                package: Some(package),
                name,
            } => self.named_schema(&TypeIdentity {
                package: package.non_vendor(),
                name: name.clone(),
            }),
            TypeRef::Named {
                package: None,
                name,
            } => {
                let local = TypeIdentity {
                    package: context.package.clone(),
                    name: name.clone(),
                };
                if self.program.type_decl(&local).is_none() {
                    return Err(SchemaError::Unsupported {
                        context: context.clone(),
                        reason: format!("universe type {name} has no schema"),
                    });
                }
                self.named_schema(&local)
            }
            TypeRef::Builtin { name } => self.builtin_schema(context, name),
            TypeRef::Pointer { elem } => self.type_ref_schema(context, elem),
            TypeRef::Slice { elem } => {
                if matches!(elem.as_ref(), TypeRef::Builtin { name } if name == "byte" || name == "uint8")
                {
                    return Ok(SchemaNode::string().with_format("byte"));
                }
                let mut node = SchemaNode::typed("array");
                node.items = Some(Box::new(self.type_ref_schema(context, elem)?));
                Ok(node)
            }
            TypeRef::Map { key, value } => {
                let key_schema = self.type_ref_schema(context, key)?;
                if key_schema.schema_type.as_deref() != Some("string") {
                    return Err(SchemaError::NonStringMapKey {
                        context: context.clone(),
                    });
                }
                let mut node = SchemaNode::object();
                node.additional_properties = Some(Box::new(self.type_ref_schema(context, value)?));
                Ok(node)
            }
            TypeRef::Interface => Ok(SchemaNode {
                preserve_unknown_fields: Some(true),
                ..SchemaNode::object()
            }),
        }
    }

    fn builtin_schema(&self, context: &TypeIdentity, name: &str) -> Result<SchemaNode, SchemaError> {
        let node = match name {
            "string" => SchemaNode::string(),
            "bool" => SchemaNode::typed("boolean"),
            "int" | "uint" => SchemaNode::typed("integer"),
            "int8" | "int16" | "int32" | "uint8" | "uint16" | "byte" | "rune" => {
                SchemaNode::typed("integer").with_format("int32")
            }
            "int64" | "uint32" | "uint64" => SchemaNode::typed("integer").with_format("int64"),
            "float32" | "float64" => {
                if !self.options.allow_dangerous_types {
                    return Err(SchemaError::DangerousType {
                        context: context.clone(),
                        type_name: name.to_string(),
                    });
                }
                SchemaNode::typed("number")
            }
            other => {
                return Err(SchemaError::Unsupported {
                    context: context.clone(),
                    reason: format!("builtin type {other} has no schema"),
                })
            }
        };
        Ok(node)
    }

    /// Fixed schemas for types owned by the API machinery packages.
    fn well_known(&self, ident: &TypeIdentity) -> Option<SchemaNode> {
        match (ident.package.as_str(), ident.name.as_str()) {
            (META_V1_PACKAGE, "TypeMeta") => {
                let mut node = SchemaNode::object();
                node.properties.insert(
                    "apiVersion".into(),
                    SchemaNode::string().with_description(API_VERSION_DESCRIPTION),
                );
                node.properties.insert(
                    "kind".into(),
                    SchemaNode::string().with_description(KIND_DESCRIPTION),
                );
                Some(node)
            }
            (META_V1_PACKAGE, "ObjectMeta") => Some(if self.options.generate_embedded_object_meta {
                embedded_object_meta()
            } else {
                SchemaNode::object()
            }),
            (META_V1_PACKAGE, "Time") | (META_V1_PACKAGE, "MicroTime") => {
                Some(SchemaNode::string().with_format("date-time"))
            }
            (META_V1_PACKAGE, "Duration") => Some(SchemaNode::string()),
            (INTSTR_PACKAGE, "IntOrString") => Some(SchemaNode {
                int_or_string: true,
                ..SchemaNode::default()
            }),
            (RUNTIME_PACKAGE, "RawExtension") => Some(SchemaNode {
                preserve_unknown_fields: Some(true),
                ..SchemaNode::object()
            }),
            _ => None,
        }
    }
}

impl SchemaProvider for StructuralSchemaProvider<'_> {
    fn schema_for(&mut self, ident: &TypeIdentity) -> Result<&SchemaNode, SchemaError> {
        let ident = TypeIdentity {
            package: ident.package.non_vendor(),
            name: ident.name.clone(),
        };
        if !self.cache.contains_key(&ident) {
            self.named_schema(&ident)?;
        }
        self.cache
            .get(&ident)
            .ok_or(SchemaError::UnknownType(ident))
    }
}

fn embedded_object_meta() -> SchemaNode {
    let string_map = || {
        let mut m = SchemaNode::object();
        m.additional_properties = Some(Box::new(SchemaNode::string()));
        m
    };
    let mut finalizers = SchemaNode::typed("array");
    finalizers.items = Some(Box::new(SchemaNode::string()));

    let mut node = SchemaNode::object();
    node.properties.insert("annotations".into(), string_map());
    node.properties.insert("finalizers".into(), finalizers);
    node.properties.insert("labels".into(), string_map());
    node.properties.insert("name".into(), SchemaNode::string());
    node.properties.insert("namespace".into(), SchemaNode::string());
    node
}

/// Apply `kubebuilder:validation:*`, `kubebuilder:default` and pruning
/// markers to a schema.
fn apply_validation_markers(
    context: &TypeIdentity,
    markers: &[MarkerValue],
    node: &mut SchemaNode,
) -> Result<(), SchemaError> {
    let invalid = |marker: &MarkerValue, expected: &'static str| SchemaError::InvalidMarker {
        context: context.clone(),
        marker: marker.name.clone(),
        expected,
    };
    for marker in markers {
        match marker.name.as_str() {
            "kubebuilder:validation:Enum" => match &marker.value {
                Value::Array(values) => node.enum_values = values.clone(),
                _ => return Err(invalid(marker, "a list")),
            },
            "kubebuilder:validation:Minimum" => {
                node.minimum = Some(marker.value.as_f64().ok_or_else(|| invalid(marker, "a number"))?);
            }
            "kubebuilder:validation:Maximum" => {
                node.maximum = Some(marker.value.as_f64().ok_or_else(|| invalid(marker, "a number"))?);
            }
            "kubebuilder:validation:MinLength" => {
                node.min_length =
                    Some(marker.value.as_u64().ok_or_else(|| invalid(marker, "an unsigned integer"))?);
            }
            "kubebuilder:validation:MaxLength" => {
                node.max_length =
                    Some(marker.value.as_u64().ok_or_else(|| invalid(marker, "an unsigned integer"))?);
            }
            "kubebuilder:validation:Pattern" => {
                let pattern = marker.value.as_str().ok_or_else(|| invalid(marker, "a string"))?;
                node.pattern = Some(pattern.to_string());
            }
            "kubebuilder:validation:Nullable" => node.nullable = true,
            "kubebuilder:validation:EmbeddedResource" => node.embedded_resource = true,
            "kubebuilder:pruning:PreserveUnknownFields" => node.preserve_unknown_fields = Some(true),
            "kubebuilder:default" => node.default = Some(marker.value.clone()),
            _ => {}
        }
    }
    Ok(())
}
