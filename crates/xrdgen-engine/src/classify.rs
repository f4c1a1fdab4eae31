//! # Kind Classifier
//!
//! Finds the declarations that represent resource kinds. A declaration is a
//! resource kind when it embeds both envelope types (type metadata and
//! object metadata). Nothing is registered explicitly; the match is purely
//! structural.
//!
//! ## Matching Rules
//!
//! - Only embedded fields are inspected; the envelope types are always
//!   embedded, never named.
//! - Embedded fields must carry a `json` tag; untagged fields have custom
//!   serialization and take no part in generation.
//! - The embedded type must be a named type. Its package is compared to the
//!   envelope package by non-vendor path, and the declaring package must
//!   import it. A same-named type from any other package does not count.
//! - Interfaces never qualify.
//!
//! The result is deduplicated and sorted by `<kind>.<group>`.

use std::collections::BTreeSet;

use xrdgen_core::{GroupKind, Package, PackagePath, Program, TypeDecl, TypeRef};
use xrdgen_schema::provider::META_V1_PACKAGE;

/// The pair of embedded marker types that identify a resource kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Package declaring both envelope types.
    pub package: PackagePath,
    /// Name of the type-metadata envelope type.
    pub type_meta: String,
    /// Name of the object-metadata envelope type.
    pub object_meta: String,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            package: PackagePath::new(META_V1_PACKAGE),
            type_meta: "TypeMeta".to_string(),
            object_meta: "ObjectMeta".to_string(),
        }
    }
}

impl Envelope {
    /// True if some package in `program` imports the envelope package.
    pub fn is_imported_by(&self, program: &Program) -> bool {
        !program.packages_importing(&self.package).is_empty()
    }

    /// The envelope type name `field` embeds, if it embeds one.
    fn embedded_name<'d>(&self, pkg: &Package, field_ty: &'d TypeRef) -> Option<&'d str> {
        let TypeRef::Named { package, name } = field_ty else {
            return None;
        };
        let defining = match package {
            Some(path) => {
                let path = path.non_vendor();
                if !pkg.imports_path(&path) {
                    return None;
                }
                path
            }
            // Unqualified: declared in the same package.
            None => pkg.path.non_vendor(),
        };
        (defining == self.package.non_vendor()).then_some(name.as_str())
    }

    /// True if `decl`, declared in `pkg`, embeds both envelope types.
    pub fn matches(&self, pkg: &Package, decl: &TypeDecl) -> bool {
        if decl.is_interface() {
            return false;
        }
        let mut has_type_meta = false;
        let mut has_object_meta = false;
        for field in decl.fields() {
            if !field.is_embedded() || !field.has_json_tag() {
                continue;
            }
            match self.embedded_name(pkg, &field.ty) {
                Some(name) if name == self.type_meta => has_type_meta = true,
                Some(name) if name == self.object_meta => has_object_meta = true,
                _ => {}
            }
        }
        has_type_meta && has_object_meta
    }
}

/// All resource kinds in `program`, sorted by `<kind>.<group>`.
///
/// Packages without a declared group, and skipped packages, are ignored. An
/// empty result means there is nothing to generate.
pub fn find_resource_kinds(program: &Program, envelope: &Envelope) -> Vec<GroupKind> {
    let mut kinds = BTreeSet::new();
    for pkg in program.packages() {
        if pkg.is_skipped() {
            continue;
        }
        let Some(group) = pkg.declared_group() else {
            continue;
        };
        for decl in &pkg.types {
            if envelope.matches(pkg, decl) {
                kinds.insert(GroupKind::new(group.clone(), decl.name.clone()));
            }
        }
    }
    let mut kinds: Vec<GroupKind> = kinds.into_iter().collect();
    kinds.sort_by_cached_key(|gk| gk.to_string());
    tracing::debug!(count = kinds.len(), "classified resource kinds");
    kinds
}
