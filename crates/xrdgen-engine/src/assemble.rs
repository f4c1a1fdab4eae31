//! # Version Assembler
//!
//! Builds the [`ResourceDocument`] for one resource kind.
//!
//! ## Passes
//!
//! 1. Every package declaring the kind's group contributes one version:
//!    the kind's schema is fetched from the provider, cloned, truncated
//!    and appended as a served version.
//! 2. Every marker on every contributing declaration is dispatched through
//!    the [`AnnotationRegistry`], with the owning package's version as
//!    context. Annotations that search versions by name need the full list,
//!    so this pass only starts once the first one is complete.
//!
//! The document name is then recomputed from the final plural, versions
//! are sorted, a lone version is made referenceable, and the invariants are
//! checked. Finished documents are memoized per [`GroupKind`].
//!
//! ## Failures
//!
//! Annotation errors and invariant violations become diagnostics. A schema
//! provider failure aborts this kind only and is returned as an
//! [`AssemblyError`]. A kind with no contributing declaration yields no
//! document and no error.

use std::collections::BTreeMap;

use thiserror::Error;
use xrdgen_core::{Diagnostics, GroupKind, Package, Program, TypeDecl, TypeIdentity};
use xrdgen_schema::{truncate_description, SchemaError, SchemaProvider};

use crate::annotation::AnnotationRegistry;
use crate::document::{ResourceDocument, VersionEntry};
use crate::naming::default_names;
use crate::validate::{normalize_versions, validate_versions};

/// Hard failure assembling one kind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    /// The schema provider could not produce a version's schema.
    #[error("{group_kind}: schema for {ident}: {source}")]
    Schema {
        /// Kind being assembled.
        group_kind: GroupKind,
        /// Declaration whose schema failed.
        ident: TypeIdentity,
        /// Provider error.
        #[source]
        source: SchemaError,
    },
}

/// A declaration contributing one version to a kind.
struct Contributor<'p> {
    package: &'p Package,
    decl: &'p TypeDecl,
    version: String,
}

/// Assembles and memoizes resource documents over one program.
#[derive(Debug)]
pub struct Assembler<'a, P: SchemaProvider> {
    program: &'a Program,
    registry: &'a AnnotationRegistry,
    provider: P,
    documents: BTreeMap<GroupKind, ResourceDocument>,
    diagnostics: Diagnostics,
}

impl<'a, P: SchemaProvider> Assembler<'a, P> {
    /// An assembler with no finished documents.
    pub fn new(program: &'a Program, registry: &'a AnnotationRegistry, provider: P) -> Self {
        Self {
            program,
            registry,
            provider,
            documents: BTreeMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Assemble the document for `group_kind`, or return the memoized one.
    ///
    /// `max_desc_len` truncates every schema description; `Some(0)` drops
    /// descriptions entirely.
    pub fn assemble(
        &mut self,
        group_kind: &GroupKind,
        max_desc_len: Option<usize>,
    ) -> Result<Option<&ResourceDocument>, AssemblyError> {
        if !self.documents.contains_key(group_kind) {
            if let Some(doc) = self.build(group_kind, max_desc_len)? {
                self.documents.insert(group_kind.clone(), doc);
            }
        }
        Ok(self.documents.get(group_kind))
    }

    fn build(
        &mut self,
        group_kind: &GroupKind,
        max_desc_len: Option<usize>,
    ) -> Result<Option<ResourceDocument>, AssemblyError> {
        let program = self.program;
        let mut doc = ResourceDocument::new(group_kind, default_names(&group_kind.kind));

        let contributors: Vec<Contributor<'a>> = program
            .packages()
            .filter(|pkg| !pkg.is_skipped())
            .filter_map(|pkg| {
                let gv = pkg.group_version()?;
                if gv.group != group_kind.group {
                    return None;
                }
                let decl = pkg
                    .type_decl(&group_kind.kind)
                    .filter(|decl| !decl.is_interface())?;
                Some(Contributor {
                    package: pkg,
                    decl,
                    version: gv.version,
                })
            })
            .collect();

        for c in &contributors {
            let ident = TypeIdentity::new(c.package.path.clone(), c.decl.name.clone());
            let mut schema = self
                .provider
                .schema_for(&ident)
                .map_err(|source| AssemblyError::Schema {
                    group_kind: group_kind.clone(),
                    ident: ident.clone(),
                    source,
                })?
                .clone();
            if let Some(max_len) = max_desc_len {
                truncate_description(&mut schema, max_len);
            }
            tracing::debug!(
                group_kind = %group_kind,
                version = %c.version,
                package = %c.package.path,
                "collected version"
            );
            doc.spec.versions.push(VersionEntry::new(c.version.clone(), schema));
        }

        for c in &contributors {
            self.dispatch(&mut doc, c);
        }

        doc.recompute_name();

        let Some(first) = contributors.first() else {
            tracing::debug!(group_kind = %group_kind, "no contributing declarations; skipping");
            return Ok(None);
        };

        normalize_versions(&mut doc.spec.versions);
        for violation in validate_versions(group_kind, &doc.spec.versions) {
            tracing::warn!(group_kind = %group_kind, "{violation}");
            self.diagnostics
                .add_for_declaration(&first.package.path, &first.decl.name, violation);
        }

        Ok(Some(doc))
    }

    fn dispatch(&mut self, doc: &mut ResourceDocument, c: &Contributor<'_>) {
        for marker in &c.decl.markers {
            let annotation = match self.registry.construct(marker) {
                None => {
                    tracing::debug!(marker = %marker.name, "ignoring unregistered marker");
                    continue;
                }
                Some(Err(err)) => {
                    self.diagnostics
                        .add_for_declaration(&c.package.path, &c.decl.name, err);
                    continue;
                }
                Some(Ok(annotation)) => annotation,
            };
            if let Err(err) = annotation.apply(doc, &c.version) {
                tracing::debug!(
                    package = %c.package.path,
                    marker = %marker.name,
                    "annotation failed: {err}"
                );
                self.diagnostics
                    .add_for_declaration(&c.package.path, &c.decl.name, err);
            }
        }
    }

    /// The finished document for `group_kind`, if assembled.
    pub fn document(&self, group_kind: &GroupKind) -> Option<&ResourceDocument> {
        self.documents.get(group_kind)
    }

    /// All finished documents, ordered by group and kind.
    pub fn documents(&self) -> impl Iterator<Item = (&GroupKind, &ResourceDocument)> {
        self.documents.iter()
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The schema provider, with whatever it has cached.
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Consume the assembler, returning its documents and diagnostics.
    pub fn into_parts(self) -> (BTreeMap<GroupKind, ResourceDocument>, Diagnostics) {
        (self.documents, self.diagnostics)
    }
}
