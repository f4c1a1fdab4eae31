//! # Annotations
//!
//! Typed, pre-parsed directives attached to declarations that mutate the
//! assembled resource document.
//!
//! ## Capability Roles
//!
//! Every annotation value takes exactly one of two roles:
//!
//! - [`SpecMutator`]: sees only the version-agnostic [`ResourceSpec`].
//! - [`DocumentMutator`]: sees the whole [`ResourceDocument`] plus the name
//!   of the version whose declaration carried the annotation.
//!
//! The role is fixed when the value is constructed by the
//! [`AnnotationRegistry`] and carried in the [`Annotation`] enum, so the
//! dispatcher never inspects concrete types.
//!
//! ## Errors
//!
//! A failed mutation returns an [`AnnotationError`]. The assembler turns it
//! into a located diagnostic and carries on; the failed annotation's effect
//! is dropped.

pub mod markers;
pub mod registry;

use std::fmt;

use thiserror::Error;

use crate::document::{ResourceDocument, ResourceSpec};

pub use markers::XrdMarkers;
pub use registry::{
    AnnotationRegistry, AnnotationSource, Constructor, Definition, MarkerHelp, RegistryBuilder,
    RegistryError,
};

/// Failure applying or constructing an annotation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    /// A required argument was absent or empty.
    #[error("{marker}: {field} is required")]
    MissingField {
        /// Marker name.
        marker: &'static str,
        /// Argument name.
        field: &'static str,
    },

    /// The annotation contradicts one already applied to the same kind.
    #[error("{marker}: {message}")]
    Conflict {
        /// Marker name.
        marker: &'static str,
        /// What it conflicts with.
        message: String,
    },

    /// The arguments could not be interpreted.
    #[error("{marker}: invalid value: {reason}")]
    InvalidValue {
        /// Marker name.
        marker: String,
        /// Parse or validation failure.
        reason: String,
    },
}

/// An annotation that mutates only the version-agnostic spec.
pub trait SpecMutator: fmt::Debug + Send + Sync {
    /// Apply the annotation to `spec`.
    fn apply_to_spec(&self, spec: &mut ResourceSpec) -> Result<(), AnnotationError>;
}

/// An annotation that mutates the whole document in the context of the
/// version whose declaration carried it.
pub trait DocumentMutator: fmt::Debug + Send + Sync {
    /// Apply the annotation to `doc`. `version` is the declaring package's
    /// version, or empty when no version context exists.
    fn apply_to_document(
        &self,
        doc: &mut ResourceDocument,
        version: &str,
    ) -> Result<(), AnnotationError>;
}

/// A constructed annotation value, tagged with its capability role.
#[derive(Debug)]
pub enum Annotation {
    /// Mutates the spec.
    Spec(Box<dyn SpecMutator>),
    /// Mutates the whole document with version context.
    Document(Box<dyn DocumentMutator>),
}

impl Annotation {
    /// Dispatch to the role-specific mutation.
    pub fn apply(&self, doc: &mut ResourceDocument, version: &str) -> Result<(), AnnotationError> {
        match self {
            Annotation::Spec(m) => m.apply_to_spec(&mut doc.spec),
            Annotation::Document(m) => m.apply_to_document(doc, version),
        }
    }

    /// True for spec mutators.
    pub fn is_spec(&self) -> bool {
        matches!(self, Annotation::Spec(_))
    }
}
