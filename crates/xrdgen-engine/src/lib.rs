//! # xrdgen-engine — Resource Definition Synthesis
//!
//! Builds one composite resource definition per resource kind found in a
//! loaded program, then validates and renders it.
//!
//! ## Pipeline
//!
//! ```text
//! classify ──▶ assemble (per kind) ──▶ dispatch annotations ──▶ validate ──▶ render
//! ```
//!
//! - [`classify`] — finds declarations embedding both envelope types and
//!   groups them by [`GroupKind`](xrdgen_core::GroupKind).
//! - [`assemble`] — collects one version per contributing package, applies
//!   annotations in a second pass, and stores the finished document.
//! - [`annotation`] — the annotation registry, the two mutator roles and
//!   the built-in markers.
//! - [`validate`] — storage/referenceable version invariants.
//! - [`generate`] — drives the pipeline for a whole program and renders YAML.
//!
//! ## Failure Model
//!
//! Nothing here aborts a whole run. Annotation errors and invariant
//! violations become diagnostics; a schema provider failure aborts only the
//! kind being assembled.

pub mod annotation;
pub mod assemble;
pub mod classify;
pub mod document;
pub mod emit;
pub mod generate;
pub mod naming;
pub mod validate;

pub use annotation::{
    Annotation, AnnotationError, AnnotationRegistry, AnnotationSource, Definition,
    DocumentMutator, MarkerHelp, RegistryBuilder, RegistryError, SpecMutator, XrdMarkers,
};
pub use assemble::{AssemblyError, Assembler};
pub use classify::{find_resource_kinds, Envelope};
pub use document::{
    CompositionReference, ObjectMeta, PrinterColumn, ResourceDocument, ResourceNames,
    ResourceSpec, VersionEntry, VersionSchema,
};
pub use emit::{remove_status, render_yaml, EmitError, Transform};
pub use generate::{
    GenerateError, GeneratedFile, GenerationOutput, Generator, GeneratorConfig, KindFailure,
};
pub use validate::{normalize_versions, validate_versions, InvariantViolation};
