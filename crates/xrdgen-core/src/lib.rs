//! # xrdgen-core — Foundational Types for xrdgen
//!
//! This crate is the leaf of the xrdgen workspace. It defines the identity
//! types every other crate keys its maps by, the in-memory model of a loaded
//! program (packages, declarations, fields, markers), and the diagnostics
//! collector threaded through every synthesis stage.
//!
//! ## Key Design Principles
//!
//! 1. **Packages are keyed by path.** `PackagePath` is the only package
//!    identity. The same logical package loaded through two roots compares
//!    equal because both copies carry the same path string.
//!
//! 2. **Newtypes for identities.** `TypeIdentity`, `GroupKind` and
//!    `GroupVersion` are plain value types with `Ord` and `Hash`, usable as
//!    map keys in deterministic (`BTreeMap`) containers.
//!
//! 3. **Failures are data.** Located, non-fatal problems are recorded as
//!    [`Diagnostic`] values in a [`Diagnostics`] collector instead of being
//!    returned as errors.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `xrdgen-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod diagnostic;
pub mod error;
pub mod identity;
pub mod program;
pub mod tag;

// Re-export primary types for ergonomic imports.
pub use diagnostic::{Diagnostic, Diagnostics};
pub use error::{ProgramError, XrdgenError};
pub use identity::{GroupKind, GroupVersion, PackagePath, TypeIdentity};
pub use program::{
    Field, MarkerValue, Package, Program, ProgramManifest, TypeBody, TypeDecl, TypeRef,
};
pub use tag::{JsonTag, StructTag};
