//! # xrdgen-schema — Schema Provider
//!
//! Turns declared types into OpenAPI v3 schema trees for resource
//! definitions, and provides the in-place utilities the engine applies to
//! its own copies of those trees.
//!
//! ## Schema Model (`node`)
//!
//! [`SchemaNode`] is the subset of OpenAPI v3 accepted in a resource
//! definition's `openAPIV3Schema`, including the `x-kubernetes-*`
//! extensions. Empty members are omitted when serialized.
//!
//! ## Provider (`provider`)
//!
//! [`SchemaProvider`] is the seam the engine consumes. The bundled
//! [`StructuralSchemaProvider`] flattens declarations from a loaded
//! [`Program`](xrdgen_core::Program) and memoizes one tree per
//! [`TypeIdentity`](xrdgen_core::TypeIdentity).
//!
//! ## Utilities
//!
//! - [`truncate_description`] — limit or drop descriptions across a tree.
//! - [`strip_status_property`], [`fix_top_level_metadata`] — shape a root
//!   schema before emission.
//!
//! ## Crate Policy
//!
//! - Depends only on `xrdgen-core` internally.
//! - Cached trees are handed out by shared reference only. Callers clone
//!   before editing, so the cache is never written through.

pub mod node;
pub mod provider;
pub mod transform;
pub mod truncate;

pub use node::SchemaNode;
pub use provider::{SchemaError, SchemaOptions, SchemaProvider, StructuralSchemaProvider};
pub use transform::{fix_top_level_metadata, strip_status_property};
pub use truncate::{truncate_description, truncate_text};
