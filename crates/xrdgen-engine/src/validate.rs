//! # Invariant Validator
//!
//! Checks the assembled version list of one resource kind:
//!
//! - exactly one version is referenceable;
//! - the referenceable version is served.
//!
//! Violations are returned as data. The assembler reports them as
//! diagnostics and still stores the document.

use thiserror::Error;
use xrdgen_core::GroupKind;

use crate::document::VersionEntry;

/// A broken version invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// No version is referenceable.
    #[error("resource definition for {group_kind} has no referenceable (storage) version")]
    NoReferenceableVersion {
        /// Kind being validated.
        group_kind: GroupKind,
    },

    /// More than one version is referenceable.
    #[error(
        "resource definition for {group_kind} has more than one referenceable version: {}",
        .versions.join(", ")
    )]
    MultipleReferenceable {
        /// Kind being validated.
        group_kind: GroupKind,
        /// Every referenceable version, in version order.
        versions: Vec<String>,
    },

    /// The referenceable version is not served.
    #[error("resource definition for {group_kind} version {version} is referenceable but not served")]
    ReferenceableNotServed {
        /// Kind being validated.
        group_kind: GroupKind,
        /// Offending version.
        version: String,
    },
}

/// Sort versions by name and make a lone version referenceable.
pub fn normalize_versions(versions: &mut [VersionEntry]) {
    versions.sort_by(|a, b| a.name.cmp(&b.name));
    if let [only] = versions {
        only.referenceable = true;
    }
}

/// Every invariant violation in `versions`.
pub fn validate_versions(group_kind: &GroupKind, versions: &[VersionEntry]) -> Vec<InvariantViolation> {
    let referenceable: Vec<&VersionEntry> = versions.iter().filter(|v| v.referenceable).collect();
    match referenceable.as_slice() {
        [] => vec![InvariantViolation::NoReferenceableVersion {
            group_kind: group_kind.clone(),
        }],
        [only] if !only.served => vec![InvariantViolation::ReferenceableNotServed {
            group_kind: group_kind.clone(),
            version: only.name.clone(),
        }],
        [_] => Vec::new(),
        many => vec![InvariantViolation::MultipleReferenceable {
            group_kind: group_kind.clone(),
            versions: many.iter().map(|v| v.name.clone()).collect(),
        }],
    }
}
