//! # Error Types — Structured Error Hierarchy
//!
//! Errors shared across the workspace. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Program model errors reject malformed input before synthesis starts.
//! - Anything tied to a specific declaration and recoverable is a
//!   [`Diagnostic`](crate::Diagnostic), not an error.

use thiserror::Error;

use crate::identity::PackagePath;

/// Top-level error type for xrdgen.
#[derive(Error, Debug)]
pub enum XrdgenError {
    /// The loaded program model is inconsistent.
    #[error("program error: {0}")]
    Program(#[from] ProgramError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error building a [`Program`](crate::Program) from a manifest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    /// Two packages share the same canonical path.
    #[error("package {0} is declared more than once")]
    DuplicatePackage(PackagePath),

    /// A package declares two types with the same name.
    #[error("type {name} is declared more than once in package {package}")]
    DuplicateType {
        /// Package containing the duplicate.
        package: PackagePath,
        /// Duplicated type name.
        name: String,
    },

    /// A package path is empty.
    #[error("package path must not be empty")]
    EmptyPackagePath,
}
