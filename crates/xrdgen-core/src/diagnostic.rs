//! # Diagnostics
//!
//! Non-fatal, located problems accumulated over a whole generation run.
//! Every stage pushes into one [`Diagnostics`] collector; whether any entry
//! blocks output is the caller's decision.

use std::fmt;

use serde::Serialize;

use crate::identity::PackagePath;

/// A problem attributed to a package and, where known, a declaration in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Package the problem is reported against.
    pub package: PackagePath,
    /// Declaration within the package, if the problem has one.
    pub declaration: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.declaration {
            Some(decl) => write!(f, "{}.{}: {}", self.package, decl, self.message),
            None => write!(f, "{}: {}", self.package, self.message),
        }
    }
}

/// Ordered collector of diagnostics for one run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// An empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem against a package.
    pub fn add(&mut self, package: &PackagePath, message: impl fmt::Display) {
        self.entries.push(Diagnostic {
            package: package.clone(),
            declaration: None,
            message: message.to_string(),
        });
    }

    /// Record a problem against a declaration in a package.
    pub fn add_for_declaration(
        &mut self,
        package: &PackagePath,
        declaration: &str,
        message: impl fmt::Display,
    ) {
        self.entries.push(Diagnostic {
            package: package.clone(),
            declaration: Some(declaration.to_string()),
            message: message.to_string(),
        });
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All diagnostics in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Diagnostics reported against one package.
    pub fn for_package<'a>(
        &'a self,
        package: &'a PackagePath,
    ) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.entries.iter().filter(move |d| &d.package == package)
    }

    /// Append every entry of `other`.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Consume the collector and return the entries.
    pub fn into_inner(self) -> Vec<Diagnostic> {
        self.entries
    }
}
