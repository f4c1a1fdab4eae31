//! # Identity Types
//!
//! Value types used as map keys throughout the pipeline.
//!
//! ## Package Identity
//!
//! A package is identified by its import path and nothing else. When a
//! program is loaded from several entry points the same logical package can
//! appear as distinct in-memory values; comparing by path keeps them equal.
//! Vendored copies are normalized with [`PackagePath::non_vendor`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical import path of a package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackagePath(String);

impl PackagePath {
    /// Wrap an import path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path with any vendoring prefix removed.
    ///
    /// `example.com/app/vendor/k8s.io/api` becomes `k8s.io/api`.
    pub fn non_vendor(&self) -> PackagePath {
        match self.0.rfind("/vendor/") {
            Some(idx) => Self(self.0[idx + "/vendor/".len()..].to_string()),
            None => match self.0.strip_prefix("vendor/") {
                Some(rest) => Self(rest.to_string()),
                None => self.clone(),
            },
        }
    }

    /// Last path segment, e.g. `v1beta1` for `example.org/apis/v1beta1`.
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for PackagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackagePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A declared type, unique across the whole loaded program.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeIdentity {
    /// Package declaring the type.
    pub package: PackagePath,
    /// Declared type name.
    pub name: String,
}

impl TypeIdentity {
    /// Identity of `name` declared in `package`.
    pub fn new(package: impl Into<PackagePath>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

/// Logical identity of a resource kind, independent of API version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKind {
    /// API group, e.g. `example.org`.
    pub group: String,
    /// Kind name, e.g. `Widget`.
    pub kind: String,
}

impl GroupKind {
    /// Construct a group/kind pair.
    pub fn new(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for GroupKind {
    /// `<kind>.<group>`, or just `<kind>` for the core (empty) group.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            f.write_str(&self.kind)
        } else {
            write!(f, "{}.{}", self.kind, self.group)
        }
    }
}

/// API group and version declared by a package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupVersion {
    /// API group.
    pub group: String,
    /// API version, e.g. `v1beta1`.
    pub version: String,
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_vendor_strips_nested_vendor_prefix() {
        let p = PackagePath::new("example.com/app/vendor/k8s.io/apimachinery/pkg/apis/meta/v1");
        assert_eq!(p.non_vendor().as_str(), "k8s.io/apimachinery/pkg/apis/meta/v1");
    }

    #[test]
    fn test_non_vendor_strips_leading_vendor() {
        let p = PackagePath::new("vendor/k8s.io/api");
        assert_eq!(p.non_vendor().as_str(), "k8s.io/api");
    }

    #[test]
    fn test_non_vendor_leaves_plain_path() {
        let p = PackagePath::new("example.org/apis/v1");
        assert_eq!(p.non_vendor(), p);
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(PackagePath::new("example.org/apis/v1beta1").last_segment(), "v1beta1");
        assert_eq!(PackagePath::new("mock").last_segment(), "mock");
    }

    #[test]
    fn test_group_kind_display() {
        assert_eq!(GroupKind::new("example.org", "Widget").to_string(), "Widget.example.org");
        assert_eq!(GroupKind::new("", "Pod").to_string(), "Pod");
    }

    #[test]
    fn test_type_identity_display() {
        let t = TypeIdentity::new("example.org/apis/v1", "Widget");
        assert_eq!(t.to_string(), "example.org/apis/v1.Widget");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Stripping the vendor prefix twice changes nothing.
        #[test]
        fn non_vendor_idempotent(
            root in "[a-z]{1,8}(\\.[a-z]{2,3})?(/[a-z0-9]{1,6}){0,3}",
            pkg in "[a-z]{1,8}\\.io(/[a-z0-9]{1,6}){1,3}",
        ) {
            let vendored = PackagePath::new(format!("{root}/vendor/{pkg}"));
            let once = vendored.non_vendor();
            prop_assert_eq!(once.as_str(), pkg.as_str());
            prop_assert_eq!(once.non_vendor(), once);
        }

        /// Ordering of group kinds agrees with their group then kind.
        #[test]
        fn group_kind_ordering_is_field_order(
            a in ("[a-z]{1,6}\\.org", "[A-Z][a-z]{1,6}"),
            b in ("[a-z]{1,6}\\.org", "[A-Z][a-z]{1,6}"),
        ) {
            let ga = GroupKind::new(a.0.clone(), a.1.clone());
            let gb = GroupKind::new(b.0.clone(), b.1.clone());
            prop_assert_eq!(ga.cmp(&gb), a.cmp(&b));
        }
    }
}
