//! # Program Model
//!
//! The loaded set of packages and their type declarations, as handed to the
//! synthesis engine by a loader. The model is deserialized from a program
//! manifest (YAML or JSON) and validated once in [`Program::try_from`].
//!
//! ```text
//! Program
//! └── Package (path, imports, markers)
//!     └── TypeDecl (name, doc, markers)
//!         └── TypeBody: Struct { fields } | Interface | Alias { target }
//!             └── Field (name?, type, tag?, doc, markers)
//! ```
//!
//! ## Package Metadata
//!
//! A package takes part in generation when it carries a `groupName` marker.
//! Its version is the `versionName` marker, defaulting to the last segment
//! of its path. A `kubebuilder:skip` marker excludes the package entirely.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProgramError;
use crate::identity::{GroupVersion, PackagePath, TypeIdentity};
use crate::tag::{JsonTag, StructTag};

/// Package marker declaring the API group.
pub const GROUP_NAME_MARKER: &str = "groupName";
/// Package marker declaring the API version.
pub const VERSION_NAME_MARKER: &str = "versionName";
/// Package marker excluding a package from generation.
pub const SKIP_MARKER: &str = "kubebuilder:skip";

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

/// A marker attached to a package, declaration or field, with its arguments
/// already parsed into a JSON value.
///
/// Flag markers carry `null`; single-value markers carry a scalar; markers
/// with named arguments carry an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerValue {
    /// Marker name, e.g. `kubebuilder:claim`.
    pub name: String,
    /// Parsed arguments.
    #[serde(default)]
    pub value: Value,
}

impl MarkerValue {
    /// A marker with no arguments.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Value::Null,
        }
    }

    /// A marker with the given arguments.
    pub fn with_value(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

fn find_marker<'a>(markers: &'a [MarkerValue], name: &str) -> Option<&'a MarkerValue> {
    markers.iter().find(|m| m.name == name)
}

// ---------------------------------------------------------------------------
// Type references and declarations
// ---------------------------------------------------------------------------

/// A reference to a type as written in a field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// A named type. `package` is absent for universe types such as `error`.
    Named {
        /// Defining package, as written in the referencing package.
        #[serde(default)]
        package: Option<PackagePath>,
        /// Type name.
        name: String,
    },
    /// A predeclared basic type (`string`, `int32`, `bool`, ...).
    Builtin {
        /// Basic type name.
        name: String,
    },
    /// A pointer to another type.
    Pointer {
        /// Pointee.
        elem: Box<TypeRef>,
    },
    /// A slice of another type.
    Slice {
        /// Element type.
        elem: Box<TypeRef>,
    },
    /// A map type.
    Map {
        /// Key type.
        key: Box<TypeRef>,
        /// Value type.
        value: Box<TypeRef>,
    },
    /// An anonymous interface type.
    Interface,
}

impl TypeRef {
    /// Named type reference.
    pub fn named(package: impl Into<PackagePath>, name: impl Into<String>) -> Self {
        Self::Named {
            package: Some(package.into()),
            name: name.into(),
        }
    }

    /// Builtin type reference.
    pub fn builtin(name: impl Into<String>) -> Self {
        Self::Builtin { name: name.into() }
    }
}

/// A struct field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name; absent for embedded fields.
    #[serde(default)]
    pub name: Option<String>,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Raw struct tag.
    #[serde(default)]
    pub tag: Option<String>,
    /// Doc comment text.
    #[serde(default)]
    pub doc: Option<String>,
    /// Markers attached to the field.
    #[serde(default)]
    pub markers: Vec<MarkerValue>,
}

impl Field {
    /// True if the field is embedded without a name.
    pub fn is_embedded(&self) -> bool {
        self.name.is_none()
    }

    /// The parsed `json` tag entry, if any.
    pub fn json_tag(&self) -> Option<JsonTag> {
        self.tag.as_deref().and_then(|t| StructTag(t).json())
    }

    /// True if the field is serialized through a `json` tag.
    pub fn has_json_tag(&self) -> bool {
        self.json_tag().is_some()
    }

    /// Exported fields start with an uppercase letter. Embedded fields take
    /// the exportedness of their type name.
    pub fn is_exported(&self) -> bool {
        let name = match (&self.name, &self.ty) {
            (Some(n), _) => n.as_str(),
            (None, TypeRef::Named { name, .. }) => name.as_str(),
            (None, TypeRef::Pointer { elem }) => match elem.as_ref() {
                TypeRef::Named { name, .. } => name.as_str(),
                _ => return false,
            },
            _ => return false,
        };
        name.chars().next().is_some_and(char::is_uppercase)
    }

    /// First marker named `name`, if present.
    pub fn marker(&self, name: &str) -> Option<&MarkerValue> {
        find_marker(&self.markers, name)
    }
}

/// Body of a type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeBody {
    /// A struct with fields.
    Struct {
        /// Fields in declaration order.
        #[serde(default)]
        fields: Vec<Field>,
    },
    /// An interface. Interfaces are never resource kinds.
    Interface,
    /// A named alias or definition over another type.
    Alias {
        /// Underlying type.
        target: TypeRef,
    },
}

/// A type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Declared name.
    pub name: String,
    /// Doc comment text.
    #[serde(default)]
    pub doc: Option<String>,
    /// Markers attached to the declaration, in attachment order.
    #[serde(default)]
    pub markers: Vec<MarkerValue>,
    /// Declaration body.
    #[serde(flatten)]
    pub body: TypeBody,
}

impl TypeDecl {
    /// Struct fields, or an empty slice for non-struct declarations.
    pub fn fields(&self) -> &[Field] {
        match &self.body {
            TypeBody::Struct { fields } => fields,
            _ => &[],
        }
    }

    /// True if the declaration is an interface.
    pub fn is_interface(&self) -> bool {
        matches!(self.body, TypeBody::Interface)
    }
}

// ---------------------------------------------------------------------------
// Packages
// ---------------------------------------------------------------------------

/// A loaded package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Canonical import path.
    pub path: PackagePath,
    /// Import paths of packages this package imports.
    #[serde(default)]
    pub imports: BTreeSet<PackagePath>,
    /// Package-level markers.
    #[serde(default)]
    pub markers: Vec<MarkerValue>,
    /// Declared types in source order.
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

impl Package {
    /// First package marker named `name`, if present.
    pub fn marker(&self, name: &str) -> Option<&MarkerValue> {
        find_marker(&self.markers, name)
    }

    /// The declared API group and version, if the package declares a group.
    pub fn group_version(&self) -> Option<GroupVersion> {
        let group = self.marker(GROUP_NAME_MARKER)?.value.as_str()?.to_string();
        let version = self
            .marker(VERSION_NAME_MARKER)
            .and_then(|m| m.value.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| self.path.last_segment().to_string());
        Some(GroupVersion { group, version })
    }

    /// Declared API group.
    pub fn declared_group(&self) -> Option<String> {
        self.group_version().map(|gv| gv.group)
    }

    /// Declared API version.
    pub fn declared_version(&self) -> Option<String> {
        self.group_version().map(|gv| gv.version)
    }

    /// True if the package opted out of generation.
    pub fn is_skipped(&self) -> bool {
        self.marker(SKIP_MARKER).is_some()
    }

    /// True if this package imports `path`, comparing non-vendor paths.
    pub fn imports_path(&self, path: &PackagePath) -> bool {
        let wanted = path.non_vendor();
        self.imports.iter().any(|p| p.non_vendor() == wanted)
    }

    /// The declaration named `name`.
    pub fn type_decl(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// Serialized form of a program, as read from a manifest file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramManifest {
    /// Loaded packages.
    #[serde(default)]
    pub packages: Vec<Package>,
}

/// A validated set of loaded packages, ordered by path.
#[derive(Debug, Clone, Default)]
pub struct Program {
    packages: BTreeMap<PackagePath, Package>,
}

impl Program {
    /// Build a program, rejecting duplicate packages and duplicate types.
    pub fn new(packages: Vec<Package>) -> Result<Self, ProgramError> {
        let mut by_path = BTreeMap::new();
        for pkg in packages {
            if pkg.path.as_str().is_empty() {
                return Err(ProgramError::EmptyPackagePath);
            }
            let mut seen = BTreeSet::new();
            for decl in &pkg.types {
                if !seen.insert(decl.name.as_str()) {
                    return Err(ProgramError::DuplicateType {
                        package: pkg.path.clone(),
                        name: decl.name.clone(),
                    });
                }
            }
            if by_path.contains_key(&pkg.path) {
                return Err(ProgramError::DuplicatePackage(pkg.path));
            }
            by_path.insert(pkg.path.clone(), pkg);
        }
        Ok(Self { packages: by_path })
    }

    /// All packages in path order.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// Number of loaded packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// True if no packages are loaded.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Look up a package by path. Vendored spellings resolve to the same package.
    pub fn package(&self, path: &PackagePath) -> Option<&Package> {
        self.packages
            .get(path)
            .or_else(|| self.packages.get(&path.non_vendor()))
    }

    /// Packages that import `path`, in path order.
    pub fn packages_importing(&self, path: &PackagePath) -> Vec<&Package> {
        self.packages
            .values()
            .filter(|p| p.imports_path(path))
            .collect()
    }

    /// Look up a declaration by identity.
    pub fn type_decl(&self, ident: &TypeIdentity) -> Option<&TypeDecl> {
        self.package(&ident.package)?.type_decl(&ident.name)
    }
}

impl TryFrom<ProgramManifest> for Program {
    type Error = ProgramError;

    fn try_from(manifest: ProgramManifest) -> Result<Self, Self::Error> {
        Self::new(manifest.packages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api_package(path: &str, group: Option<&str>) -> Package {
        let mut markers = Vec::new();
        if let Some(g) = group {
            markers.push(MarkerValue::with_value(GROUP_NAME_MARKER, json!(g)));
        }
        Package {
            path: PackagePath::new(path),
            imports: BTreeSet::new(),
            markers,
            types: Vec::new(),
        }
    }

    #[test]
    fn test_group_version_defaults_version_to_last_segment() {
        let pkg = api_package("example.org/apis/v1alpha1", Some("example.org"));
        let gv = pkg.group_version().unwrap();
        assert_eq!(gv.group, "example.org");
        assert_eq!(gv.version, "v1alpha1");
    }

    #[test]
    fn test_version_name_marker_overrides_path() {
        let mut pkg = api_package("example.org/apis/mock", Some("example.org"));
        pkg.markers
            .push(MarkerValue::with_value(VERSION_NAME_MARKER, json!("v1beta1")));
        assert_eq!(pkg.declared_version().as_deref(), Some("v1beta1"));
    }

    #[test]
    fn test_package_without_group_has_no_group_version() {
        let pkg = api_package("example.org/util", None);
        assert!(pkg.group_version().is_none());
    }

    #[test]
    fn test_duplicate_package_rejected() {
        let a = api_package("example.org/apis/v1", Some("example.org"));
        let b = a.clone();
        let err = Program::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, ProgramError::DuplicatePackage(_)));
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut pkg = api_package("example.org/apis/v1", Some("example.org"));
        let decl = TypeDecl {
            name: "Widget".into(),
            doc: None,
            markers: vec![],
            body: TypeBody::Interface,
        };
        pkg.types.push(decl.clone());
        pkg.types.push(decl);
        let err = Program::new(vec![pkg]).unwrap_err();
        assert!(matches!(err, ProgramError::DuplicateType { .. }));
    }

    #[test]
    fn test_packages_importing_compares_by_path() {
        let mut a = api_package("example.org/apis/v1", Some("example.org"));
        a.imports.insert(PackagePath::new(
            "example.org/vendor/k8s.io/apimachinery/pkg/apis/meta/v1",
        ));
        let b = api_package("example.org/util", None);
        let program = Program::new(vec![a, b]).unwrap();
        let importing =
            program.packages_importing(&PackagePath::new("k8s.io/apimachinery/pkg/apis/meta/v1"));
        assert_eq!(importing.len(), 1);
        assert_eq!(importing[0].path.as_str(), "example.org/apis/v1");
    }

    #[test]
    fn test_manifest_deserializes_from_yaml() {
        let yaml = r#"
packages:
  - path: example.org/apis/v1
    imports: [k8s.io/apimachinery/pkg/apis/meta/v1]
    markers:
      - name: groupName
        value: example.org
    types:
      - name: Widget
        kind: struct
        markers:
          - name: kubebuilder:storageversion
        fields:
          - type: {kind: named, package: k8s.io/apimachinery/pkg/apis/meta/v1, name: TypeMeta}
            tag: 'json:",inline"'
          - name: Size
            type: {kind: builtin, name: int32}
            tag: 'json:"size"'
      - name: Shape
        kind: interface
"#;
        let manifest: ProgramManifest = serde_yaml::from_str(yaml).unwrap();
        let program = Program::try_from(manifest).unwrap();
        let widget = program
            .type_decl(&TypeIdentity::new("example.org/apis/v1", "Widget"))
            .unwrap();
        assert_eq!(widget.fields().len(), 2);
        assert!(widget.fields()[0].is_embedded());
        assert_eq!(widget.markers[0].value, Value::Null);
        let shape = program
            .type_decl(&TypeIdentity::new("example.org/apis/v1", "Shape"))
            .unwrap();
        assert!(shape.is_interface());
    }

    #[test]
    fn test_embedded_field_exportedness_follows_type_name() {
        let field = Field {
            name: None,
            ty: TypeRef::named("k8s.io/apimachinery/pkg/apis/meta/v1", "ObjectMeta"),
            tag: Some(r#"json:"metadata,omitempty""#.into()),
            doc: None,
            markers: vec![],
        };
        assert!(field.is_exported());
        assert!(field.has_json_tag());
    }
}
