//! Integration test: multi-version assembly, version invariants and
//! per-kind failure isolation, driven through programs built in code.

use std::collections::BTreeSet;

use proptest::prelude::*;
use serde_json::json;
use xrdgen_core::program::{GROUP_NAME_MARKER, VERSION_NAME_MARKER};
use xrdgen_core::{
    Field, GroupKind, MarkerValue, Package, PackagePath, Program, TypeBody, TypeDecl, TypeRef,
};
use xrdgen_engine::{
    AnnotationRegistry, Assembler, Generator, GeneratorConfig, InvariantViolation,
};
use xrdgen_schema::provider::META_V1_PACKAGE;
use xrdgen_schema::{SchemaOptions, StructuralSchemaProvider};

const GROUP: &str = "example.org";

fn field(name: Option<&str>, ty: TypeRef, tag: &str) -> Field {
    Field {
        name: name.map(str::to_string),
        ty,
        tag: Some(tag.to_string()),
        doc: None,
        markers: Vec::new(),
    }
}

fn kind(name: &str, markers: Vec<MarkerValue>, extra: Vec<Field>) -> TypeDecl {
    let mut fields = vec![
        field(None, TypeRef::named(META_V1_PACKAGE, "TypeMeta"), r#"json:",inline""#),
        field(None, TypeRef::named(META_V1_PACKAGE, "ObjectMeta"), r#"json:"metadata,omitempty""#),
    ];
    fields.extend(extra);
    TypeDecl {
        name: name.to_string(),
        doc: None,
        markers,
        body: TypeBody::Struct { fields },
    }
}

fn package(version: &str, types: Vec<TypeDecl>) -> Package {
    Package {
        path: PackagePath::new(format!("{GROUP}/api/{version}")),
        imports: BTreeSet::from([PackagePath::new(META_V1_PACKAGE)]),
        markers: vec![
            MarkerValue::with_value(GROUP_NAME_MARKER, json!(GROUP)),
            MarkerValue::with_value(VERSION_NAME_MARKER, json!(version)),
        ],
        types,
    }
}

fn widget_versions(versions: &[(&str, Vec<MarkerValue>)]) -> Program {
    let packages = versions
        .iter()
        .map(|(v, markers)| package(v, vec![kind("Widget", markers.clone(), Vec::new())]))
        .collect();
    Program::new(packages).unwrap()
}

fn storage() -> MarkerValue {
    MarkerValue::flag("kubebuilder:storageversion")
}

fn widget() -> GroupKind {
    GroupKind::new(GROUP, "Widget")
}

#[test]
fn test_no_referenceable_version_reported_and_document_kept() {
    let program = widget_versions(&[("v1", Vec::new()), ("v2", Vec::new())]);
    let registry = AnnotationRegistry::with_defaults().unwrap();
    let provider = StructuralSchemaProvider::new(&program, SchemaOptions::default());
    let mut assembler = Assembler::new(&program, &registry, provider);

    let doc = assembler.assemble(&widget(), None).unwrap().unwrap().clone();
    let flags: Vec<(&str, bool, bool)> = doc
        .spec
        .versions
        .iter()
        .map(|v| (v.name.as_str(), v.served, v.referenceable))
        .collect();
    assert_eq!(flags, vec![("v1", true, false), ("v2", true, false)]);

    let diags: Vec<_> = assembler.diagnostics().iter().collect();
    assert_eq!(diags.len(), 1);
    let expected = InvariantViolation::NoReferenceableVersion {
        group_kind: widget(),
    };
    assert_eq!(diags[0].message, expected.to_string());
    assert_eq!(diags[0].package.as_str(), "example.org/api/v1");
    assert_eq!(diags[0].declaration.as_deref(), Some("Widget"));
}

#[test]
fn test_conflicting_referenceable_is_one_diagnostic() {
    let program = widget_versions(&[("v1", vec![storage()]), ("v2", vec![storage()])]);
    let registry = AnnotationRegistry::with_defaults().unwrap();
    let provider = StructuralSchemaProvider::new(&program, SchemaOptions::default());
    let mut assembler = Assembler::new(&program, &registry, provider);
    assembler.assemble(&widget(), None).unwrap();

    let diags: Vec<_> = assembler.diagnostics().iter().collect();
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("v1"));
    assert!(diags[0].message.contains("v2"));
}

#[test]
fn test_referenceable_but_unserved() {
    let unserved = MarkerValue::flag("kubebuilder:unservedversion");
    let program = widget_versions(&[("v1", vec![storage(), unserved]), ("v2", Vec::new())]);
    let registry = AnnotationRegistry::with_defaults().unwrap();
    let provider = StructuralSchemaProvider::new(&program, SchemaOptions::default());
    let mut assembler = Assembler::new(&program, &registry, provider);
    assembler.assemble(&widget(), None).unwrap();

    let diags: Vec<_> = assembler.diagnostics().iter().collect();
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("referenceable but not served"));
}

#[test]
fn test_second_composition_ref_reported_against_declaration() {
    let comp = |name: &str| {
        MarkerValue::with_value("kubebuilder:defaultcompositionref", json!({ "name": name }))
    };
    let program = widget_versions(&[("v1", vec![storage(), comp("a")]), ("v2", vec![comp("b")])]);
    let registry = AnnotationRegistry::with_defaults().unwrap();
    let provider = StructuralSchemaProvider::new(&program, SchemaOptions::default());
    let mut assembler = Assembler::new(&program, &registry, provider);
    let doc = assembler.assemble(&widget(), None).unwrap().unwrap();
    assert_eq!(doc.spec.default_composition_ref.as_ref().unwrap().name, "a");

    let diags: Vec<_> = assembler.diagnostics().iter().collect();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].package.as_str(), "example.org/api/v2");
    assert_eq!(diags[0].declaration.as_deref(), Some("Widget"));
}

#[test]
fn test_plural_override_changes_name_and_file() {
    let resource = MarkerValue::with_value("kubebuilder:resource", json!({"path": "gadgets"}));
    let program = widget_versions(&[("v1", vec![resource])]);
    let output = Generator::new(GeneratorConfig::default())
        .unwrap()
        .generate(&program);
    assert!(output.is_clean());
    assert_eq!(output.files[0].name, "example.org_gadgets.yaml");
    assert!(output.files[0].contents.contains("name: gadgets.example.org"));
}

#[test]
fn test_default_plural_name() {
    let program = widget_versions(&[("v1", Vec::new())]);
    let output = Generator::new(GeneratorConfig::default())
        .unwrap()
        .generate(&program);
    assert_eq!(output.files[0].name, "example.org_widgets.yaml");
    assert!(output.files[0].contents.contains("name: widgets.example.org"));
    assert!(output.files[0].contents.contains("referenceable: true"));
}

#[test]
fn test_schema_failure_isolated_to_one_kind() {
    let float = field(Some("Ratio"), TypeRef::builtin("float64"), r#"json:"ratio""#);
    let program = Program::new(vec![package(
        "v1",
        vec![
            kind("Gauge", Vec::new(), vec![float]),
            kind("Widget", Vec::new(), Vec::new()),
        ],
    )])
    .unwrap();

    let output = Generator::new(GeneratorConfig::default())
        .unwrap()
        .generate(&program);
    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].group_kind, GroupKind::new(GROUP, "Gauge"));
    let names: Vec<&str> = output.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["example.org_widgets.yaml"]);

    let config = GeneratorConfig {
        allow_dangerous_types: true,
        ..GeneratorConfig::default()
    };
    let output = Generator::new(config).unwrap().generate(&program);
    assert!(output.failures.is_empty());
    assert_eq!(output.files.len(), 2);
}

#[test]
fn test_envelope_not_imported_generates_nothing() {
    let mut pkg = package("v1", vec![kind("Widget", Vec::new(), Vec::new())]);
    pkg.imports.clear();
    let program = Program::new(vec![pkg]).unwrap();
    let generator = Generator::new(GeneratorConfig::default()).unwrap();
    assert!(generator.kinds(&program).is_empty());
    let output = generator.generate(&program);
    assert!(output.files.is_empty());
    assert!(output.is_clean());
}

#[test]
fn test_same_named_interface_does_not_contribute_a_version() {
    let shape = TypeDecl {
        name: "Widget".to_string(),
        doc: None,
        markers: Vec::new(),
        body: TypeBody::Interface,
    };
    let program = Program::new(vec![
        package("v1", vec![kind("Widget", Vec::new(), Vec::new())]),
        package("v2", vec![shape]),
    ])
    .unwrap();
    let registry = AnnotationRegistry::with_defaults().unwrap();
    let provider = StructuralSchemaProvider::new(&program, SchemaOptions::default());
    let mut assembler = Assembler::new(&program, &registry, provider);

    let doc = assembler.assemble(&widget(), None).unwrap().unwrap();
    let names: Vec<&str> = doc.spec.versions.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["v1"]);
    assert!(doc.spec.versions[0].referenceable);
    assert!(assembler.diagnostics().is_empty());

    let output = Generator::new(GeneratorConfig::default())
        .unwrap()
        .generate(&program);
    assert!(output.is_clean());
    assert_eq!(output.files.len(), 1);
    assert_eq!(output.files[0].name, "example.org_widgets.yaml");
}

fn version_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("v[1-9](alpha|beta)?[1-9]?", 1..6)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

proptest! {
    /// Versions come out sorted and byte-identical regardless of input order.
    #[test]
    fn assembly_is_deterministic(names in version_names(), storage_idx in any::<prop::sample::Index>()) {
        let chosen = storage_idx.index(names.len());
        let versions: Vec<(&str, Vec<MarkerValue>)> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), if i == chosen { vec![storage()] } else { Vec::new() }))
            .collect();
        let program = widget_versions(&versions);

        let mut reversed = versions.clone();
        reversed.reverse();
        let program_reversed = widget_versions(&reversed);

        let generator = Generator::new(GeneratorConfig::default()).unwrap();
        let a = generator.generate(&program);
        let b = generator.generate(&program_reversed);
        prop_assert_eq!(&a.files, &b.files);
        prop_assert!(a.is_clean());

        let registry = AnnotationRegistry::with_defaults().unwrap();
        let provider = StructuralSchemaProvider::new(&program, SchemaOptions::default());
        let mut assembler = Assembler::new(&program, &registry, provider);
        let doc = assembler.assemble(&widget(), None).unwrap().unwrap();
        let got: Vec<&str> = doc.spec.versions.iter().map(|v| v.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        prop_assert_eq!(got, sorted.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(doc.spec.versions.iter().filter(|v| v.referenceable).count(), 1);
    }

    /// A lone version is always referenceable.
    #[test]
    fn single_version_is_referenceable(name in "v[1-9](alpha|beta)?[1-9]?") {
        let program = widget_versions(&[(name.as_str(), Vec::new())]);
        let registry = AnnotationRegistry::with_defaults().unwrap();
        let provider = StructuralSchemaProvider::new(&program, SchemaOptions::default());
        let mut assembler = Assembler::new(&program, &registry, provider);
        let doc = assembler.assemble(&widget(), None).unwrap().unwrap();
        prop_assert!(doc.spec.versions[0].referenceable);
        prop_assert!(assembler.diagnostics().is_empty());
    }
}
