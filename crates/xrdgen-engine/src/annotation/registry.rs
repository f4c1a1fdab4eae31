//! # Annotation Registry
//!
//! Maps marker names to typed constructors. Sources register definitions
//! into a [`RegistryBuilder`] once at startup; [`RegistryBuilder::build`]
//! freezes the result into an [`AnnotationRegistry`] that is only read
//! afterwards and is passed explicitly into the pipeline.
//!
//! ## Construction
//!
//! A marker's parsed arguments arrive as a JSON value. A [`Definition`]
//! deserializes them into a concrete annotation struct and wraps it in the
//! [`Annotation`] role chosen at registration time. Flag markers carry
//! `null`, which is read as an empty argument object.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use xrdgen_core::MarkerValue;

use super::{Annotation, AnnotationError, DocumentMutator, SpecMutator};

/// Builds an annotation from parsed marker arguments.
pub type Constructor = fn(&str, &Value) -> Result<Annotation, AnnotationError>;

/// Failure building a registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two definitions share a marker name.
    #[error("marker {0} is already registered")]
    Duplicate(String),
}

/// Human-readable help for one marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkerHelp {
    /// Grouping shown in help output.
    pub category: String,
    /// One-line summary.
    pub summary: String,
    /// Per-argument help, in declaration order.
    pub fields: Vec<(String, String)>,
}

impl MarkerHelp {
    /// Help with a category and summary and no argument help.
    pub fn new(category: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            summary: summary.into(),
            fields: Vec::new(),
        }
    }

    /// Add help for one argument.
    pub fn field(mut self, name: impl Into<String>, help: impl Into<String>) -> Self {
        self.fields.push((name.into(), help.into()));
        self
    }
}

/// A marker name bound to its constructor and optional help.
#[derive(Debug, Clone)]
pub struct Definition {
    name: String,
    constructor: Constructor,
    help: Option<MarkerHelp>,
}

fn arguments(value: &Value) -> Value {
    match value {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    }
}

fn parse<T: DeserializeOwned>(name: &str, value: &Value) -> Result<T, AnnotationError> {
    serde_json::from_value(arguments(value)).map_err(|e| AnnotationError::InvalidValue {
        marker: name.to_string(),
        reason: e.to_string(),
    })
}

fn construct_spec<T>(name: &str, value: &Value) -> Result<Annotation, AnnotationError>
where
    T: SpecMutator + DeserializeOwned + 'static,
{
    Ok(Annotation::Spec(Box::new(parse::<T>(name, value)?)))
}

fn construct_document<T>(name: &str, value: &Value) -> Result<Annotation, AnnotationError>
where
    T: DocumentMutator + DeserializeOwned + 'static,
{
    Ok(Annotation::Document(Box::new(parse::<T>(name, value)?)))
}

impl Definition {
    /// A definition whose arguments deserialize into the spec mutator `T`.
    pub fn spec<T>(name: impl Into<String>) -> Self
    where
        T: SpecMutator + DeserializeOwned + 'static,
    {
        Self::with_constructor(name, construct_spec::<T>)
    }

    /// A definition whose arguments deserialize into the document mutator `T`.
    pub fn document<T>(name: impl Into<String>) -> Self
    where
        T: DocumentMutator + DeserializeOwned + 'static,
    {
        Self::with_constructor(name, construct_document::<T>)
    }

    /// A definition with a hand-written constructor.
    pub fn with_constructor(name: impl Into<String>, constructor: Constructor) -> Self {
        Self {
            name: name.into(),
            constructor,
            help: None,
        }
    }

    /// Attach help text.
    pub fn with_help(mut self, help: MarkerHelp) -> Self {
        self.help = Some(help);
        self
    }

    /// Marker name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help text, if any.
    pub fn help(&self) -> Option<&MarkerHelp> {
        self.help.as_ref()
    }

    /// Build an annotation from parsed arguments.
    pub fn construct(&self, value: &Value) -> Result<Annotation, AnnotationError> {
        (self.constructor)(&self.name, value)
    }
}

/// Anything that contributes marker definitions.
pub trait AnnotationSource {
    /// Register every definition this source provides.
    fn register(&self, builder: &mut RegistryBuilder) -> Result<(), RegistryError>;
}

/// Mutable registry under construction.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    definitions: BTreeMap<String, Definition>,
}

impl RegistryBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one definition.
    pub fn register(&mut self, definition: Definition) -> Result<&mut Self, RegistryError> {
        if self.definitions.contains_key(definition.name()) {
            return Err(RegistryError::Duplicate(definition.name().to_string()));
        }
        self.definitions
            .insert(definition.name().to_string(), definition);
        Ok(self)
    }

    /// Add every definition from `source`.
    pub fn source(&mut self, source: &dyn AnnotationSource) -> Result<&mut Self, RegistryError> {
        source.register(self)?;
        Ok(self)
    }

    /// Freeze into a read-only registry.
    pub fn build(self) -> AnnotationRegistry {
        AnnotationRegistry {
            definitions: self.definitions,
        }
    }
}

/// Read-only map from marker name to definition.
#[derive(Debug, Clone, Default)]
pub struct AnnotationRegistry {
    definitions: BTreeMap<String, Definition>,
}

impl AnnotationRegistry {
    /// A registry holding the built-in resource definition markers.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        let mut builder = RegistryBuilder::new();
        builder.source(&super::XrdMarkers)?;
        Ok(builder.build())
    }

    /// The definition for `name`.
    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    /// True if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// All definitions, ordered by name.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.values()
    }

    /// Construct the annotation for `marker`, or `None` if the marker is not
    /// registered here.
    pub fn construct(&self, marker: &MarkerValue) -> Option<Result<Annotation, AnnotationError>> {
        self.get(&marker.name).map(|def| def.construct(&marker.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ResourceSpec;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Label {
        text: String,
    }

    impl SpecMutator for Label {
        fn apply_to_spec(&self, spec: &mut ResourceSpec) -> Result<(), AnnotationError> {
            spec.names.categories.push(self.text.clone());
            Ok(())
        }
    }

    struct LabelSource;

    impl AnnotationSource for LabelSource {
        fn register(&self, builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
            builder.register(
                Definition::spec::<Label>("example:label")
                    .with_help(MarkerHelp::new("Example", "adds a category")),
            )?;
            Ok(())
        }
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut builder = RegistryBuilder::new();
        builder.source(&LabelSource).unwrap();
        let err = builder.source(&LabelSource).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("example:label".into()));
    }

    #[test]
    fn test_plugin_source_extends_defaults() {
        let mut builder = RegistryBuilder::new();
        builder.source(&crate::annotation::XrdMarkers).unwrap();
        builder.source(&LabelSource).unwrap();
        let registry = builder.build();
        assert!(registry.contains("example:label"));
        assert!(registry.contains("kubebuilder:storageversion"));
        let annotation = registry
            .construct(&MarkerValue::with_value("example:label", json!({"text": "all"})))
            .unwrap()
            .unwrap();
        assert!(annotation.is_spec());
    }

    #[test]
    fn test_unregistered_marker_is_none() {
        let registry = AnnotationRegistry::with_defaults().unwrap();
        assert!(registry
            .construct(&MarkerValue::flag("kubebuilder:object:root"))
            .is_none());
    }

    #[test]
    fn test_bad_arguments_are_invalid_value() {
        let mut builder = RegistryBuilder::new();
        builder.source(&LabelSource).unwrap();
        let registry = builder.build();
        let err = registry
            .construct(&MarkerValue::flag("example:label"))
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, AnnotationError::InvalidValue { ref marker, .. } if marker == "example:label"));
    }

    #[test]
    fn test_help_is_kept() {
        let mut builder = RegistryBuilder::new();
        builder.source(&LabelSource).unwrap();
        let registry = builder.build();
        let help = registry.get("example:label").and_then(Definition::help).unwrap();
        assert_eq!(help.category, "Example");
    }
}
