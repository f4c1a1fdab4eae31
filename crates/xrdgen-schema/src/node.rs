//! # Schema Nodes
//!
//! The OpenAPI v3 schema subset carried by a resource definition version.
//! Property maps are ordered so serialized output is stable across runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn is_false(b: &bool) -> bool {
    !*b
}

/// A node in an OpenAPI v3 schema tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// JSON type (`object`, `string`, `integer`, ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,

    /// Format qualifier (`int32`, `date-time`, `byte`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Object properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaNode>,

    /// Required property names, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Element schema for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,

    /// Value schema for maps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaNode>>,

    /// Allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Whether `null` is accepted.
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,

    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    /// Regular expression for strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Minimum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    /// Maximum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    /// Keep fields not described by the schema.
    #[serde(
        rename = "x-kubernetes-preserve-unknown-fields",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preserve_unknown_fields: Option<bool>,

    /// The value is a complete embedded object with its own metadata.
    #[serde(
        rename = "x-kubernetes-embedded-resource",
        default,
        skip_serializing_if = "is_false"
    )]
    pub embedded_resource: bool,

    /// The value is either an integer or a string.
    #[serde(
        rename = "x-kubernetes-int-or-string",
        default,
        skip_serializing_if = "is_false"
    )]
    pub int_or_string: bool,
}

impl SchemaNode {
    /// A node of the given JSON type.
    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }

    /// An `object` node.
    pub fn object() -> Self {
        Self::typed("object")
    }

    /// A `string` node.
    pub fn string() -> Self {
        Self::typed("string")
    }

    /// Set the format.
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Visit this node and every node below it, parents first.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut SchemaNode)) {
        visit(self);
        for child in self.properties.values_mut() {
            child.walk_mut(visit);
        }
        if let Some(items) = self.items.as_deref_mut() {
            items.walk_mut(visit);
        }
        if let Some(additional) = self.additional_properties.as_deref_mut() {
            additional.walk_mut(visit);
        }
    }

    /// Visit this node and every node below it, parents first.
    pub fn walk(&self, visit: &mut dyn FnMut(&SchemaNode)) {
        visit(self);
        for child in self.properties.values() {
            child.walk(visit);
        }
        if let Some(items) = self.items.as_deref() {
            items.walk(visit);
        }
        if let Some(additional) = self.additional_properties.as_deref() {
            additional.walk(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_members_are_omitted() {
        let node = SchemaNode::string();
        assert_eq!(serde_json::to_value(&node).unwrap(), json!({"type": "string"}));
    }

    #[test]
    fn test_extension_keys_serialize_with_kubernetes_names() {
        let node = SchemaNode {
            preserve_unknown_fields: Some(true),
            int_or_string: true,
            ..SchemaNode::default()
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["x-kubernetes-preserve-unknown-fields"], json!(true));
        assert_eq!(value["x-kubernetes-int-or-string"], json!(true));
    }

    #[test]
    fn test_walk_visits_nested_nodes() {
        let mut root = SchemaNode::object();
        let mut list = SchemaNode::typed("array");
        list.items = Some(Box::new(SchemaNode::string()));
        root.properties.insert("names".into(), list);
        let mut count = 0;
        root.walk(&mut |_| count += 1);
        assert_eq!(count, 3);
    }
}
