//! # YAML Rendering
//!
//! Renders a finished document as a YAML file body: the header, a document
//! separator, then the document. The document is first converted into a
//! JSON object so that transforms can edit it generically; object keys are
//! sorted, which makes the output byte-stable.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::document::ResourceDocument;

/// Error rendering a document.
#[derive(Error, Debug)]
pub enum EmitError {
    /// The document could not be converted to a JSON value.
    #[error("converting document to a value: {0}")]
    ToValue(#[from] serde_json::Error),

    /// The document did not convert to an object.
    #[error("document did not serialize to an object")]
    NotAnObject,

    /// YAML serialization failed.
    #[error("serializing YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Edits the serialized document object before it is written.
pub type Transform = fn(&mut Map<String, Value>);

/// Remove the top-level `status` key.
pub fn remove_status(obj: &mut Map<String, Value>) {
    obj.remove("status");
}

/// Render `doc` as `header`, `---`, then YAML, applying `transforms` in order.
pub fn render_yaml(
    header: &str,
    doc: &ResourceDocument,
    transforms: &[Transform],
) -> Result<String, EmitError> {
    let Value::Object(mut obj) = serde_json::to_value(doc)? else {
        return Err(EmitError::NotAnObject);
    };
    for transform in transforms {
        transform(&mut obj);
    }
    let yaml = serde_yaml::to_string(&Value::Object(obj))?;
    let mut out = String::with_capacity(header.len() + yaml.len() + 4);
    out.push_str(header);
    out.push_str("---\n");
    out.push_str(&yaml);
    Ok(out)
}
