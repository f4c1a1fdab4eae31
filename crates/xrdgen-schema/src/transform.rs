//! # Root Schema Transforms
//!
//! Adjustments applied to a version's root schema before emission.
//!
//! - The `status` property is owned by the control plane, which injects it
//!   itself, so it is removed from generated schemas.
//! - The top-level `metadata` property must be a bare `object`; the API
//!   server supplies the real object-meta schema.

use crate::node::SchemaNode;

/// Remove the root `status` property. Returns true if one was removed.
pub fn strip_status_property(root: &mut SchemaNode) -> bool {
    let removed = root.properties.remove("status").is_some();
    if removed {
        root.required.retain(|r| r != "status");
    }
    removed
}

/// Reset the root `metadata` property to `{type: object}` if present.
pub fn fix_top_level_metadata(root: &mut SchemaNode) {
    if let Some(meta) = root.properties.get_mut("metadata") {
        *meta = SchemaNode::object();
    }
}
