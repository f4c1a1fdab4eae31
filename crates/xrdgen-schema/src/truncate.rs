//! # Description Truncation
//!
//! Limits description text across a schema tree. A limit of `0` drops every
//! description; any other limit cuts each description back to the last
//! sentence boundary that fits, falling back to a hard cut when the kept
//! prefix has no sentence boundary.
//!
//! Lengths are counted in characters, not bytes.

use crate::node::SchemaNode;

/// Apply the description limit to `node` and everything below it.
pub fn truncate_description(node: &mut SchemaNode, max_len: usize) {
    node.walk_mut(&mut |n| {
        if n.description.is_empty() {
            return;
        }
        n.description = if max_len == 0 {
            String::new()
        } else {
            truncate_text(&n.description, max_len)
        };
    });
}

/// Truncate one description to at most `max_len` characters.
pub fn truncate_text(desc: &str, max_len: usize) -> String {
    let cut = match desc.char_indices().nth(max_len) {
        Some((byte_idx, _)) => byte_idx,
        None => return desc.to_string(),
    };
    let prefix = &desc[..cut];
    match prefix.rfind('.') {
        Some(n) if n > 0 => prefix[..=n].to_string(),
        _ => prefix.to_string(),
    }
}
