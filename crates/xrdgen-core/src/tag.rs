//! # Struct Tags
//!
//! Parsing of raw field tags of the form `json:"name,omitempty" yaml:"name"`.
//! A field with no `json` key has custom serialization and never takes part
//! in schema generation or kind classification.

/// A raw field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructTag<'a>(pub &'a str);

impl<'a> StructTag<'a> {
    /// Value stored under `key`, or `None` if the key is absent or the tag
    /// is malformed before reaching it.
    pub fn lookup(&self, key: &str) -> Option<&'a str> {
        let mut rest = self.0;
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                return None;
            }
            let colon = rest.find(':')?;
            let name = &rest[..colon];
            if name.is_empty() || name.contains(|c: char| c == ' ' || c == '"') {
                return None;
            }
            rest = &rest[colon + 1..];
            let body = rest.strip_prefix('"')?;
            let end = closing_quote(body)?;
            let value = &body[..end];
            rest = &body[end + 1..];
            if name == key {
                return Some(value);
            }
        }
    }

    /// The parsed `json` entry, if present.
    pub fn json(&self) -> Option<JsonTag> {
        self.lookup("json").map(JsonTag::parse)
    }
}

/// Index of the first unescaped `"` in `s`.
fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in s.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return Some(idx),
            _ => escaped = false,
        }
    }
    None
}

/// The `json` entry of a struct tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonTag {
    /// Serialized name; empty means "use the field name".
    pub name: String,
    /// `omitempty` option present.
    pub omit_empty: bool,
    /// `inline` option present.
    pub inline: bool,
    /// The tag is exactly `-`: the field is never serialized.
    pub skip: bool,
}

impl JsonTag {
    /// Parse the value of a `json` tag entry.
    pub fn parse(value: &str) -> Self {
        if value == "-" {
            return Self {
                skip: true,
                ..Self::default()
            };
        }
        let mut parts = value.split(',');
        let name = parts.next().unwrap_or_default().to_string();
        let mut tag = Self {
            name,
            ..Self::default()
        };
        for opt in parts {
            match opt {
                "omitempty" => tag.omit_empty = true,
                "inline" => tag.inline = true,
                _ => {}
            }
        }
        tag
    }
}
