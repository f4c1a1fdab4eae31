//! # Naming Defaults
//!
//! Default resource names derived from a kind: lowercase plural, lowercase
//! singular, and `<Kind>List`. Annotations may override any of them later.
//!
//! Pluralization follows English rules for the shapes kind names usually
//! take: irregular and uncountable words, sibilant endings, consonant + `y`,
//! `f`/`fe` endings and a few Greek/Latin endings.

use crate::document::ResourceNames;

const UNCOUNTABLE: &[&str] = &[
    "data", "equipment", "fish", "information", "metadata", "money", "news", "rice",
    "series", "sheep", "species",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("index", "indices"),
    ("man", "men"),
    ("matrix", "matrices"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("person", "people"),
    ("quiz", "quizzes"),
    ("tooth", "teeth"),
    ("vertex", "vertices"),
    ("woman", "women"),
];

const F_TO_VES: &[&str] = &["knife", "leaf", "life", "loaf", "self", "shelf", "wife", "wolf"];

const O_TO_OES: &[&str] = &["echo", "hero", "potato", "tomato", "veto"];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// English plural of `word`, preserving the case of the stem.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();

    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == lower) {
        return replace_suffix(word, lower.len(), plural);
    }
    if F_TO_VES.contains(&lower.as_str()) {
        let stem = if lower.ends_with("fe") { 2 } else { 1 };
        return format!("{}ves", &word[..word.len() - stem]);
    }
    if O_TO_OES.contains(&lower.as_str()) {
        return format!("{word}es");
    }
    if lower.ends_with("is") && lower.len() > 3 {
        // analysis -> analyses
        return format!("{}es", &word[..word.len() - 2]);
    }
    if lower.ends_with("s")
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{word}es");
    }
    if lower.ends_with('y') {
        let before = lower.chars().rev().nth(1);
        if before.is_some_and(|c| !is_vowel(c)) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }
    format!("{word}s")
}

/// Replace the last `len` bytes of `word` with `replacement`, keeping an
/// uppercase first letter if the whole word is being replaced.
fn replace_suffix(word: &str, len: usize, replacement: &str) -> String {
    let stem = &word[..word.len() - len];
    let capitalized = stem.is_empty() && word.chars().next().is_some_and(char::is_uppercase);
    if capitalized {
        let mut chars = replacement.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        format!("{stem}{replacement}")
    }
}

/// Default names for `kind`.
pub fn default_names(kind: &str) -> ResourceNames {
    ResourceNames {
        plural: pluralize(kind).to_lowercase(),
        singular: kind.to_lowercase(),
        short_names: Vec::new(),
        kind: kind.to_string(),
        list_kind: format!("{kind}List"),
        categories: Vec::new(),
    }
}
