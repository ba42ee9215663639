//! Resource naming: logical IDs for compiled fragments and random suffixes.

use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

/// Shortest suffix [`random_suffix`] will produce.
pub const MIN_SUFFIX_LEN: usize = 8;

fn word_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[^A-Za-z0-9]+").expect("separator pattern is valid"))
}

/// PascalCase an identifier into a template-legal logical ID.
///
/// Non-alphanumeric runs split words; each word gets an upper-case first
/// character and keeps the rest untouched, so `my-glue_job` becomes
/// `MyGlueJob` and an already formatted name maps to itself.
pub fn to_resource_name(identifier: &str) -> String {
    word_separator()
        .split(identifier)
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Random alphanumeric suffix of at least [`MIN_SUFFIX_LEN`] characters.
pub fn random_suffix(length: usize) -> String {
    let length = length.max(MIN_SUFFIX_LEN);
    let mut suffix = String::with_capacity(length);
    while suffix.len() < length {
        suffix.push_str(&Uuid::new_v4().simple().to_string());
    }
    suffix.truncate(length);
    suffix
}
