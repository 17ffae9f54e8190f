//! # Naming Predicates
//!
//! The convention fixes three casing styles: lowercase-hyphen for directory
//! and file names, snake_case for substitution names and entity ids, and
//! Title Case for entity display names. These predicates are pure string
//! checks; the naming rule in packlint-pack decides what they apply to.

/// Lowercase-hyphen: `[a-z0-9-]+`, no leading or trailing hyphen.
///
/// Applies to directory names and file stems (`sensor-node`, `esp32s3`).
pub fn is_lowercase_hyphen(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// snake_case: starts with a lowercase letter, then `[a-z0-9_]`.
///
/// Applies to substitution names and entity ids (`firmware_name`,
/// `wifi_signal_db`).
pub fn is_snake_case(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Title Case: every word's first alphabetic character is uppercase.
///
/// Words containing a `${...}` substitution reference are exempt — display
/// names like `${friendly_name} Uptime` are the normal pattern. Words with
/// no alphabetic characters (numbers, punctuation) are also skipped.
pub fn is_title_case(s: &str) -> bool {
    if s.trim().is_empty() {
        return false;
    }
    s.split_whitespace().all(|word| {
        if word.contains("${") {
            return true;
        }
        match word.chars().find(|c| c.is_alphabetic()) {
            Some(first) => first.is_uppercase(),
            None => true,
        }
    })
}
