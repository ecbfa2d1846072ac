//! Name Normalizer
//!
//! Converts free-form document text into canonical identifiers: every
//! whitespace-separated word gets an upper-case first character and the words
//! are concatenated. Punctuation is left alone; callers strip brackets,
//! commas or periods before or after normalizing, depending on whether they
//! still need them for a classification decision.

/// Normalize text into a canonical identifier.
///
/// # Examples
/// ```rust
/// use spvspec_core::extractor::naming::normalize;
/// assert_eq!(normalize("storage class"), "StorageClass");
/// assert_eq!(normalize("Result Type"), "ResultType");
/// assert_eq!(normalize("   "), "");
/// ```
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Append a plural `s` unless the name already ends in one.
pub fn pluralize(name: &str) -> String {
    if name.ends_with('s') {
        name.to_string()
    } else {
        format!("{}s", name)
    }
}

/// Drop a leading section number (`3.32.1.`, `2.1`, `3.`) and the
/// whitespace after it.
pub fn strip_numbering(heading: &str) -> &str {
    let trimmed = heading.trim();
    let numbered = trimmed
        .split_once(char::is_whitespace)
        .filter(|(first, _)| {
            !first.is_empty()
                && first.chars().any(|c| c.is_ascii_digit())
                && first.chars().all(|c| c.is_ascii_digit() || c == '.')
        });
    match numbered {
        Some((_, rest)) => rest.trim_start(),
        None => trimmed,
    }
}
