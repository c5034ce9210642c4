//! Text cleanup helpers shared by extraction and reporting.

/// Collapse every whitespace run (spaces, tabs, newlines) into a single space.
///
/// `None` and empty input both yield an empty string.
pub fn normalize(text: Option<&str>) -> String {
    match text {
        Some(text) if !text.is_empty() => text.split_whitespace().collect::<Vec<_>>().join(" "),
        _ => String::new(),
    }
}

/// Keep at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
