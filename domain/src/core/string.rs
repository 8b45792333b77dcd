//! String utilities for the domain layer.

/// Truncate a string to a maximum number of characters, appending an
/// ellipsis when anything was cut.
///
/// Counts characters rather than bytes, so multi-byte text is never split
/// inside a code point.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Return at most `max_chars` leading characters of `s` without an ellipsis.
pub fn excerpt(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
