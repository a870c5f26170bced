/// Flatten line breaks, trim, and cap `text` at `max_chars` characters.
///
/// Truncation never splits a character. Whitespace exposed at the cut is
/// trimmed as well, so cleaning an already clean string is a no-op.
pub fn clean(text: &str, max_chars: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let flattened = text.replace(['\n', '\r'], " ");
    let truncated = truncate_chars(flattened.trim(), max_chars);
    truncated.trim_end().to_string()
}

/// Longest prefix of `s` holding at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Drop blank lines and join the remaining trimmed lines with single spaces.
pub fn collapse_paragraph(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
