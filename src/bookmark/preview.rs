//! Preview text and field escaping for bookmark records

const ELLIPSIS: &str = "...";

/// Squash a buffer line into a short single-line label.
///
/// Leading and trailing whitespace is dropped and every inner whitespace run
/// becomes one space. Results longer than `width` characters are cut, ending
/// in `...` when there is room for it.
pub fn compress_preview(text: &str, width: usize) -> String {
    let squashed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if squashed.chars().count() <= width {
        return squashed;
    }

    if width <= ELLIPSIS.len() {
        return squashed.chars().take(width).collect();
    }

    let mut cut: String = squashed.chars().take(width - ELLIPSIS.len()).collect();
    cut.truncate(cut.trim_end().len());
    cut.push_str(ELLIPSIS);
    cut
}

/// Escape a field so it holds no tab or line break
pub fn escape_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_field`]. Unknown escapes are kept verbatim.
pub fn unescape_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
