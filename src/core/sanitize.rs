// src/core/sanitize.rs

/// Collapse runs of whitespace (including NBSP and the full-width space the
/// portal pads cells with) into one ASCII space, trimmed.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if is_space(ch) {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

#[inline]
pub fn is_space(ch: char) -> bool {
    ch.is_whitespace() || ch == '\u{00A0}' || ch == '\u{3000}'
}

/// Trim a ticker/identifier cell: surrounding whitespace of any width, plus a
/// stray `'` that spreadsheet exports use to force text.
pub fn clean_id(s: &str) -> String {
    s.trim_matches(|c: char| is_space(c) || c == '\'' || c == '"').to_string()
}

/// A cell that carries no value after cleaning ("", spaces, "nan" from sheet exports).
pub fn is_blank(s: &str) -> bool {
    let t = clean_id(s);
    t.is_empty() || t.eq_ignore_ascii_case("nan")
}

/// A file-name component without path separators, characters Windows
/// refuses, or whitespace. Ids that this would change are not valid keys.
pub fn file_component(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .filter(|c| !is_space(*c))
        .collect()
}
