//! Depth-counted parenthesis scanning over cleaned SQL text
//!
//! Balanced groups of arbitrary depth cannot be matched by regex alone, so
//! group boundaries are found by counting. All offsets are byte offsets;
//! parentheses are ASCII, so scanning bytes never splits a UTF-8 character.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static USING_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bUSING\s*\(").unwrap());

/// Find the `)` matching the `(` at byte offset `open`.
///
/// Returns `None` when `open` is not a `(` or the group is never closed.
pub fn find_matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }

    let mut depth = 0usize;
    for (offset, &b) in bytes[open..].iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte range of the parenthesized group opening at `open`, both parens included.
///
/// An unclosed group extends to the end of the text.
pub fn paren_group(text: &str, open: usize) -> Range<usize> {
    match find_matching_paren(text, open) {
        Some(close) => open..close + 1,
        None => open..text.len(),
    }
}

/// Spans of every `USING ( ... )` group, i.e. MERGE source subqueries.
pub fn using_subquery_spans(text: &str) -> Vec<Range<usize>> {
    USING_OPEN_RE
        .find_iter(text)
        .map(|m| paren_group(text, m.end() - 1))
        .collect()
}

/// Whether `offset` falls inside any of `spans`
pub fn in_any_span(spans: &[Range<usize>], offset: usize) -> bool {
    spans.iter().any(|span| span.contains(&offset))
}

/// First non-whitespace character at or after `offset`
pub fn next_significant_char(text: &str, offset: usize) -> Option<char> {
    text.get(offset..)?.chars().find(|c| !c.is_whitespace())
}

/// Last word (letters, digits, `_`) ending before `offset`, skipping whitespace
pub fn preceding_word(text: &str, offset: usize) -> Option<&str> {
    let before = text.get(..offset)?.trim_end();
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)?;
    Some(&before[start..])
}
