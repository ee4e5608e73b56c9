//! Char-indexed string helpers.
//!
//! Every offset the engine exposes counts Unicode scalar values, not bytes.
//! These helpers translate between the two and give `substring`-style
//! clamping so out-of-range offsets from a text surface never panic.

/// Number of chars in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the char at `char_index`, clamped to `s.len()`.
pub fn byte_offset(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map_or(s.len(), |(byte, _)| byte)
}

/// Slices `s` by char offsets. Offsets are clamped to the string length and
/// an inverted range yields an empty slice.
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let from = byte_offset(s, start);
    let to = byte_offset(s, end);
    &s[from..to]
}

/// Everything from char offset `start` to the end of `s`.
pub fn char_tail(s: &str, start: usize) -> &str {
    &s[byte_offset(s, start)..]
}

/// Replaces the chars in `[start, end)` with `insert`.
///
/// Follows substring semantics: both offsets are clamped, and when `end`
/// precedes `start` the tail is taken from `end`, so the overlap appears
/// twice rather than being dropped.
pub fn splice_string(s: &str, start: usize, end: usize, insert: &str) -> String {
    let head = &s[..byte_offset(s, start)];
    let tail = char_tail(s, end);
    let mut out = String::with_capacity(head.len() + insert.len() + tail.len());
    out.push_str(head);
    out.push_str(insert);
    out.push_str(tail);
    out
}

/// Char offset of the last occurrence of `needle` in `haystack`.
///
/// An empty needle matches at the very end.
pub fn rfind_char_index(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .rfind(needle)
        .map(|byte| char_len(&haystack[..byte]))
}

/// Length of the common char prefix of `a` and `b`.
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}
