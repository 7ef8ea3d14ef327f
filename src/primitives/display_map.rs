//! Mapping between logical cursor offsets and wrapped display positions
//!
//! Control characters are shown with a one-char indicator glyph in front of
//! them (a tab is displayed as `→` followed by the tab itself). Only the
//! displayed text changes; the buffer keeps the raw content.
//!
//! Because the indicators shift every following offset, a logical cursor is
//! mapped by running the same substitution over the content prefix that ends
//! at the cursor and counting the result. The display offset is then resolved
//! to a (row, column) pair by walking the wrapped rows.

use super::line_wrapping::DisplayLine;

/// Indicator shown before a tab
pub const TAB_INDICATOR: char = '→';

/// Indicator shown before a carriage return
pub const CR_INDICATOR: char = '←';

/// Indicator shown before any other control character
pub const CONTROL_INDICATOR: char = '·';

/// Indicator glyph for `c`, if it gets one. Line breaks never do.
pub fn indicator_for(c: char) -> Option<char> {
    match c {
        '\n' => None,
        '\t' => Some(TAB_INDICATOR),
        '\r' => Some(CR_INDICATOR),
        c if c.is_control() => Some(CONTROL_INDICATOR),
        _ => None,
    }
}

fn push_display<I: IntoIterator<Item = char>>(chars: I, out: &mut String) {
    for c in chars {
        if let Some(indicator) = indicator_for(c) {
            out.push(indicator);
        }
        out.push(c);
    }
}

/// Display form of a char slice
pub fn display_text_of(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    push_display(chars.iter().copied(), &mut out);
    out
}

/// Display offset of a logical cursor position (both in chars).
///
/// `cursor` is clamped to the content length.
pub fn display_offset(chars: &[char], cursor: usize) -> usize {
    let cursor = cursor.min(chars.len());
    display_text_of(&chars[..cursor]).chars().count()
}

/// Resolve a display offset to `(row, column)` within wrapped `lines`.
///
/// Rows are walked accumulating each row's length plus the chars consumed
/// after it (the newline or swallowed whitespace). An offset sitting exactly
/// at the end of a hard-split row belongs to the start of the next row; one
/// inside swallowed whitespace resolves to column 0 of the next row. The
/// result is always a valid row index with `column <= row length`.
pub fn locate(lines: &[DisplayLine], offset: usize) -> (usize, usize) {
    let mut start = 0;
    for (row, line) in lines.iter().enumerate() {
        let end = start + line.len();
        let is_last = row + 1 == lines.len();
        if offset < end || (offset == end && (line.gap() > 0 || is_last)) {
            return (row, offset.saturating_sub(start).min(line.len()));
        }
        start = end + line.gap();
    }

    match lines.last() {
        Some(last) => (lines.len() - 1, last.len()),
        None => (0, 0),
    }
}
