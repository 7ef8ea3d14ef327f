//! Logical content of a multi-line field
//!
//! The buffer is a sequence of chars (code points) with a cursor in
//! `[0, len]`. Every offset in this module is a char offset, so no
//! operation can split a multi-byte character.
//!
//! Vertical motion works on raw lines (split on `'\n'`), not on wrapped
//! display rows: moving up or down keeps the column within the raw line,
//! clamped to the target line's length.

/// Number of spaces inserted by the tab command
pub const TAB_SPACES: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding `text` with the cursor at the start
    pub fn from_text(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            cursor: 0,
        }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Place the cursor, clamped to the buffer
    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.chars.len());
    }

    /// Replace the whole content, keeping the cursor as close as possible
    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.cursor = self.cursor.min(self.chars.len());
    }

    /// Insert `text` at `pos` (clamped). A cursor at or after `pos` moves
    /// past the inserted text.
    pub fn insert_at(&mut self, pos: usize, text: &str) {
        let pos = pos.min(self.chars.len());
        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();
        self.chars.splice(pos..pos, inserted);
        if self.cursor >= pos {
            self.cursor += count;
        }
        self.debug_check();
    }

    /// Delete up to `len` chars starting at `pos`. The cursor is pulled back
    /// to stay on the same content.
    pub fn delete_range(&mut self, pos: usize, len: usize) {
        let start = pos.min(self.chars.len());
        let end = start.saturating_add(len).min(self.chars.len());
        if start == end {
            return;
        }
        self.chars.drain(start..end);
        if self.cursor >= end {
            self.cursor -= end - start;
        } else if self.cursor > start {
            self.cursor = start;
        }
        self.debug_check();
    }

    /// Insert text at the cursor
    pub fn insert(&mut self, text: &str) {
        self.insert_at(self.cursor, text);
    }

    pub fn insert_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.insert(c.encode_utf8(&mut buf));
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Tab inserts spaces, never a literal tab
    pub fn insert_tab(&mut self) {
        self.insert(&" ".repeat(TAB_SPACES));
    }

    /// Delete the char before the cursor
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.delete_range(self.cursor - 1, 1);
        }
    }

    /// Delete the char at the cursor
    pub fn delete(&mut self) {
        self.delete_range(self.cursor, 1);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    pub fn move_line_start(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    pub fn move_line_end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    pub fn move_buffer_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_buffer_end(&mut self) {
        self.cursor = self.chars.len();
    }

    /// Move to the previous raw line, keeping the column (clamped)
    pub fn move_up(&mut self) {
        let start = self.line_start(self.cursor);
        if start == 0 {
            return;
        }
        let column = self.cursor - start;
        let prev_end = start - 1;
        let prev_start = self.line_start(prev_end);
        self.cursor = prev_start + column.min(prev_end - prev_start);
    }

    /// Move to the next raw line, keeping the column (clamped)
    pub fn move_down(&mut self) {
        let end = self.line_end(self.cursor);
        if end == self.chars.len() {
            return;
        }
        let column = self.cursor - self.line_start(self.cursor);
        let next_start = end + 1;
        let next_end = self.line_end(next_start);
        self.cursor = next_start + column.min(next_end - next_start);
    }

    /// Raw line index and column of the cursor
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let start = self.line_start(self.cursor);
        let line = self.chars[..start].iter().filter(|&&c| c == '\n').count();
        (line, self.cursor - start)
    }

    /// Number of raw lines (an empty buffer has one)
    pub fn raw_line_count(&self) -> usize {
        self.chars.iter().filter(|&&c| c == '\n').count() + 1
    }

    fn line_start(&self, pos: usize) -> usize {
        self.chars[..pos]
            .iter()
            .rposition(|&c| c == '\n')
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.chars[pos..]
            .iter()
            .position(|&c| c == '\n')
            .map(|i| pos + i)
            .unwrap_or(self.chars.len())
    }

    fn debug_check(&self) {
        debug_assert!(
            self.cursor <= self.chars.len(),
            "cursor {} beyond buffer length {}",
            self.cursor,
            self.chars.len()
        );
    }
}
