//! Multi-line text control with soft wrapping
//!
//! Ties the pieces of the long-text editor together: the logical
//! [`TextBuffer`], the display transform and wrapper, and the
//! [`ScrollWindow`]. After every edit, cursor move or resize the display
//! lines are recomputed and the window follows the cursor row. Paging moves
//! only the window.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::model::text_buffer::TextBuffer;
use crate::primitives::display_map::{display_offset, display_text_of, indicator_for, locate};
use crate::primitives::line_wrapping::{wrap, DisplayLine};
use crate::view::viewport::{ScrollWindow, PAGE_STEP};

#[derive(Debug, Clone)]
pub struct MultilineEditor {
    buffer: TextBuffer,
    width: usize,
    window: ScrollWindow,
    lines: Vec<DisplayLine>,
    cursor_row: usize,
    cursor_col: usize,
    read_only: bool,
    page_step: usize,
}

impl MultilineEditor {
    /// Open `text` read-only in a `width` x `height` area
    pub fn new(text: &str, width: usize, height: usize) -> Self {
        let mut editor = Self {
            buffer: TextBuffer::from_text(text),
            width,
            window: ScrollWindow::new(height),
            lines: Vec::new(),
            cursor_row: 0,
            cursor_col: 0,
            read_only: true,
            page_step: PAGE_STEP,
        };
        editor.relayout();
        editor
    }

    pub fn with_page_step(mut self, step: usize) -> Self {
        self.page_step = step.max(1);
        self
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn window(&self) -> &ScrollWindow {
        &self.window
    }

    pub fn display_lines(&self) -> &[DisplayLine] {
        &self.lines
    }

    /// Rows currently inside the scroll window, with their indices
    pub fn visible_lines(&self) -> impl Iterator<Item = (usize, &DisplayLine)> {
        let range = self.window.visible_range(self.lines.len());
        self.lines[range.clone()]
            .iter()
            .enumerate()
            .map(move |(i, line)| (range.start + i, line))
    }

    /// Cursor position in display coordinates: (row, column)
    pub fn cursor_display(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    /// Replace the content (used when a viewed field changes underneath)
    pub fn replace_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.relayout();
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.lines = wrap(&display_text_of(self.buffer.chars()), self.width);
        self.locate_cursor();
        self.window
            .resize(height, self.cursor_row, self.lines.len());
    }

    fn relayout(&mut self) {
        self.lines = wrap(&display_text_of(self.buffer.chars()), self.width);
        self.locate_cursor();
        self.window.follow(self.cursor_row, self.lines.len());
    }

    fn locate_cursor(&mut self) {
        let offset = display_offset(self.buffer.chars(), self.buffer.cursor());
        let (row, col) = locate(&self.lines, offset);
        self.cursor_row = row;
        self.cursor_col = col;
    }

    fn edit(&mut self, f: impl FnOnce(&mut TextBuffer)) {
        if self.read_only {
            return;
        }
        f(&mut self.buffer);
        self.relayout();
    }

    fn motion(&mut self, f: impl FnOnce(&mut TextBuffer)) {
        f(&mut self.buffer);
        self.relayout();
    }

    pub fn insert_char(&mut self, c: char) {
        self.edit(|b| b.insert_char(c));
    }

    pub fn insert_str(&mut self, text: &str) {
        self.edit(|b| b.insert(text));
    }

    pub fn insert_newline(&mut self) {
        self.edit(TextBuffer::insert_newline);
    }

    pub fn insert_tab(&mut self) {
        self.edit(TextBuffer::insert_tab);
    }

    pub fn backspace(&mut self) {
        self.edit(TextBuffer::backspace);
    }

    pub fn delete(&mut self) {
        self.edit(TextBuffer::delete);
    }

    pub fn move_left(&mut self) {
        self.motion(TextBuffer::move_left);
    }

    pub fn move_right(&mut self) {
        self.motion(TextBuffer::move_right);
    }

    pub fn move_up(&mut self) {
        self.motion(TextBuffer::move_up);
    }

    pub fn move_down(&mut self) {
        self.motion(TextBuffer::move_down);
    }

    pub fn move_line_start(&mut self) {
        self.motion(TextBuffer::move_line_start);
    }

    pub fn move_line_end(&mut self) {
        self.motion(TextBuffer::move_line_end);
    }

    pub fn move_buffer_start(&mut self) {
        self.motion(TextBuffer::move_buffer_start);
    }

    pub fn move_buffer_end(&mut self) {
        self.motion(TextBuffer::move_buffer_end);
    }

    pub fn page_up(&mut self) {
        self.window.page_up(self.page_step, self.lines.len());
    }

    pub fn page_down(&mut self) {
        self.window.page_down(self.page_step, self.lines.len());
    }
}

/// Colors for the multi-line control
#[derive(Debug, Clone, Copy)]
pub struct MultilineColors {
    pub text: Color,
    pub indicator: Color,
    pub cursor: Color,
    pub read_only: Color,
}

impl Default for MultilineColors {
    fn default() -> Self {
        Self {
            text: Color::White,
            indicator: Color::DarkGray,
            cursor: Color::Yellow,
            read_only: Color::Gray,
        }
    }
}

/// A control char is drawn as one blank cell
fn cell_char(c: char) -> char {
    if c.is_control() {
        ' '
    } else {
        c
    }
}

fn row_spans<'a>(line: &DisplayLine, text_style: Style, indicator_style: Style) -> Line<'a> {
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut chars = line.text().chars().peekable();
    while let Some(c) = chars.next() {
        let next_is_marked = chars.peek().and_then(|&n| indicator_for(n)) == Some(c);
        if next_is_marked {
            if !run.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut run), text_style));
            }
            spans.push(Span::styled(c.to_string(), indicator_style));
        } else {
            run.push(cell_char(c));
        }
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, text_style));
    }
    Line::from(spans)
}

/// Render the visible rows of `editor` into `area`.
///
/// Returns the screen position of the cursor when it is inside the window.
pub fn render_multiline(
    frame: &mut Frame,
    area: Rect,
    editor: &MultilineEditor,
    colors: &MultilineColors,
) -> Option<(u16, u16)> {
    if area.height == 0 || area.width == 0 {
        return None;
    }

    let text_color = if editor.is_read_only() {
        colors.read_only
    } else {
        colors.text
    };
    let text_style = Style::default().fg(text_color);
    let indicator_style = Style::default().fg(colors.indicator);

    let rows: Vec<Line> = editor
        .visible_lines()
        .map(|(_, line)| row_spans(line, text_style, indicator_style))
        .collect();
    frame.render_widget(Paragraph::new(rows), area);

    if editor.is_read_only() {
        return None;
    }

    let (row, col) = editor.cursor_display();
    let range = editor.window().visible_range(editor.display_lines().len());
    if !range.contains(&row) {
        return None;
    }

    // Wide chars take two cells, so the cursor cell is the width of the prefix
    let text = editor.display_lines()[row].text();
    let prefix: String = text.chars().take(col).map(cell_char).collect();
    let cells = UnicodeWidthStr::width(prefix.as_str()) as u16;

    let y = area.y + (row - range.start) as u16;
    let x = area.x + cells.min(area.width - 1);
    let under = text.chars().nth(col).map(cell_char).unwrap_or(' ');
    let under_width = (under.width().unwrap_or(1).max(1) as u16).min(area.right() - x);
    frame.render_widget(
        Paragraph::new(Span::styled(
            under.to_string(),
            Style::default()
                .fg(colors.cursor)
                .add_modifier(Modifier::REVERSED),
        )),
        Rect::new(x, y, under_width, 1),
    );
    Some((x, y))
}
