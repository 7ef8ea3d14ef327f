//! Single-line text input control
//!
//! Renders as: `Label: [text content     ]`
//!
//! Used for scalar fields while they are being edited. The cursor is a
//! char index, so multi-byte input never splits a character.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::FocusState;

/// State for a text input control
#[derive(Debug, Clone)]
pub struct TextInputState {
    /// Current text value
    pub value: String,
    /// Cursor position (char index)
    pub cursor: usize,
    /// Label displayed before the input
    pub label: String,
    /// Placeholder text when empty
    pub placeholder: String,
    /// Focus state
    pub focus: FocusState,
}

impl TextInputState {
    /// Create a new text input state
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            label: label.into(),
            placeholder: String::new(),
            focus: FocusState::Normal,
        }
    }

    /// Set the initial value, cursor at the end
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = self.char_len();
        self
    }

    /// Set the placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set the focus state
    pub fn with_focus(mut self, focus: FocusState) -> Self {
        self.focus = focus;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.focus != FocusState::Disabled
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Insert a character at the cursor position
    pub fn insert(&mut self, c: char) {
        if !self.is_enabled() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor
    pub fn backspace(&mut self) {
        if !self.is_enabled() || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
    }

    /// Delete the character at the cursor
    pub fn delete(&mut self) {
        if !self.is_enabled() || self.cursor >= self.char_len() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Clear the input
    pub fn clear(&mut self) {
        if self.is_enabled() {
            self.value.clear();
            self.cursor = 0;
        }
    }
}

/// Colors for the text input control
#[derive(Debug, Clone, Copy)]
pub struct TextInputColors {
    pub label: Color,
    pub text: Color,
    pub border: Color,
    pub placeholder: Color,
    pub cursor: Color,
    pub focused: Color,
    pub disabled: Color,
}

impl Default for TextInputColors {
    fn default() -> Self {
        Self {
            label: Color::White,
            text: Color::White,
            border: Color::Gray,
            placeholder: Color::DarkGray,
            cursor: Color::Yellow,
            focused: Color::Cyan,
            disabled: Color::DarkGray,
        }
    }
}

/// Layout information returned after rendering
#[derive(Debug, Clone, Copy, Default)]
pub struct TextInputLayout {
    /// The text input field area
    pub input_area: Rect,
    /// Cursor position in screen coordinates (if focused)
    pub cursor_pos: Option<(u16, u16)>,
}

/// Render a text input control
///
/// `label_width` pads the label so several rows line up.
pub fn render_text_input(
    frame: &mut Frame,
    area: Rect,
    state: &TextInputState,
    colors: &TextInputColors,
    label_width: Option<u16>,
) -> TextInputLayout {
    if area.height == 0 || area.width < 5 {
        return TextInputLayout::default();
    }

    let (label_color, border_color) = match state.focus {
        FocusState::Normal => (colors.label, colors.border),
        FocusState::Focused => (colors.focused, colors.focused),
        FocusState::Disabled => (colors.disabled, colors.disabled),
    };

    let actual_label_width = label_width.unwrap_or(state.label.width() as u16);
    let prefix_width = actual_label_width + 2; // label + ": "
    let inner_width = area.width.saturating_sub(prefix_width + 2) as usize; // "[" + "]"

    let (display_text, is_placeholder) = if state.value.is_empty() && !state.placeholder.is_empty()
    {
        (state.placeholder.as_str(), true)
    } else {
        (state.value.as_str(), false)
    };

    // Keep the cursor inside the brackets
    let scroll = state.cursor.saturating_sub(inner_width.saturating_sub(1));
    let visible: String = display_text
        .chars()
        .skip(scroll)
        .take(inner_width)
        .collect();
    let padding = inner_width.saturating_sub(visible.width());

    let text_style = if is_placeholder {
        Style::default().fg(colors.placeholder)
    } else {
        Style::default().fg(colors.text)
    };

    let padded_label = format!("{:width$}", state.label, width = actual_label_width as usize);
    let line = Line::from(vec![
        Span::styled(padded_label, Style::default().fg(label_color)),
        Span::styled(": ", Style::default().fg(label_color)),
        Span::styled("[", Style::default().fg(border_color)),
        Span::styled(format!("{visible}{}", " ".repeat(padding)), text_style),
        Span::styled("]", Style::default().fg(border_color)),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    let input_start = area.x + prefix_width;
    let input_area = Rect::new(input_start, area.y, inner_width as u16 + 2, 1);

    let cursor_pos = if state.focus == FocusState::Focused {
        let before: String = display_text
            .chars()
            .skip(scroll)
            .take(state.cursor - scroll)
            .collect();
        let cursor_x = input_start + 1 + before.width() as u16;
        if is_placeholder {
            Some((input_start + 1, area.y))
        } else if cursor_x < input_start + 1 + inner_width as u16 {
            let cursor_char = state.value.chars().nth(state.cursor).unwrap_or(' ');
            frame.render_widget(
                Paragraph::new(Span::styled(
                    cursor_char.to_string(),
                    Style::default()
                        .fg(colors.cursor)
                        .add_modifier(Modifier::REVERSED),
                )),
                Rect::new(cursor_x, area.y, 1, 1),
            );
            Some((cursor_x, area.y))
        } else {
            None
        }
    } else {
        None
    };

    TextInputLayout {
        input_area,
        cursor_pos,
    }
}
