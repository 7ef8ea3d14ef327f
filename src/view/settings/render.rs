//! Settings panel renderer
//!
//! Draws the field list, the detail pane (multi-line editor or option list),
//! the status line and key hints. Colors follow the draft's `theme` field so
//! a theme change is visible as soon as it is committed.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::layout::PanelLayout;
use super::schema::{FieldKind, FIELDS};
use super::state::{Mode, OptionState, SettingsPanel, StatusLevel};
use crate::config::FieldValue;
use crate::view::controls::{
    render_multiline, render_text_input, MultilineColors, MultilineEditor, TextInputColors,
};

/// Colors for the whole panel
#[derive(Debug, Clone, Copy)]
pub struct PanelTheme {
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub selected_bg: Color,
    pub dirty: Color,
    pub info: Color,
    pub warning: Color,
    pub error: Color,
}

impl PanelTheme {
    /// Theme for a `theme` setting value; unknown names get the dark theme
    pub fn named(name: &str) -> Self {
        match name {
            "light" => Self {
                text: Color::Black,
                dim: Color::Gray,
                accent: Color::Blue,
                selected_bg: Color::Rgb(220, 220, 235),
                dirty: Color::Magenta,
                info: Color::Blue,
                warning: Color::Rgb(160, 100, 0),
                error: Color::Red,
            },
            "high-contrast" => Self {
                text: Color::White,
                dim: Color::White,
                accent: Color::Yellow,
                selected_bg: Color::Blue,
                dirty: Color::LightMagenta,
                info: Color::LightCyan,
                warning: Color::LightYellow,
                error: Color::LightRed,
            },
            _ => Self {
                text: Color::White,
                dim: Color::DarkGray,
                accent: Color::Cyan,
                selected_bg: Color::Rgb(40, 40, 60),
                dirty: Color::Yellow,
                info: Color::Green,
                warning: Color::Yellow,
                error: Color::Red,
            },
        }
    }

    fn input_colors(&self) -> TextInputColors {
        TextInputColors {
            label: self.text,
            text: self.text,
            border: self.dim,
            placeholder: self.dim,
            cursor: self.accent,
            focused: self.accent,
            disabled: self.dim,
        }
    }

    fn multiline_colors(&self) -> MultilineColors {
        MultilineColors {
            text: self.text,
            indicator: self.dim,
            cursor: self.accent,
            read_only: self.dim,
        }
    }
}

/// Short display of a field value for the list
fn value_summary(kind: FieldKind, value: &FieldValue) -> String {
    match (kind, value) {
        (FieldKind::Bool, FieldValue::Bool(true)) => "[x]".to_string(),
        (FieldKind::Bool, _) => "[ ]".to_string(),
        (FieldKind::Cycle(_), v) => format!("< {} >", v.display()),
        (FieldKind::Multiline, FieldValue::Text(text)) => {
            let lines = text.lines().count();
            let first = text.lines().next().unwrap_or_default();
            if lines > 1 {
                format!("{first} ... ({lines} lines)")
            } else {
                first.to_string()
            }
        }
        (_, v) if !v.is_set() => "(unset)".to_string(),
        (_, v) => v.display(),
    }
}

fn label_width() -> u16 {
    FIELDS.iter().map(|f| f.label.width()).max().unwrap_or(0) as u16
}

/// Render the panel into `area`.
///
/// Returns the screen position of the text cursor, if an editor shows one.
pub fn render_panel(frame: &mut Frame, area: Rect, panel: &SettingsPanel) -> Option<(u16, u16)> {
    let theme = PanelTheme::named(&panel.settings().theme);
    let layout = PanelLayout::compute(area);

    render_title(frame, layout.title, panel, &theme);
    let mut cursor = render_fields(frame, &layout, panel, &theme);
    if let Some(pos) = render_detail(frame, &layout, panel, &theme) {
        cursor = Some(pos);
    }
    render_status(frame, layout.status, panel, &theme);
    render_help(frame, layout.help, panel, &theme);
    cursor
}

fn render_title(frame: &mut Frame, area: Rect, panel: &SettingsPanel, theme: &PanelTheme) {
    let connection = match panel.connectivity() {
        Some(Ok(version)) => Span::styled(
            format!("connected (v{version})"),
            Style::default().fg(theme.info),
        ),
        Some(Err(_)) => Span::styled("unreachable", Style::default().fg(theme.error)),
        None => Span::styled("checking...", Style::default().fg(theme.dim)),
    };
    let line = Line::from(vec![
        Span::styled(
            "Settings",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}  ", panel.settings().server_url),
            Style::default().fg(theme.dim),
        ),
        connection,
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_fields(
    frame: &mut Frame,
    layout: &PanelLayout,
    panel: &SettingsPanel,
    theme: &PanelTheme,
) -> Option<(u16, u16)> {
    let label_width = label_width();
    let mut cursor = None;

    for (index, field) in FIELDS.iter().enumerate() {
        let Some(row) = layout.field_row(index) else {
            break;
        };
        let selected = index == panel.selected();

        if selected {
            if let Mode::EditingScalar(input) = panel.mode() {
                let input_area = Rect::new(row.x + 2, row.y, row.width.saturating_sub(2), 1);
                let text_layout = render_text_input(
                    frame,
                    input_area,
                    input,
                    &theme.input_colors(),
                    Some(label_width),
                );
                cursor = text_layout.cursor_pos;
                continue;
            }
        }

        let value = panel
            .draft()
            .get(field.key)
            .map(|v| value_summary(field.kind, &v))
            .unwrap_or_default();
        let value_style = if value == "(unset)" {
            Style::default().fg(theme.dim)
        } else {
            Style::default().fg(theme.text)
        };
        let mut row_style = Style::default().fg(theme.text);
        if selected {
            row_style = row_style.bg(theme.selected_bg).add_modifier(Modifier::BOLD);
        }

        let dirty = if panel.draft().is_dirty(field.key) { "*" } else { " " };
        let line = Line::from(vec![
            Span::raw(if selected { "> " } else { "  " }),
            Span::raw(format!("{:width$}", field.label, width = label_width as usize)),
            Span::styled(dirty, Style::default().fg(theme.dirty)),
            Span::raw(" "),
            Span::styled(value, value_style),
        ]);
        frame.render_widget(Paragraph::new(line).style(row_style), row);
    }

    cursor
}

fn render_detail(
    frame: &mut Frame,
    layout: &PanelLayout,
    panel: &SettingsPanel,
    theme: &PanelTheme,
) -> Option<(u16, u16)> {
    if layout.detail.height < 3 {
        return None;
    }
    let field = panel.selected_field();

    match panel.mode() {
        Mode::ViewingMultiline(editor) | Mode::EditingMultiline(editor) => {
            render_editor_pane(frame, layout, field.label, editor, theme)
        }
        Mode::EditingScalar(input) => {
            if let FieldKind::Choice(source) = field.kind {
                let title = format!(" Available {} ", source.label());
                let block = Block::bordered()
                    .title(title)
                    .border_style(Style::default().fg(theme.dim));
                let lines: Vec<Line> = match panel.option_state(source) {
                    None | Some(OptionState::Loading) => {
                        vec![Line::styled("Loading...", Style::default().fg(theme.dim))]
                    }
                    Some(OptionState::Failed(msg)) => {
                        vec![Line::styled(msg.clone(), Style::default().fg(theme.error))]
                    }
                    Some(OptionState::Loaded(options)) if options.is_empty() => {
                        vec![Line::styled("(none)", Style::default().fg(theme.dim))]
                    }
                    Some(OptionState::Loaded(options)) => options
                        .iter()
                        .filter(|o| o.name.starts_with(input.value.trim()))
                        .map(|o| Line::styled(o.name.clone(), Style::default().fg(theme.text)))
                        .collect(),
                };
                frame.render_widget(Paragraph::new(lines).block(block), layout.detail);
            }
            None
        }
        Mode::Browsing => {
            if field.kind == FieldKind::Multiline {
                let preview = panel
                    .draft()
                    .get(field.key)
                    .map(|v| v.display())
                    .unwrap_or_default();
                let editor = MultilineEditor::new(
                    &preview,
                    layout.editor_inner.width as usize,
                    layout.editor_inner.height as usize,
                );
                render_editor_pane(frame, layout, field.label, &editor, theme);
            }
            None
        }
    }
}

fn render_editor_pane(
    frame: &mut Frame,
    layout: &PanelLayout,
    label: &str,
    editor: &MultilineEditor,
    theme: &PanelTheme,
) -> Option<(u16, u16)> {
    let state = if editor.is_read_only() { "view" } else { "edit" };
    let buffer = editor.buffer();
    let (line, col) = buffer.cursor_line_col();
    let block = Block::bordered()
        .title(format!(" {label} ({state}) "))
        .title_bottom(format!(
            " Ln {}/{}, Col {} ",
            line + 1,
            buffer.raw_line_count(),
            col + 1
        ))
        .border_style(Style::default().fg(if editor.is_read_only() {
            theme.dim
        } else {
            theme.accent
        }));
    frame.render_widget(block, layout.detail);
    render_multiline(
        frame,
        layout.editor_inner,
        editor,
        &theme.multiline_colors(),
    )
}

fn render_status(frame: &mut Frame, area: Rect, panel: &SettingsPanel, theme: &PanelTheme) {
    let Some(status) = panel.status() else {
        return;
    };
    let color = match status.level {
        StatusLevel::Info => theme.info,
        StatusLevel::Warning => theme.warning,
        StatusLevel::Error => theme.error,
    };
    frame.render_widget(
        Paragraph::new(Span::styled(status.text.clone(), Style::default().fg(color))),
        area,
    );
}

fn help_text(mode: &Mode) -> &'static str {
    match mode {
        Mode::Browsing => "↑/↓ move  Enter edit/toggle  Ctrl+S save  Ctrl+R reload  Esc quit",
        Mode::EditingScalar(_) => "Enter commit  Esc cancel  Ctrl+U clear",
        Mode::ViewingMultiline(_) => "e edit  ↑/↓ scroll  PgUp/PgDn page  Esc close",
        Mode::EditingMultiline(_) => "Ctrl+S save  Esc discard  Tab indent  PgUp/PgDn page",
    }
}

fn render_help(frame: &mut Frame, area: Rect, panel: &SettingsPanel, theme: &PanelTheme) {
    frame.render_widget(
        Paragraph::new(Span::styled(
            help_text(panel.mode()),
            Style::default().fg(theme.dim),
        )),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::config_io::MemoryStore;
    use crate::input::handler::InputContext;
    use crate::services::providers::{OptionSource, RemoteOption};
    use crate::view::settings::{PanelCommand, PanelOptions};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn panel(settings: Settings) -> SettingsPanel {
        SettingsPanel::new(
            Box::new(MemoryStore::with_settings(settings)),
            PanelOptions::default(),
            tracing::Span::none(),
        )
    }

    fn draw(panel: &SettingsPanel, width: u16, height: u16) -> (Vec<String>, Option<(u16, u16)>) {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut cursor = None;
        terminal
            .draw(|frame| {
                cursor = render_panel(frame, frame.area(), panel);
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        let rows = (0..height)
            .map(|y| (0..width).map(|x| buffer[(x, y)].symbol().to_string()).collect())
            .collect();
        (rows, cursor)
    }

    #[test]
    fn test_value_summary() {
        assert_eq!(value_summary(FieldKind::Bool, &FieldValue::Bool(true)), "[x]");
        assert_eq!(
            value_summary(FieldKind::Text, &FieldValue::Text(String::new())),
            "(unset)"
        );
        assert_eq!(
            value_summary(FieldKind::Multiline, &FieldValue::Text("a\nb".into())),
            "a ... (2 lines)"
        );
    }

    #[test]
    fn test_renders_every_field() {
        let panel = panel(Settings::default());
        let (rows, cursor) = draw(&panel, 80, 30);
        assert!(rows[0].starts_with("Settings"));
        for (i, field) in FIELDS.iter().enumerate() {
            assert!(rows[1 + i].contains(field.label), "row {i}: {}", rows[1 + i]);
        }
        assert!(rows[1].starts_with("> "));
        assert!(rows[1].contains("http://localhost:11434"));
        assert!(cursor.is_none());
    }

    #[test]
    fn test_scalar_edit_shows_cursor_and_options() {
        let mut panel = panel(Settings::default());
        panel.apply_options(
            OptionSource::Models,
            Ok(vec![RemoteOption::named("llama3"), RemoteOption::named("qwen")]),
        );
        let mut ctx = InputContext::new();
        panel.apply(PanelCommand::Down, &mut ctx);
        panel.apply(PanelCommand::Open, &mut ctx);
        panel.apply(PanelCommand::Insert('q'), &mut ctx);

        let (rows, cursor) = draw(&panel, 80, 30);
        assert_eq!(cursor.map(|(_, y)| y), Some(2));
        let detail: String = rows[15..].join("\n");
        assert!(detail.contains("qwen"));
        assert!(!detail.contains("llama3"));
    }

    #[test]
    fn test_multiline_editor_drawn_in_detail_pane() {
        let mut panel = panel(Settings {
            system_prompt: "first line\nsecond line".into(),
            ..Settings::default()
        });
        panel.resize(80, 30);
        let mut ctx = InputContext::new();
        panel.apply(PanelCommand::End, &mut ctx);
        panel.apply(PanelCommand::Open, &mut ctx);
        panel.apply(PanelCommand::EnableEdit, &mut ctx);

        let (rows, cursor) = draw(&panel, 80, 30);
        let detail_top = 1 + FIELDS.len() + 1;
        assert!(rows[detail_top].contains("System prompt (edit)"));
        assert!(rows[detail_top + 1].contains("first line"));
        assert!(rows[detail_top + 2].contains("second line"));
        assert_eq!(cursor, Some((1, detail_top as u16 + 1)));
        // Bottom border of the detail pane, above status and help
        assert!(rows[rows.len() - 3].contains("Ln 1/2, Col 1"));
    }
}
