//! Screen layout of the settings panel
//!
//! Computed from the terminal area alone, so the state machine can size the
//! multi-line editor exactly as the renderer will draw it.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::Block;

use super::schema::FIELDS;

/// Areas of the panel, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelLayout {
    /// Title and connectivity line
    pub title: Rect,
    /// One row per field
    pub fields: Rect,
    /// Bordered detail pane (multi-line editor, option list)
    pub detail: Rect,
    /// Inside of the detail pane's border
    pub editor_inner: Rect,
    /// Status message line
    pub status: Rect,
    /// Key hints
    pub help: Rect,
}

impl PanelLayout {
    pub fn compute(area: Rect) -> Self {
        let [title, fields, detail, status, help] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(FIELDS.len() as u16 + 1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        Self {
            title,
            fields,
            detail,
            editor_inner: Block::bordered().inner(detail),
            status,
            help,
        }
    }

    /// Row of field `index`, if it fits
    pub fn field_row(&self, index: usize) -> Option<Rect> {
        let y = self.fields.y + index as u16;
        (index < FIELDS.len() && y < self.fields.bottom())
            .then(|| Rect::new(self.fields.x, y, self.fields.width, 1))
    }
}
