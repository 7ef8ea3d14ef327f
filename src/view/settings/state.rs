//! Field navigation state machine
//!
//! [`SettingsPanel`] owns the draft, the persistence gateway and whichever
//! editor is open. It is driven one [`PanelCommand`] at a time by the update
//! loop; anything that needs the application (notifying listeners, starting
//! network requests, quitting) is handed back as a
//! [`DeferredAction`](crate::input::handler::DeferredAction).
//!
//! ```text
//!   Browsing ──open scalar──▶ EditingScalar ──commit/cancel──▶ Browsing
//!      │  ▲
//!      │  └─ open bool/cycle: toggle, persist and notify in place
//!      │
//!      └──open multiline──▶ ViewingMultiline ──enable edit──▶ EditingMultiline
//!                                 │                              │
//!                                 └────────close────▶ Browsing ◀─┴─save/discard
//! ```

use std::collections::BTreeMap;

use ratatui::layout::Rect;
use tracing::Span;

use super::draft::Draft;
use super::layout::PanelLayout;
use super::schema::{field_spec, FieldKind, FieldSpec, FIELDS};
use crate::config::{FieldValue, Settings};
use crate::config_io::SettingsStore;
use crate::input::handler::{DeferredAction, InputContext};
use crate::services::providers::{OptionSource, ProviderError, RemoteOption};
use crate::view::controls::{FocusState, MultilineEditor, TextInputState};
use crate::view::viewport::PAGE_STEP;

/// Editor area used until the first resize
const DEFAULT_EDITOR_SIZE: (usize, usize) = (60, 8);

/// Notification sent to collaborators after a successful save
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsChanged {
    pub settings: Settings,
    /// Field that triggered the save; `None` for a save-all
    pub key: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// One-line message shown under the field list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }
}

/// Behaviour switches for the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelOptions {
    /// Persist after every successful field commit
    pub auto_save: bool,
    /// Lines moved by page-up / page-down in the multi-line editor
    pub page_step: usize,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            auto_save: true,
            page_step: PAGE_STEP,
        }
    }
}

/// Load state of a remote option list
#[derive(Debug, Clone, PartialEq)]
pub enum OptionState {
    Loading,
    Loaded(Vec<RemoteOption>),
    Failed(String),
}

impl OptionState {
    /// The options to offer; empty unless loaded
    pub fn options(&self) -> &[RemoteOption] {
        match self {
            OptionState::Loaded(options) => options,
            OptionState::Loading | OptionState::Failed(_) => &[],
        }
    }
}

/// What the panel is doing with the selected field
#[derive(Debug, Clone)]
pub enum Mode {
    Browsing,
    EditingScalar(TextInputState),
    ViewingMultiline(MultilineEditor),
    EditingMultiline(MultilineEditor),
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Browsing => "browse",
            Mode::EditingScalar(_) => "edit",
            Mode::ViewingMultiline(_) => "view",
            Mode::EditingMultiline(_) => "edit text",
        }
    }
}

/// Mode-independent panel commands; each mode ignores those it has no use for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCommand {
    Up,
    Down,
    Home,
    End,
    Open,
    Commit,
    Cancel,
    EnableEdit,
    SaveEdit,
    Insert(char),
    Newline,
    Tab,
    Backspace,
    Delete,
    /// Empty the scalar input
    ClearInput,
    Left,
    Right,
    LineStart,
    LineEnd,
    BufferStart,
    BufferEnd,
    PageUp,
    PageDown,
    SaveAll,
    Reset,
    Quit,
}

pub struct SettingsPanel {
    draft: Draft,
    store: Box<dyn SettingsStore>,
    selected: usize,
    mode: Mode,
    options: BTreeMap<OptionSource, OptionState>,
    /// Last connectivity check result: server version or error text
    connectivity: Option<Result<String, String>>,
    status: Option<StatusMessage>,
    panel_options: PanelOptions,
    editor_size: (usize, usize),
    quit_armed: bool,
    /// External value for the field under edit, applied if the edit ends
    /// without a commit
    held_external: Option<(&'static str, FieldValue)>,
    span: Span,
}

impl SettingsPanel {
    /// Create the panel, loading the draft from `store`.
    ///
    /// A load failure is not fatal: the panel starts from defaults and shows
    /// the error.
    pub fn new(store: Box<dyn SettingsStore>, panel_options: PanelOptions, span: Span) -> Self {
        let (settings, status) = {
            let _guard = span.enter();
            match store.load() {
                Ok(settings) => {
                    tracing::info!("Settings panel opened");
                    (settings, None)
                }
                Err(e) => {
                    tracing::warn!("Failed to load settings, using defaults: {}", e);
                    (
                        Settings::default(),
                        Some(StatusMessage::error(format!("Failed to load settings: {e}"))),
                    )
                }
            }
        };

        Self {
            draft: Draft::new(settings),
            store,
            selected: 0,
            mode: Mode::Browsing,
            options: BTreeMap::new(),
            connectivity: None,
            status,
            panel_options,
            editor_size: DEFAULT_EDITOR_SIZE,
            quit_armed: false,
            held_external: None,
            span,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.draft.settings()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_field(&self) -> &'static FieldSpec {
        &FIELDS[self.selected]
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn option_state(&self, source: OptionSource) -> Option<&OptionState> {
        self.options.get(&source)
    }

    pub fn connectivity(&self) -> Option<&Result<String, String>> {
        self.connectivity.as_ref()
    }

    pub fn editor_size(&self) -> (usize, usize) {
        self.editor_size
    }

    pub fn panel_options(&self) -> &PanelOptions {
        &self.panel_options
    }

    pub fn is_quit_armed(&self) -> bool {
        self.quit_armed
    }

    /// Field that external updates must not touch: the one being edited
    pub fn active_key(&self) -> Option<&'static str> {
        match self.mode {
            Mode::EditingScalar(_) | Mode::EditingMultiline(_) => Some(self.selected_field().key),
            Mode::Browsing | Mode::ViewingMultiline(_) => None,
        }
    }

    /// Handle one command to completion
    pub fn apply(&mut self, cmd: PanelCommand, ctx: &mut InputContext) {
        let span = self.span.clone();
        let _guard = span.enter();
        tracing::trace!(mode = self.mode.name(), ?cmd, "Panel command");

        if cmd != PanelCommand::Quit {
            self.quit_armed = false;
        }

        match self.mode {
            Mode::Browsing => self.browse(cmd, ctx),
            Mode::EditingScalar(_) => self.edit_scalar(cmd, ctx),
            Mode::ViewingMultiline(_) => self.view_multiline(cmd),
            Mode::EditingMultiline(_) => self.edit_multiline(cmd, ctx),
        }
    }

    fn browse(&mut self, cmd: PanelCommand, ctx: &mut InputContext) {
        let last = FIELDS.len() - 1;
        match cmd {
            PanelCommand::Up => self.selected = self.selected.saturating_sub(1),
            PanelCommand::Down => self.selected = (self.selected + 1).min(last),
            PanelCommand::Home => self.selected = 0,
            PanelCommand::End => self.selected = last,
            PanelCommand::Open => self.open(ctx),
            PanelCommand::SaveAll => self.persist(None, ctx),
            PanelCommand::Reset => self.reset(ctx),
            PanelCommand::Quit => self.request_quit(ctx),
            _ => {}
        }
    }

    fn open(&mut self, ctx: &mut InputContext) {
        let field = self.selected_field();
        let Some(current) = self.draft.get(field.key) else {
            return;
        };

        match field.kind {
            FieldKind::Bool | FieldKind::Cycle(_) => {
                if let Some(next) = field.next_in_place(&current) {
                    let persist = self.panel_options.auto_save;
                    self.commit_value(field, next, persist, ctx);
                }
            }
            FieldKind::Multiline => {
                let (width, height) = self.editor_size;
                let editor = MultilineEditor::new(&current.display(), width, height)
                    .with_page_step(self.panel_options.page_step);
                self.mode = Mode::ViewingMultiline(editor);
            }
            FieldKind::Choice(source) => {
                self.request_options(source, ctx);
                self.start_scalar_edit(field, &current);
            }
            FieldKind::Text | FieldKind::Float { .. } | FieldKind::Integer => {
                self.start_scalar_edit(field, &current);
            }
        }
    }

    fn start_scalar_edit(&mut self, field: &'static FieldSpec, current: &FieldValue) {
        let placeholder = match field.kind {
            FieldKind::Choice(_) => "type to filter options",
            _ => "",
        };
        let input = TextInputState::new(field.label)
            .with_value(current.display())
            .with_placeholder(placeholder)
            .with_focus(FocusState::Focused);
        self.mode = Mode::EditingScalar(input);
    }

    fn request_options(&mut self, source: OptionSource, ctx: &mut InputContext) {
        if matches!(
            self.options.get(&source),
            Some(OptionState::Loading | OptionState::Loaded(_))
        ) {
            return;
        }
        tracing::debug!("Requesting {}", source.label());
        self.options.insert(source, OptionState::Loading);
        ctx.defer(DeferredAction::FetchOptions(source));
    }

    fn edit_scalar(&mut self, cmd: PanelCommand, ctx: &mut InputContext) {
        let Mode::EditingScalar(input) = &mut self.mode else {
            return;
        };
        match cmd {
            PanelCommand::Insert(c) => input.insert(c),
            PanelCommand::Backspace => input.backspace(),
            PanelCommand::Delete => input.delete(),
            PanelCommand::ClearInput => input.clear(),
            PanelCommand::Left => input.move_left(),
            PanelCommand::Right => input.move_right(),
            PanelCommand::Home | PanelCommand::LineStart => input.move_home(),
            PanelCommand::End | PanelCommand::LineEnd => input.move_end(),
            PanelCommand::Commit => {
                let text = std::mem::take(&mut input.value);
                self.mode = Mode::Browsing;
                self.commit_text(&text, ctx);
            }
            PanelCommand::Cancel => {
                self.mode = Mode::Browsing;
                self.status = None;
                self.release_held_external(ctx);
            }
            _ => {}
        }
    }

    fn commit_text(&mut self, text: &str, ctx: &mut InputContext) {
        let field = self.selected_field();
        let options = match field.kind {
            FieldKind::Choice(source) => match self.options.get(&source) {
                Some(OptionState::Loaded(list)) => Some(list.as_slice()),
                _ => None,
            },
            _ => None,
        };

        match field.parse(text, options) {
            Ok(value) => {
                let persist = self.panel_options.auto_save;
                self.commit_value(field, value, persist, ctx);
            }
            Err(e) => {
                tracing::debug!(field = field.key, "Rejected value: {}", e.message);
                self.status = Some(StatusMessage::error(e.to_string()));
                self.release_held_external(ctx);
            }
        }
    }

    /// Write a validated value into the draft, then persist or mark pending
    fn commit_value(
        &mut self,
        field: &'static FieldSpec,
        value: FieldValue,
        persist: bool,
        ctx: &mut InputContext,
    ) {
        if self.held_external.as_ref().is_some_and(|(key, _)| *key == field.key) {
            tracing::debug!(field = field.key, "Local commit overrides external value");
            self.held_external = None;
        }
        let server_changed =
            field.key == "server_url" && self.draft.get(field.key).as_ref() != Some(&value);
        if !self.draft.set(field.key, value) {
            return;
        }
        tracing::info!(field = field.key, "Field updated");

        if server_changed {
            self.server_changed(ctx);
        }

        if persist {
            self.persist(Some(field), ctx);
        } else {
            self.status = Some(StatusMessage::info(format!(
                "{} modified (Ctrl+S to save)",
                field.label
            )));
        }
    }

    /// Labels of the companion fields of `field` that are still unset
    fn missing_companions(&self, field: &FieldSpec) -> Vec<&'static str> {
        field
            .requires
            .iter()
            .filter(|key| !self.draft.get(key).is_some_and(|v| v.is_set()))
            .filter_map(|key| field_spec(key).map(|spec| spec.label))
            .collect()
    }

    /// Save the whole draft; `field` names the commit that triggered it
    fn persist(&mut self, field: Option<&'static FieldSpec>, ctx: &mut InputContext) {
        if let Err(e) = self.store.save(self.draft.settings()) {
            tracing::error!("Failed to save settings: {}", e);
            self.status = Some(StatusMessage::error(format!("Failed to save settings: {e}")));
            return;
        }
        self.draft.mark_clean();

        let missing = field
            .map(|f| self.missing_companions(f))
            .unwrap_or_default();
        if !missing.is_empty() {
            let label = field.map(|f| f.label).unwrap_or_default();
            tracing::info!("Saved {} without notifying, waiting for {:?}", label, missing);
            self.status = Some(StatusMessage::warning(format!(
                "Saved {label}; set {} to apply it",
                missing.join(", ")
            )));
            return;
        }

        ctx.defer(DeferredAction::Notify(SettingsChanged {
            settings: self.draft.settings().clone(),
            key: field.map(|f| f.key),
        }));
        self.status = Some(StatusMessage::info(match field {
            Some(f) => format!("Saved {}", f.label),
            None => "Settings saved".to_string(),
        }));
    }

    fn reset(&mut self, ctx: &mut InputContext) {
        match self.store.load() {
            Ok(settings) => {
                let server_changed = settings.server_url != self.draft.settings().server_url;
                self.draft.reset(settings);
                if server_changed {
                    self.server_changed(ctx);
                }
                tracing::info!("Draft reset from storage");
                self.status = Some(StatusMessage::info("Settings reloaded"));
            }
            Err(e) => {
                tracing::error!("Failed to reload settings: {}", e);
                self.status = Some(StatusMessage::error(format!("Failed to reload settings: {e}")));
            }
        }
    }

    fn request_quit(&mut self, ctx: &mut InputContext) {
        if self.draft.has_dirty() && !self.quit_armed {
            self.quit_armed = true;
            self.status = Some(StatusMessage::warning(
                "Unsaved changes: press Esc again to quit, Ctrl+S to save",
            ));
            return;
        }
        ctx.defer(DeferredAction::Quit);
    }

    /// Cached option lists belong to the old server
    fn server_changed(&mut self, ctx: &mut InputContext) {
        tracing::info!("Server changed to {}", self.draft.settings().server_url);
        self.options.clear();
        self.connectivity = None;
        ctx.defer(DeferredAction::CheckConnection);
    }

    fn view_multiline(&mut self, cmd: PanelCommand) {
        let Mode::ViewingMultiline(editor) = &mut self.mode else {
            return;
        };
        match cmd {
            PanelCommand::Up => editor.move_up(),
            PanelCommand::Down => editor.move_down(),
            PanelCommand::Left => editor.move_left(),
            PanelCommand::Right => editor.move_right(),
            PanelCommand::LineStart => editor.move_line_start(),
            PanelCommand::LineEnd => editor.move_line_end(),
            PanelCommand::BufferStart => editor.move_buffer_start(),
            PanelCommand::BufferEnd => editor.move_buffer_end(),
            PanelCommand::PageUp => editor.page_up(),
            PanelCommand::PageDown => editor.page_down(),
            PanelCommand::EnableEdit => {
                if let Mode::ViewingMultiline(mut editor) =
                    std::mem::replace(&mut self.mode, Mode::Browsing)
                {
                    editor.set_read_only(false);
                    self.mode = Mode::EditingMultiline(editor);
                }
            }
            PanelCommand::Cancel => self.mode = Mode::Browsing,
            _ => {}
        }
    }

    fn edit_multiline(&mut self, cmd: PanelCommand, ctx: &mut InputContext) {
        let Mode::EditingMultiline(editor) = &mut self.mode else {
            return;
        };
        match cmd {
            PanelCommand::Insert(c) => editor.insert_char(c),
            PanelCommand::Newline => editor.insert_newline(),
            PanelCommand::Tab => editor.insert_tab(),
            PanelCommand::Backspace => editor.backspace(),
            PanelCommand::Delete => editor.delete(),
            PanelCommand::Up => editor.move_up(),
            PanelCommand::Down => editor.move_down(),
            PanelCommand::Left => editor.move_left(),
            PanelCommand::Right => editor.move_right(),
            PanelCommand::LineStart => editor.move_line_start(),
            PanelCommand::LineEnd => editor.move_line_end(),
            PanelCommand::BufferStart => editor.move_buffer_start(),
            PanelCommand::BufferEnd => editor.move_buffer_end(),
            PanelCommand::PageUp => editor.page_up(),
            PanelCommand::PageDown => editor.page_down(),
            PanelCommand::SaveEdit => {
                let text = editor.text();
                self.mode = Mode::Browsing;
                let field = self.selected_field();
                self.commit_value(field, FieldValue::Text(text), true, ctx);
            }
            PanelCommand::Cancel => {
                self.mode = Mode::Browsing;
                self.status = Some(StatusMessage::info(format!(
                    "Discarded changes to {}",
                    self.selected_field().label
                )));
                self.release_held_external(ctx);
            }
            _ => {}
        }
    }

    /// Reconcile a snapshot saved by another component
    pub fn merge_external(&mut self, snapshot: &Settings, ctx: &mut InputContext) {
        let span = self.span.clone();
        let _guard = span.enter();

        let active = self.active_key();
        if let Some(key) = active.filter(|key| !self.draft.is_dirty(key)) {
            self.held_external = snapshot
                .field(key)
                .filter(|incoming| self.draft.get(key).as_ref() != Some(incoming))
                .map(|incoming| (key, incoming));
        }

        let changed = self.draft.merge_external(snapshot, active);
        if changed.is_empty() {
            return;
        }
        tracing::info!(fields = ?changed, "Merged external settings");

        if changed.contains(&"server_url") {
            self.server_changed(ctx);
        }

        let key = FIELDS[self.selected].key;
        if let Mode::ViewingMultiline(editor) = &mut self.mode {
            if changed.contains(&key) {
                if let Some(value) = self.draft.get(key) {
                    editor.replace_text(&value.display());
                }
            }
        }
    }

    /// The edit ended without a commit: take the external value it held back
    fn release_held_external(&mut self, ctx: &mut InputContext) {
        let Some((key, value)) = self.held_external.take() else {
            return;
        };
        if !self.draft.accept_external(key, value) {
            return;
        }
        tracing::info!(field = key, "Applied external value held during edit");
        if key == "server_url" {
            self.server_changed(ctx);
        }
    }

    /// Store a finished option fetch
    pub fn apply_options(
        &mut self,
        source: OptionSource,
        result: Result<Vec<RemoteOption>, ProviderError>,
    ) {
        let span = self.span.clone();
        let _guard = span.enter();

        match result {
            Ok(options) => {
                tracing::debug!("Loaded {} {}", options.len(), source.label());
                self.options.insert(source, OptionState::Loaded(options));
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", source.label(), e);
                self.status = Some(StatusMessage::error(format!(
                    "Could not load {}: {e}",
                    source.label()
                )));
                self.options.insert(source, OptionState::Failed(e.to_string()));
            }
        }
    }

    /// Store a finished connectivity check
    pub fn apply_connectivity(&mut self, result: Result<String, ProviderError>) {
        let span = self.span.clone();
        let _guard = span.enter();

        match result {
            Ok(version) => {
                tracing::info!("Server reachable, version {}", version);
                self.connectivity = Some(Ok(version));
            }
            Err(e) => {
                tracing::warn!("Server unreachable: {}", e);
                self.status = Some(StatusMessage::warning(format!("Server unreachable: {e}")));
                self.connectivity = Some(Err(e.to_string()));
            }
        }
    }

    /// Adapt to a new terminal size; the open editor rewraps
    pub fn resize(&mut self, width: u16, height: u16) {
        let layout = PanelLayout::compute(Rect::new(0, 0, width, height));
        self.editor_size = (
            layout.editor_inner.width as usize,
            layout.editor_inner.height as usize,
        );
        let (w, h) = self.editor_size;
        if let Mode::ViewingMultiline(editor) | Mode::EditingMultiline(editor) = &mut self.mode {
            editor.resize(w, h);
        }
    }
}
