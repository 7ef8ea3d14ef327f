//! Settings panel
//!
//! A single generic state machine driven by the field table in [`schema`]:
//! - [`state`]: navigation and editing modes, commit/persist/notify
//! - [`draft`]: the working copy and merging of external updates
//! - [`input`]: key translation per mode
//! - [`layout`], [`render`]: drawing with ratatui

pub mod draft;
pub mod input;
pub mod layout;
pub mod render;
pub mod schema;
pub mod state;

pub use draft::Draft;
pub use render::{render_panel, PanelTheme};
pub use schema::{FieldKind, FieldSpec, ValidationError, FIELDS};
pub use state::{
    Mode, OptionState, PanelCommand, PanelOptions, SettingsChanged, SettingsPanel, StatusLevel,
    StatusMessage,
};
