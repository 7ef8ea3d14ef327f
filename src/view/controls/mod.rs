//! Form controls used by the settings panel
//!
//! ## Available Controls
//! - `TextInput` - Single-line text entry for scalar fields
//! - `Multiline` - Soft-wrapping multi-line editor for long text fields
//!
//! ## Pattern
//! Each control follows a consistent pattern:
//! - a state struct containing the control's data
//! - a `*Colors` struct for theming
//! - a `render_*` function that renders to a frame

pub mod multiline;
pub mod text_input;

pub use multiline::{render_multiline, MultilineColors, MultilineEditor};
pub use text_input::{render_text_input, TextInputColors, TextInputLayout, TextInputState};

/// Focus state for controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    Normal,
    Focused,
    Disabled,
}
