//! Terminal settings panel
//!
//! Browse and edit the fields of a settings document, edit long text in a
//! soft-wrapping multi-line editor, and merge changes that other components
//! save to the same document while the panel is open.

pub mod app;
pub mod config;
pub mod config_io;
pub mod input;
pub mod model;
pub mod primitives;
pub mod services;
pub mod view;
