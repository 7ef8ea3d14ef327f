//! View and UI layer
//!
//! This module contains the settings panel and the controls it is built from.

pub mod controls;
pub mod settings;
pub mod viewport;
