//! Low-level text primitives
//!
//! Pure functions shared by the multi-line editor: soft wrapping and the
//! mapping between logical and display offsets.

pub mod display_map;
pub mod line_wrapping;
