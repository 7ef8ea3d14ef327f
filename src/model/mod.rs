//! Core data model

pub mod text_buffer;
