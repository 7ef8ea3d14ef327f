//! Input dispatch

pub mod handler;
