//! Working copy of the settings document
//!
//! The [`Draft`] is what the panel edits. It remembers which fields the user
//! changed since the last successful save so that snapshots pushed by other
//! components can be merged in without losing local work.

use std::collections::BTreeSet;

use super::schema::FIELDS;
use crate::config::{FieldValue, Settings};

#[derive(Debug, Clone)]
pub struct Draft {
    settings: Settings,
    dirty: BTreeSet<&'static str>,
}

impl Draft {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            dirty: BTreeSet::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get(&self, key: &str) -> Option<FieldValue> {
        self.settings.field(key)
    }

    /// Write a field and mark it dirty.
    ///
    /// Returns false when the key is unknown or the value has the wrong
    /// type; the draft is untouched in that case.
    pub fn set(&mut self, key: &'static str, value: FieldValue) -> bool {
        if !self.settings.set_field(key, value) {
            return false;
        }
        self.dirty.insert(key);
        true
    }

    /// Take an external value for one field without marking it dirty.
    ///
    /// A dirty field keeps its local value. Returns whether the draft changed.
    pub fn accept_external(&mut self, key: &'static str, value: FieldValue) -> bool {
        if self.dirty.contains(key) || self.settings.field(key).as_ref() == Some(&value) {
            return false;
        }
        self.settings.set_field(key, value)
    }

    pub fn is_dirty(&self, key: &str) -> bool {
        self.dirty.contains(key)
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Forget all dirty marks after a successful save
    pub fn mark_clean(&mut self) {
        self.dirty.clear();
    }

    /// Replace the whole document and forget all dirty marks
    pub fn reset(&mut self, settings: Settings) {
        self.settings = settings;
        self.dirty.clear();
    }

    /// Merge a snapshot pushed by another component.
    ///
    /// Fields that are dirty, or named by `active`, keep their draft value.
    /// Every other field takes the snapshot's value, and `tool_servers` is
    /// always replaced. Returns the keys whose draft value changed.
    pub fn merge_external(
        &mut self,
        snapshot: &Settings,
        active: Option<&str>,
    ) -> Vec<&'static str> {
        let mut changed = Vec::new();

        for field in FIELDS {
            if self.dirty.contains(field.key) || active == Some(field.key) {
                continue;
            }
            let Some(incoming) = snapshot.field(field.key) else {
                continue;
            };
            if self.settings.field(field.key).as_ref() != Some(&incoming) {
                self.settings.set_field(field.key, incoming);
                changed.push(field.key);
            }
        }

        self.settings.tool_servers = snapshot.tool_servers.clone();
        changed
    }
}
