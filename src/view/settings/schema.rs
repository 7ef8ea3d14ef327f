//! Field descriptor table for the settings panel
//!
//! Every editable field is described once here: its key in the settings
//! document, label, kind and the companion fields it depends on. The state
//! machine in `state.rs` is driven entirely by this table, so adding a field
//! means adding a row and a match arm in `Settings::field`/`set_field`.

use crate::config::{FieldValue, LOG_LEVELS, TEMPERATURE_RANGE, THEMES};
use crate::services::providers::{OptionSource, RemoteOption};

/// How a field is edited and validated
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Non-empty string, edited inline
    Text,
    /// Non-empty string that must name one of the remote options
    Choice(OptionSource),
    /// Float within `[min, max]`, edited inline
    Float { min: f64, max: f64 },
    /// Non-negative integer, edited inline
    Integer,
    /// Toggled in place
    Bool,
    /// Cycled in place through a fixed list
    Cycle(&'static [&'static str]),
    /// Long text, edited in the multi-line panel
    Multiline,
}

/// One row of the field table
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Fields that must be set before a change to this one is announced
    pub requires: &'static [&'static str],
}

/// The panel's fields, in display order
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "server_url",
        label: "Server URL",
        kind: FieldKind::Text,
        requires: &[],
    },
    FieldSpec {
        key: "model",
        label: "Model",
        kind: FieldKind::Choice(OptionSource::Models),
        requires: &[],
    },
    FieldSpec {
        key: "embedding_model",
        label: "Embedding model",
        kind: FieldKind::Choice(OptionSource::Models),
        requires: &[],
    },
    FieldSpec {
        key: "collection",
        label: "Collection",
        kind: FieldKind::Choice(OptionSource::Collections),
        requires: &["embedding_model"],
    },
    FieldSpec {
        key: "temperature",
        label: "Temperature",
        kind: FieldKind::Float {
            min: TEMPERATURE_RANGE.0,
            max: TEMPERATURE_RANGE.1,
        },
        requires: &[],
    },
    FieldSpec {
        key: "max_tokens",
        label: "Max tokens",
        kind: FieldKind::Integer,
        requires: &[],
    },
    FieldSpec {
        key: "top_k",
        label: "Top K",
        kind: FieldKind::Integer,
        requires: &[],
    },
    FieldSpec {
        key: "theme",
        label: "Theme",
        kind: FieldKind::Cycle(THEMES),
        requires: &[],
    },
    FieldSpec {
        key: "log_level",
        label: "Log level",
        kind: FieldKind::Cycle(LOG_LEVELS),
        requires: &[],
    },
    FieldSpec {
        key: "stream",
        label: "Stream responses",
        kind: FieldKind::Bool,
        requires: &[],
    },
    FieldSpec {
        key: "rag_enabled",
        label: "Retrieval",
        kind: FieldKind::Bool,
        requires: &["collection"],
    },
    FieldSpec {
        key: "system_prompt",
        label: "System prompt",
        kind: FieldKind::Multiline,
        requires: &[],
    },
];

/// Look up a field by key
pub fn field_spec(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.key == key)
}

/// Field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Next value in a cycle, wrapping from the last back to the first.
/// A value not in the list restarts the cycle.
pub fn cycle_next<'a>(choices: &[&'a str], current: &str) -> Option<&'a str> {
    let next = match choices.iter().position(|c| *c == current) {
        Some(i) => (i + 1) % choices.len(),
        None => 0,
    };
    choices.get(next).copied()
}

impl FieldSpec {
    fn invalid(&self, message: impl Into<String>) -> ValidationError {
        ValidationError {
            field: self.key,
            message: message.into(),
        }
    }

    /// Parse typed text for a scalar field.
    ///
    /// `options` is the loaded option list for `Choice` fields; when it is
    /// missing or empty only non-emptiness is checked. In-place and
    /// multi-line kinds have no text form and are rejected.
    pub fn parse(
        &self,
        input: &str,
        options: Option<&[RemoteOption]>,
    ) -> Result<FieldValue, ValidationError> {
        let input = input.trim();
        match self.kind {
            FieldKind::Text => {
                if input.is_empty() {
                    return Err(self.invalid("value cannot be empty"));
                }
                Ok(FieldValue::Text(input.to_string()))
            }
            FieldKind::Choice(_) => {
                if input.is_empty() {
                    return Err(self.invalid("value cannot be empty"));
                }
                match options {
                    Some(options)
                        if !options.is_empty() && !options.iter().any(|o| o.name == input) =>
                    {
                        Err(self.invalid(format!("'{input}' is not an available option")))
                    }
                    _ => Ok(FieldValue::Text(input.to_string())),
                }
            }
            FieldKind::Float { min, max } => {
                let value: f64 = input
                    .parse()
                    .map_err(|_| self.invalid(format!("'{input}' is not a number")))?;
                if !value.is_finite() || value < min || value > max {
                    return Err(self.invalid(format!("must be between {min} and {max}")));
                }
                Ok(FieldValue::Float(value))
            }
            FieldKind::Integer => input
                .parse::<u64>()
                .map(FieldValue::Integer)
                .map_err(|_| self.invalid("must be a non-negative integer")),
            FieldKind::Bool | FieldKind::Cycle(_) | FieldKind::Multiline => {
                Err(self.invalid("not edited as text"))
            }
        }
    }

    /// The value a single "open" produces for in-place fields.
    ///
    /// Total for `Bool` and `Cycle`; `None` for every other kind.
    pub fn next_in_place(&self, current: &FieldValue) -> Option<FieldValue> {
        match (self.kind, current) {
            (FieldKind::Bool, FieldValue::Bool(b)) => Some(FieldValue::Bool(!b)),
            (FieldKind::Bool, _) => Some(FieldValue::Bool(true)),
            (FieldKind::Cycle(choices), FieldValue::Text(s)) => {
                cycle_next(choices, s).map(|next| FieldValue::Text(next.to_string()))
            }
            (FieldKind::Cycle(choices), _) => {
                choices.first().map(|first| FieldValue::Text(first.to_string()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(key: &str) -> &'static FieldSpec {
        field_spec(key).unwrap()
    }

    #[test]
    fn test_every_field_is_addressable() {
        let settings = crate::config::Settings::default();
        for field in FIELDS {
            assert!(settings.field(field.key).is_some(), "{}", field.key);
        }
    }

    #[test]
    fn test_float_range_check() {
        let temp = spec("temperature");
        assert_eq!(temp.parse("1.5", None), Ok(FieldValue::Float(1.5)));
        assert_eq!(temp.parse(" 2 ", None), Ok(FieldValue::Float(2.0)));
        let err = temp.parse("3.5", None).unwrap_err();
        assert_eq!(err.field, "temperature");
        assert!(temp.parse("warm", None).is_err());
        assert!(temp.parse("NaN", None).is_err());
    }

    #[test]
    fn test_integer_must_be_non_negative() {
        let max_tokens = spec("max_tokens");
        assert_eq!(max_tokens.parse("512", None), Ok(FieldValue::Integer(512)));
        assert!(max_tokens.parse("-1", None).is_err());
        assert!(max_tokens.parse("1.5", None).is_err());
    }

    #[test]
    fn test_text_must_not_be_empty() {
        assert!(spec("server_url").parse("   ", None).is_err());
        assert_eq!(
            spec("server_url").parse(" http://x ", None),
            Ok(FieldValue::Text("http://x".into()))
        );
    }

    #[test]
    fn test_choice_membership() {
        let options = vec![RemoteOption::named("llama3"), RemoteOption::named("qwen")];
        let model = spec("model");
        assert!(model.parse("llama3", Some(&options)).is_ok());
        assert!(model.parse("gpt", Some(&options)).is_err());
        // Nothing loaded yet: any non-empty name is accepted
        assert!(model.parse("gpt", None).is_ok());
        assert!(model.parse("gpt", Some(&[])).is_ok());
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(cycle_next(THEMES, "dark"), Some("light"));
        assert_eq!(cycle_next(THEMES, "high-contrast"), Some("dark"));
        assert_eq!(cycle_next(THEMES, "unknown"), Some("dark"));
        assert_eq!(cycle_next(&[], "x"), None);
    }

    #[test]
    fn test_next_in_place() {
        let stream = spec("stream");
        assert_eq!(
            stream.next_in_place(&FieldValue::Bool(false)),
            Some(FieldValue::Bool(true))
        );
        let level = spec("log_level");
        assert_eq!(
            level.next_in_place(&FieldValue::Text("trace".into())),
            Some(FieldValue::Text("error".into()))
        );
        assert_eq!(spec("top_k").next_in_place(&FieldValue::Integer(1)), None);
    }

    #[test]
    fn test_parse_rejects_fields_without_text_entry() {
        for key in ["stream", "theme", "system_prompt"] {
            assert!(spec(key).parse("true", None).is_err(), "{key}");
        }
    }
}
