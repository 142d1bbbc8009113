//! Domain validation errors.
//!
//! These errors describe input that is malformed or breaks a domain rule.
//! They carry an optional field path (e.g. `tickets[1].seat`) so the web
//! layer can point the client at the offending value.

/// A rejected input value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}{message}", .field.as_ref().map(|f| format!("{f}: ")).unwrap_or_default())]
pub struct ValidationError {
    /// Path of the offending field, if the error is tied to one.
    pub field: Option<String>,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    /// An error about the input as a whole.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    /// An error about a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Prefix the field path, e.g. `seat` becomes `tickets[2].seat`.
    pub fn within(mut self, prefix: &str) -> Self {
        self.field = Some(match self.field.take() {
            Some(field) => format!("{prefix}.{field}"),
            None => prefix.to_string(),
        });
        self
    }
}

/// Reject empty or over-long names.
pub(crate) fn check_name(field: &str, value: &str, max_len: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::field(field, "must not be blank"));
    }
    if value.chars().count() > max_len {
        return Err(ValidationError::field(
            field,
            format!("must be at most {max_len} characters"),
        ));
    }
    Ok(())
}
