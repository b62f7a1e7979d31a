use std::fmt;

use thiserror::Error;

/// Why a remote payload could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeKind {
    /// A required key is absent.
    KeyNotFound,
    /// A value has the wrong JSON type.
    TypeMismatch,
    /// A required value is `null`.
    ValueNotFound,
    /// The body is not well-formed JSON.
    Corrupted,
}

impl DecodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeKind::KeyNotFound => "key_not_found",
            DecodeKind::TypeMismatch => "type_mismatch",
            DecodeKind::ValueNotFound => "value_not_found",
            DecodeKind::Corrupted => "corrupted",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DecodeKind::KeyNotFound => "key not found",
            DecodeKind::TypeMismatch => "type mismatch",
            DecodeKind::ValueNotFound => "value not found",
            DecodeKind::Corrupted => "data corrupted",
        }
    }
}

impl fmt::Display for DecodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Error)]
#[error(
    "{kind}{}: {context}",
    .field.as_deref().map(|f| format!(" `{f}`")).unwrap_or_default()
)]
pub struct DecodeError {
    pub kind: DecodeKind,
    /// Offending key, when the decoder names one.
    pub field: Option<String>,
    pub context: String,
}
