use crate::session::EditField;

/// Errors reported by the editing core.
///
/// Every failing operation leaves the store, window and session exactly as they
/// were, so the presentation layer can decide how to surface the error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    #[error("{what} {key} not found")]
    NotFound { what: &'static str, key: String },

    #[error("key {key} already exists in {category}")]
    DuplicateKey { key: String, category: String },

    #[error("an edit of {target} is already open")]
    Conflict { target: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: EditField, reason: String },

    #[error("no edit is open")]
    NotEditing,
}

impl EntryError {
    pub(crate) fn entry_not_found(key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            what: "entry",
            key: key.to_string(),
        }
    }

    pub(crate) fn validation(field: EditField, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
