use crate::history::EntryChange;
use crate::{CategoryStore, EntryError, EntryKey, statics};
use std::fmt;

/// Which part of an entry an edit changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Text,
    Key,
}

impl fmt::Display for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EditField::Text => statics::EN_FIELD_TEXT,
            EditField::Key => statics::EN_FIELD_KEY,
        })
    }
}

/// An inline edit in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenEdit<K> {
    pub target: K,
    pub field: EditField,
    pub original: String,
    pub pending: String,
}

impl<K> OpenEdit<K> {
    pub fn is_dirty(&self) -> bool {
        self.pending != self.original
    }
}

/// The single inline edit an editor may have open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditSession<K> {
    Closed,
    Editing(OpenEdit<K>),
}

impl<K> Default for EditSession<K> {
    fn default() -> Self {
        EditSession::Closed
    }
}

impl<K: EntryKey> EditSession<K> {
    pub fn is_open(&self) -> bool {
        matches!(self, EditSession::Editing(_))
    }

    pub fn is_dirty(&self) -> bool {
        self.current().is_some_and(OpenEdit::is_dirty)
    }

    pub fn current(&self) -> Option<&OpenEdit<K>> {
        match self {
            EditSession::Closed => None,
            EditSession::Editing(edit) => Some(edit),
        }
    }

    pub fn begin_edit(
        &mut self,
        target: K,
        field: EditField,
        original: impl Into<String>,
    ) -> Result<(), EntryError> {
        if let EditSession::Editing(open) = self {
            return Err(EntryError::Conflict {
                target: open.target.to_string(),
            });
        }
        let original = original.into();
        *self = EditSession::Editing(OpenEdit {
            target,
            field,
            pending: original.clone(),
            original,
        });
        Ok(())
    }

    pub fn update_pending(&mut self, value: impl Into<String>) -> Result<(), EntryError> {
        match self {
            EditSession::Closed => Err(EntryError::NotEditing),
            EditSession::Editing(open) => {
                open.pending = value.into();
                Ok(())
            }
        }
    }

    /// Validate the pending value and write it to `store`.
    ///
    /// On success the session closes and the applied change is returned (`None`
    /// when the value did not actually change). On failure the session stays
    /// open and `store` is untouched.
    pub fn commit(
        &mut self,
        store: &mut CategoryStore<K>,
    ) -> Result<Option<EntryChange<K>>, EntryError> {
        let EditSession::Editing(open) = &*self else {
            return Err(EntryError::NotEditing);
        };
        let Some(record) = store.get(&open.target) else {
            return Err(EntryError::entry_not_found(&open.target));
        };

        let change = match open.field {
            EditField::Text => {
                if open.pending.trim().is_empty() {
                    return Err(EntryError::validation(
                        EditField::Text,
                        statics::EN_ERR_EMPTY_TEXT,
                    ));
                }
                if open.pending == record.text {
                    None
                } else {
                    let before = store.set_text(&open.target, open.pending.clone())?;
                    Some(EntryChange::Text {
                        key: open.target.clone(),
                        before,
                        after: open.pending.clone(),
                    })
                }
            }
            EditField::Key => {
                let new_key = open
                    .target
                    .parse_edit(&open.pending)
                    .map_err(|reason| EntryError::validation(EditField::Key, reason))?;
                if new_key == open.target {
                    None
                } else {
                    if store.contains(&new_key) {
                        return Err(EntryError::validation(
                            EditField::Key,
                            format!(
                                "{new_key} already exists in {}; change or delete it first",
                                store.category_id()
                            ),
                        ));
                    }
                    store.rename_key(&open.target, new_key.clone())?;
                    Some(EntryChange::Key {
                        before: open.target.clone(),
                        after: new_key,
                    })
                }
            }
        };

        *self = EditSession::Closed;
        Ok(change)
    }

    /// Discard the edit. Never fails; returns what was discarded.
    pub fn cancel(&mut self) -> Option<OpenEdit<K>> {
        match std::mem::take(self) {
            EditSession::Closed => None,
            EditSession::Editing(open) => Some(open),
        }
    }
}
