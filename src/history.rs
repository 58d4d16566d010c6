use crate::{CategoryStore, EntryError, EntryKey, EntryRecord, statics};

/// One applied mutation of a category, with enough data to reverse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryChange<K> {
    Text { key: K, before: String, after: String },
    Key { before: K, after: K },
    Inserted { record: EntryRecord<K>, position: usize },
    Removed { record: EntryRecord<K>, position: usize },
}

impl<K: EntryKey> EntryChange<K> {
    pub fn describe(&self) -> String {
        match self {
            EntryChange::Text { key, before, after } => format!(
                "Changed text of {key}: {} -> {}",
                quoted_or_empty(before),
                quoted_or_empty(after)
            ),
            EntryChange::Key { before, after } => format!("Changed ID {before} -> {after}"),
            EntryChange::Inserted { record, .. } => format!("Added {}", record.key),
            EntryChange::Removed { record, .. } => format!("Deleted {}", record.key),
        }
    }

    /// The entry to show after the change was applied (`forward`) or reverted.
    pub fn focus_key(&self, forward: bool) -> Option<&K> {
        match self {
            EntryChange::Text { key, .. } => Some(key),
            EntryChange::Key { before, after } => Some(if forward { after } else { before }),
            EntryChange::Inserted { record, .. } => forward.then_some(&record.key),
            EntryChange::Removed { record, .. } => (!forward).then_some(&record.key),
        }
    }

    fn apply(&self, store: &mut CategoryStore<K>, forward: bool) -> Result<(), EntryError> {
        match (self, forward) {
            (EntryChange::Text { key, after, .. }, true) => {
                store.set_text(key, after.clone())?;
            }
            (EntryChange::Text { key, before, .. }, false) => {
                store.set_text(key, before.clone())?;
            }
            (EntryChange::Key { before, after }, true) => store.rename_key(before, after.clone())?,
            (EntryChange::Key { before, after }, false) => store.rename_key(after, before.clone())?,
            (EntryChange::Inserted { record, position }, true)
            | (EntryChange::Removed { record, position }, false) => {
                store.insert(record.clone(), Some(*position))?;
            }
            (EntryChange::Inserted { record, .. }, false)
            | (EntryChange::Removed { record, .. }, true) => {
                store.remove(&record.key)?;
            }
        }
        Ok(())
    }
}

fn quoted_or_empty(text: &str) -> String {
    if text.is_empty() {
        statics::EN_LITERAL_EMPTY.to_string()
    } else {
        format!("'{text}'")
    }
}

/// Undo/redo stacks for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditHistory<K> {
    undo_stack: Vec<EntryChange<K>>,
    redo_stack: Vec<EntryChange<K>>,
}

impl<K> Default for EditHistory<K> {
    fn default() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }
}

impl<K: EntryKey> EditHistory<K> {
    /// Record a change that was just applied. Clears anything redoable.
    pub fn record(&mut self, change: EntryChange<K>) {
        self.undo_stack.push(change);
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Applied changes, oldest first.
    pub fn changes(&self) -> &[EntryChange<K>] {
        &self.undo_stack
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Revert the latest change. `Ok(None)` when there is nothing to undo; a
    /// change that cannot be reverted stays on the undo stack.
    pub fn undo(
        &mut self,
        store: &mut CategoryStore<K>,
    ) -> Result<Option<&EntryChange<K>>, EntryError> {
        let Some(change) = self.undo_stack.pop() else {
            return Ok(None);
        };
        if let Err(e) = change.apply(store, false) {
            self.undo_stack.push(change);
            return Err(e);
        }
        tracing::debug!("{} {}", statics::EN_PREFIX_UNDO, change.describe());
        self.redo_stack.push(change);
        Ok(self.redo_stack.last())
    }

    /// Re-apply the latest undone change.
    pub fn redo(
        &mut self,
        store: &mut CategoryStore<K>,
    ) -> Result<Option<&EntryChange<K>>, EntryError> {
        let Some(change) = self.redo_stack.pop() else {
            return Ok(None);
        };
        if let Err(e) = change.apply(store, true) {
            self.redo_stack.push(change);
            return Err(e);
        }
        tracing::debug!("{} {}", statics::EN_PREFIX_REDO, change.describe());
        self.undo_stack.push(change);
        Ok(self.undo_stack.last())
    }
}
