use crate::history::{EditHistory, EntryChange};
use crate::search::SearchState;
use crate::session::{EditField, EditSession, OpenEdit};
use crate::{Catalog, CategoryStore, EditorConfig, EntryError, EntryKey, EntryRecord, RangeWindow};

/// The editing state behind an entry-list screen: which category is shown,
/// which page of it, which row is active, and the one inline edit that may be
/// open. Presentation code forwards user actions here and renders
/// [`SelectionController::current_page`].
#[derive(Debug, Clone)]
pub struct SelectionController<K> {
    config: EditorConfig,
    catalog: Catalog<K>,
    active_category: Option<String>,
    active_key: Option<K>,
    window: RangeWindow,
    session: EditSession<K>,
    history: EditHistory<K>,
    search: SearchState<K>,
}

fn no_category() -> EntryError {
    EntryError::NotFound {
        what: "category",
        key: "<none selected>".to_string(),
    }
}

fn no_active_row() -> EntryError {
    EntryError::NotFound {
        what: "active row",
        key: "<none selected>".to_string(),
    }
}

fn active_store<'a, K: EntryKey>(
    catalog: &'a Catalog<K>,
    category: Option<&str>,
) -> Result<&'a CategoryStore<K>, EntryError> {
    category
        .and_then(|id| catalog.get(id))
        .ok_or_else(no_category)
}

fn active_store_mut<'a, K: EntryKey>(
    catalog: &'a mut Catalog<K>,
    category: Option<&str>,
) -> Result<&'a mut CategoryStore<K>, EntryError> {
    category
        .and_then(|id| catalog.get_mut(id))
        .ok_or_else(no_category)
}

impl<K: EntryKey> SelectionController<K> {
    pub fn new(config: EditorConfig, catalog: Catalog<K>) -> Self {
        Self {
            window: RangeWindow::new(config.page_size),
            config,
            catalog,
            active_category: None,
            active_key: None,
            session: EditSession::default(),
            history: EditHistory::default(),
            search: SearchState::default(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog<K> {
        &self.catalog
    }

    /// Direct access for saving. Mutating stores through this bypasses the
    /// window; call [`SelectionController::refresh`] afterwards.
    pub fn catalog_mut(&mut self) -> &mut Catalog<K> {
        &mut self.catalog
    }

    pub fn into_catalog(self) -> Catalog<K> {
        self.catalog
    }

    pub fn active_category(&self) -> Option<&str> {
        self.active_category.as_deref()
    }

    pub fn active_key(&self) -> Option<&K> {
        self.active_key.as_ref()
    }

    pub fn window(&self) -> &RangeWindow {
        &self.window
    }

    pub fn session(&self) -> &EditSession<K> {
        &self.session
    }

    pub fn history(&self) -> &EditHistory<K> {
        &self.history
    }

    pub fn search(&self) -> &SearchState<K> {
        &self.search
    }

    pub fn store(&self) -> Result<&CategoryStore<K>, EntryError> {
        active_store(&self.catalog, self.active_category.as_deref())
    }

    pub fn active_record(&self) -> Option<&EntryRecord<K>> {
        let key = self.active_key.as_ref()?;
        self.store().ok()?.get(key)
    }

    /// Row of the active entry within the current page, if it is visible.
    pub fn active_row_in_page(&self) -> Option<usize> {
        let key = self.active_key.as_ref()?;
        let position = self.store().ok()?.get_index_of(key).ok()?;
        self.window.position_in_page(position)
    }

    /// True when an open edit holds a value that differs from the entry.
    /// Presentation code checks this and asks the user before switching away.
    pub fn has_unsaved_changes(&self) -> bool {
        self.session.is_dirty()
    }

    /// Show another category from the first page.
    ///
    /// A dirty edit must be resolved first (commit it, or `cancel_edit` once the
    /// user agreed to discard it); otherwise this fails with `Conflict`.
    pub fn select_category(&mut self, category_id: &str) -> Result<(), EntryError> {
        let Some(store) = self.catalog.get(category_id) else {
            return Err(EntryError::NotFound {
                what: "category",
                key: category_id.to_string(),
            });
        };
        if let Some(open) = self.session.current().filter(|open| open.is_dirty()) {
            return Err(EntryError::Conflict {
                target: open.target.to_string(),
            });
        }

        let total = store.len();
        self.session.cancel();
        self.window.reset(total);
        self.active_category = Some(category_id.to_string());
        self.active_key = None;
        self.history.clear();
        self.search.clear();
        tracing::info!(category = category_id, entries = total, "selected category");
        Ok(())
    }

    /// Records on the current page, in canonical order.
    pub fn current_page(&self) -> Vec<&EntryRecord<K>> {
        match self.store() {
            Ok(store) => self.window.current_page(store),
            Err(_) => Vec::new(),
        }
    }

    pub fn can_go_next(&self) -> bool {
        self.window.can_go_next()
    }

    pub fn can_go_previous(&self) -> bool {
        self.window.can_go_previous()
    }

    #[must_use]
    pub fn next_page(&mut self) -> bool {
        self.window.go_next()
    }

    #[must_use]
    pub fn previous_page(&mut self) -> bool {
        self.window.go_previous()
    }

    /// Activate the entry shown at `row` of the current page. If resolving the
    /// previous row's edit moved the window, it moves back to show `row`'s entry.
    pub fn select_row(&mut self, row: usize) -> Result<K, EntryError> {
        let key = {
            let store = self.store()?;
            let page = self.window.current_page(store);
            page.get(row)
                .map(|record| record.key.clone())
                .ok_or_else(|| EntryError::NotFound {
                    what: "row",
                    key: row.to_string(),
                })?
        };
        self.activate(key.clone())?;

        let store = active_store(&self.catalog, self.active_category.as_deref())?;
        let position = store.get_index_of(&key)?;
        if self.window.position_in_page(position).is_none() {
            self.window.jump_to_key(store, &key)?;
        }
        Ok(key)
    }

    /// Activate `key`, moving the window to the page that shows it.
    /// Returns the key's canonical position.
    pub fn select_key(&mut self, key: &K) -> Result<usize, EntryError> {
        self.store()?.get_index_of(key)?;
        self.activate(key.clone())?;
        let store = active_store(&self.catalog, self.active_category.as_deref())?;
        self.window.jump_to_key(store, key)
    }

    /// Activate `key` or, when it does not exist, the closest key below it.
    /// Returns the selected key and whether it was an exact match.
    pub fn select_nearest(&mut self, key: &K) -> Result<(K, bool), EntryError> {
        let found = self
            .store()?
            .nearest_at_or_before(key)
            .cloned()
            .ok_or_else(|| EntryError::entry_not_found(key))?;
        self.select_key(&found)?;
        let exact = found == *key;
        Ok((found, exact))
    }

    /// Switch the active row, resolving an open edit on the previous row first
    /// according to `commit_on_row_switch`. A failed commit aborts the switch.
    fn activate(&mut self, key: K) -> Result<(), EntryError> {
        if self.active_key.as_ref() == Some(&key) {
            return Ok(());
        }
        if self.session.is_open() {
            if self.config.commit_on_row_switch {
                self.commit_edit()?;
            } else if let Some(discarded) = self.session.cancel() {
                if discarded.is_dirty() {
                    tracing::warn!(
                        target_key = %discarded.target,
                        field = %discarded.field,
                        "discarded unsaved edit on row switch"
                    );
                }
            }
        }
        self.active_key = Some(key);
        Ok(())
    }

    /// Start editing a field of the active row.
    pub fn begin_edit_active_row(&mut self, field: EditField) -> Result<(), EntryError> {
        let key = self.active_key.clone().ok_or_else(no_active_row)?;
        let original = {
            let record = self
                .store()?
                .get(&key)
                .ok_or_else(|| EntryError::entry_not_found(&key))?;
            match field {
                EditField::Text => record.text.clone(),
                EditField::Key => key.edit_text(),
            }
        };
        self.session.begin_edit(key, field, original)
    }

    pub fn update_edit(&mut self, value: impl Into<String>) -> Result<(), EntryError> {
        self.session.update_pending(value)
    }

    /// Apply the open edit. The active row follows a renamed key and the window
    /// moves so it stays visible.
    pub fn commit_edit(&mut self) -> Result<Option<EntryChange<K>>, EntryError> {
        let category = self.active_category.as_deref();
        let store = active_store_mut(&mut self.catalog, category)?;
        let Some(change) = self.session.commit(store)? else {
            return Ok(None);
        };

        if let EntryChange::Key { before, after } = &change {
            if self.active_key.as_ref() == Some(before) {
                self.active_key = Some(after.clone());
            }
            self.window.jump_to_key(store, after)?;
            self.search.rename_hit(before, after);
        }
        tracing::info!(category = ?category, change = %change.describe(), "committed edit");
        self.history.record(change.clone());
        self.catalog.mark_dirty();
        Ok(Some(change))
    }

    /// Discard the open edit, if any. Never fails.
    pub fn cancel_edit(&mut self) -> Option<OpenEdit<K>> {
        let discarded = self.session.cancel();
        if let Some(open) = &discarded {
            tracing::debug!(target_key = %open.target, field = %open.field, "cancelled edit");
        }
        discarded
    }

    fn ensure_no_open_edit(&self) -> Result<(), EntryError> {
        match self.session.current() {
            Some(open) => Err(EntryError::Conflict {
                target: open.target.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Remove the active entry. The row is deselected and, if the last page
    /// became empty, the window steps back a page.
    pub fn delete_active_row(&mut self) -> Result<EntryRecord<K>, EntryError> {
        self.ensure_no_open_edit()?;
        let key = self.active_key.clone().ok_or_else(no_active_row)?;
        let store = active_store_mut(&mut self.catalog, self.active_category.as_deref())?;

        let position = store.get_index_of(&key)?;
        let record = store.remove(&key)?;
        let total = store.len();

        self.history.record(EntryChange::Removed {
            record: record.clone(),
            position,
        });
        self.active_key = None;
        if self.window.set_total(total) {
            tracing::debug!(start = self.window.start_offset(), "window stepped back after delete");
        }
        self.catalog.mark_dirty();
        tracing::info!(key = %key, "deleted entry");
        Ok(record)
    }

    /// Insert a new entry (at `at_position` in list categories) and activate it.
    pub fn add_entry(
        &mut self,
        record: EntryRecord<K>,
        at_position: Option<usize>,
    ) -> Result<usize, EntryError> {
        self.ensure_no_open_edit()?;
        let store = active_store_mut(&mut self.catalog, self.active_category.as_deref())?;

        let key = record.key.clone();
        let position = store.insert(record.clone(), at_position)?;
        self.window.set_total(store.len());
        self.window.jump_to_key(store, &key)?;

        self.history.record(EntryChange::Inserted { record, position });
        self.active_key = Some(key.clone());
        self.catalog.mark_dirty();
        tracing::info!(key = %key, position, "added entry");
        Ok(position)
    }

    /// Duplicate the active entry's text under the key `offset` steps away,
    /// placed right after it in list categories.
    pub fn add_relative_entry(&mut self, offset: i64) -> Result<K, EntryError> {
        let key = self.active_key.clone().ok_or_else(no_active_row)?;
        let store = self.store()?;
        let text = store
            .get(&key)
            .map(|record| record.text.clone())
            .ok_or_else(|| EntryError::entry_not_found(&key))?;
        let new_key = key
            .offset(offset)
            .map_err(|reason| EntryError::validation(EditField::Key, reason))?;
        let at = store.position_after(&key)?;

        self.add_entry(EntryRecord::new(new_key.clone(), text), Some(at))?;
        Ok(new_key)
    }

    /// Move the active entry's tag (an AI goal's type) one step along its cycle.
    /// Fails with `DuplicateKey` when the resulting key is already taken.
    pub fn cycle_active_tag(&mut self, reverse: bool) -> Result<K, EntryError> {
        self.ensure_no_open_edit()?;
        let key = self.active_key.clone().ok_or_else(no_active_row)?;
        let new_key = key
            .cycle_tag(reverse)
            .map_err(|reason| EntryError::validation(EditField::Key, reason))?;
        let store = active_store_mut(&mut self.catalog, self.active_category.as_deref())?;
        store.rename_key(&key, new_key.clone())?;
        self.window.jump_to_key(store, &new_key)?;

        let change = EntryChange::Key {
            before: key.clone(),
            after: new_key.clone(),
        };
        tracing::info!(change = %change.describe(), "changed entry type");
        self.search.rename_hit(&key, &new_key);
        self.history.record(change);
        self.active_key = Some(new_key.clone());
        self.catalog.mark_dirty();
        Ok(new_key)
    }

    /// Revert the latest change; returns its description.
    pub fn undo(&mut self) -> Result<Option<String>, EntryError> {
        self.step_history(false)
    }

    /// Re-apply the latest undone change; returns its description.
    pub fn redo(&mut self) -> Result<Option<String>, EntryError> {
        self.step_history(true)
    }

    fn step_history(&mut self, forward: bool) -> Result<Option<String>, EntryError> {
        self.ensure_no_open_edit()?;
        let store = active_store_mut(&mut self.catalog, self.active_category.as_deref())?;

        let stepped = if forward {
            self.history.redo(store)?
        } else {
            self.history.undo(store)?
        };
        let Some(change) = stepped else {
            return Ok(None);
        };
        let description = change.describe();
        let focus = change.focus_key(forward).cloned();
        if let EntryChange::Key { before, after } = change {
            let (from, to) = if forward { (before, after) } else { (after, before) };
            self.search.rename_hit(from, to);
        }

        self.window.set_total(store.len());
        match focus {
            Some(key) => {
                self.window.jump_to_key(store, &key)?;
                self.active_key = Some(key);
            }
            None => {
                if self.active_key.as_ref().is_some_and(|k| !store.contains(k)) {
                    self.active_key = None;
                }
            }
        }
        self.catalog.refresh_dirty();
        tracing::info!(forward, change = %description, "history step");
        Ok(Some(description))
    }

    /// Search the active category's texts; returns the number of hits.
    pub fn find(&mut self, query: &str) -> Result<usize, EntryError> {
        let store = active_store(&self.catalog, self.active_category.as_deref())?;
        self.search
            .run(store, query, self.config.search_case_sensitive)
    }

    /// Select the next search hit, skipping hits deleted since the search ran.
    pub fn next_search_hit(&mut self) -> Result<Option<K>, EntryError> {
        for _ in 0..self.search.hits().len() {
            let Some(key) = self.search.next_hit().cloned() else {
                break;
            };
            if self.store()?.contains(&key) {
                self.select_key(&key)?;
                return Ok(Some(key));
            }
        }
        Ok(None)
    }

    /// Re-sync the window and active row after stores were changed through
    /// [`SelectionController::catalog_mut`].
    pub fn refresh(&mut self) {
        let synced = self.store().ok().map(|store| {
            let active_gone = self.active_key.as_ref().is_some_and(|k| !store.contains(k));
            (store.len(), active_gone)
        });
        let Some((total, active_gone)) = synced else {
            self.active_category = None;
            self.active_key = None;
            self.session.cancel();
            self.window.reset(0);
            return;
        };
        self.window.set_total(total);
        if active_gone {
            self.active_key = None;
            self.session.cancel();
        }
    }
}
