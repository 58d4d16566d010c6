use crate::{EntryError, EntryKey, EntryRecord, statics};
use indexmap::IndexMap;

/// How a category orders its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Array order; entries can be placed anywhere (map entry lists).
    List,
    /// Ascending key order, derived from the keys (param tables, goal dicts).
    Keyed,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::List => statics::CAT_KIND_LIST,
            StoreKind::Keyed => statics::CAT_KIND_KEYED,
        }
    }
}

/// All entries of one category, in canonical order.
///
/// The store does not notify anyone when it changes; whoever mutates it is
/// responsible for refreshing dependent windows.
#[derive(Debug, Clone)]
pub struct CategoryStore<K> {
    category_id: String,
    kind: StoreKind,
    entries: IndexMap<K, EntryRecord<K>>,
}

/// Equality includes entry order (`IndexMap` alone ignores it).
impl<K: EntryKey> PartialEq for CategoryStore<K> {
    fn eq(&self, other: &Self) -> bool {
        self.category_id == other.category_id
            && self.kind == other.kind
            && self.entries.iter().eq(other.entries.iter())
    }
}

impl<K: EntryKey> Eq for CategoryStore<K> {}

impl<K: EntryKey> CategoryStore<K> {
    pub fn new(category_id: impl Into<String>, kind: StoreKind) -> Self {
        Self {
            category_id: category_id.into(),
            kind,
            entries: IndexMap::new(),
        }
    }

    /// Build a store from records in file/array order. Keyed stores sort them.
    pub fn from_records(
        category_id: impl Into<String>,
        kind: StoreKind,
        records: impl IntoIterator<Item = EntryRecord<K>>,
    ) -> Result<Self, EntryError> {
        let mut store = Self::new(category_id, kind);
        for record in records {
            store.insert(record, None)?;
        }
        Ok(store)
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&EntryRecord<K>> {
        self.entries.get(key)
    }

    pub fn get_at(&self, position: usize) -> Option<&EntryRecord<K>> {
        self.entries.get_index(position).map(|(_, record)| record)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntryRecord<K>> {
        self.entries.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Up to `count` records starting at canonical position `start`.
    pub fn get_range(&self, start: usize, count: usize) -> Vec<&EntryRecord<K>> {
        let end = start.saturating_add(count).min(self.entries.len());
        self.entries
            .get_range(start..end)
            .map(|slice| slice.values().collect())
            .unwrap_or_default()
    }

    /// Canonical position of `key`.
    pub fn get_index_of(&self, key: &K) -> Result<usize, EntryError> {
        self.entries
            .get_index_of(key)
            .ok_or_else(|| EntryError::entry_not_found(key))
    }

    /// Position right after `key`, where a duplicate of it would be placed.
    pub fn position_after(&self, key: &K) -> Result<usize, EntryError> {
        Ok(self.get_index_of(key)? + 1)
    }

    /// Insert a record. `at_position` only applies to list stores (defaults to
    /// appending, clamped to the length); keyed stores derive the position.
    /// Returns the canonical position the record landed at.
    pub fn insert(
        &mut self,
        record: EntryRecord<K>,
        at_position: Option<usize>,
    ) -> Result<usize, EntryError> {
        if self.entries.contains_key(&record.key) {
            return Err(self.duplicate(&record.key));
        }
        let position = match self.kind {
            StoreKind::List => at_position
                .unwrap_or(self.entries.len())
                .min(self.entries.len()),
            StoreKind::Keyed => self.sorted_position(&record.key),
        };
        self.entries.shift_insert(position, record.key.clone(), record);
        Ok(position)
    }

    pub fn remove(&mut self, key: &K) -> Result<EntryRecord<K>, EntryError> {
        self.entries
            .shift_remove(key)
            .ok_or_else(|| EntryError::entry_not_found(key))
    }

    /// Replace `old` with `new`, keeping the record's text. List stores keep
    /// the position; keyed stores move the record to its new sorted place.
    pub fn rename_key(&mut self, old: &K, new: K) -> Result<(), EntryError> {
        let index = self.get_index_of(old)?;
        if *old == new {
            return Ok(());
        }
        if self.entries.contains_key(&new) {
            return Err(self.duplicate(&new));
        }

        let Some((_, mut record)) = self.entries.shift_remove_index(index) else {
            return Err(EntryError::entry_not_found(old));
        };
        record.key = new.clone();
        let position = match self.kind {
            StoreKind::List => index,
            StoreKind::Keyed => self.sorted_position(&new),
        };
        self.entries.shift_insert(position, new, record);
        Ok(())
    }

    /// Set the text of `key`, returning the previous text.
    pub fn set_text(&mut self, key: &K, text: impl Into<String>) -> Result<String, EntryError> {
        let record = self
            .entries
            .get_mut(key)
            .ok_or_else(|| EntryError::entry_not_found(key))?;
        Ok(std::mem::replace(&mut record.text, text.into()))
    }

    /// `key` itself if present, otherwise the largest key below it.
    pub fn nearest_at_or_before(&self, key: &K) -> Option<&K> {
        if let Some((existing, _)) = self.entries.get_key_value(key) {
            return Some(existing);
        }
        match self.kind {
            StoreKind::Keyed => {
                let position = self.sorted_position(key);
                position
                    .checked_sub(1)
                    .and_then(|i| self.entries.get_index(i))
                    .map(|(k, _)| k)
            }
            StoreKind::List => self.entries.keys().filter(|k| *k < key).max(),
        }
    }

    /// Number of keys strictly below `key` (keyed stores are always sorted).
    fn sorted_position(&self, key: &K) -> usize {
        self.entries.partition_point(|k, _| k < key)
    }

    fn duplicate(&self, key: &K) -> EntryError {
        EntryError::DuplicateKey {
            key: key.to_string(),
            category: self.category_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryStore, StoreKind};
    use crate::{EntryError, EntryRecord, GoalKey, GoalType};

    fn names(store: &CategoryStore<String>) -> Vec<&str> {
        store.keys().map(String::as_str).collect()
    }

    fn list_abc() -> CategoryStore<String> {
        CategoryStore::from_records(
            "Parts",
            StoreKind::List,
            ["A", "B", "C"]
                .into_iter()
                .map(|n| EntryRecord::new(n.to_string(), format!("{n} text"))),
        )
        .unwrap()
    }

    fn keyed(ids: &[i64]) -> CategoryStore<i64> {
        CategoryStore::from_records(
            "NpcParam",
            StoreKind::Keyed,
            ids.iter().map(|id| EntryRecord::new(*id, format!("Row {id}"))),
        )
        .unwrap()
    }

    #[test]
    fn list_insert_at_position_shifts_later_entries() {
        let mut store = list_abc();
        let pos = store
            .insert(EntryRecord::new("D".to_string(), "D text"), Some(1))
            .unwrap();
        assert_eq!(pos, 1);
        assert_eq!(names(&store), vec!["A", "D", "B", "C"]);
        assert_eq!(store.get_index_of(&"B".to_string()), Ok(2));
    }

    #[test]
    fn list_insert_defaults_to_append_and_clamps() {
        let mut store = list_abc();
        store
            .insert(EntryRecord::new("D".to_string(), "d"), None)
            .unwrap();
        store
            .insert(EntryRecord::new("E".to_string(), "e"), Some(99))
            .unwrap();
        assert_eq!(names(&store), vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn keyed_store_orders_by_key_and_ignores_position() {
        let mut store = keyed(&[30, 10, 20]);
        assert_eq!(store.keys().copied().collect::<Vec<_>>(), vec![10, 20, 30]);

        let pos = store.insert(EntryRecord::new(15, "x"), Some(0)).unwrap();
        assert_eq!(pos, 1);
        assert_eq!(store.get_index_of(&30), Ok(3));
    }

    #[test]
    fn get_range_is_positional_not_key_based() {
        let store = keyed(&[100, 200, 300, 400]);
        let range: Vec<i64> = store.get_range(1, 2).iter().map(|r| r.key).collect();
        assert_eq!(range, vec![200, 300]);
        assert_eq!(store.get_range(3, 10).len(), 1);
        assert!(store.get_range(4, 10).is_empty());
        assert!(store.get_range(usize::MAX, 10).is_empty());
    }

    #[test]
    fn duplicate_insert_is_rejected_without_change() {
        let mut store = keyed(&[1, 2]);
        let err = store.insert(EntryRecord::new(2, "again"), None).unwrap_err();
        assert_eq!(
            err,
            EntryError::DuplicateKey {
                key: "2".to_string(),
                category: "NpcParam".to_string()
            }
        );
        assert_eq!(store.get(&2).unwrap().text, "Row 2");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn insert_then_remove_restores_order() {
        let mut store = keyed(&[5, 1, 9]);
        let before = store.clone();
        store.insert(EntryRecord::new(4, "new"), None).unwrap();
        let removed = store.remove(&4).unwrap();
        assert_eq!(removed.text, "new");
        assert_eq!(store, before);
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut store = keyed(&[1]);
        assert!(matches!(
            store.remove(&2),
            Err(EntryError::NotFound { what: "entry", .. })
        ));
    }

    #[test]
    fn rename_keeps_list_position_and_resorts_keyed() {
        let mut list = list_abc();
        list.rename_key(&"A".to_string(), "Z".to_string()).unwrap();
        assert_eq!(names(&list), vec!["Z", "B", "C"]);
        assert_eq!(list.get(&"Z".to_string()).unwrap().text, "A text");

        let mut store = keyed(&[1, 2, 3]);
        store.rename_key(&1, 10).unwrap();
        assert_eq!(store.keys().copied().collect::<Vec<_>>(), vec![2, 3, 10]);
        assert_eq!(store.get(&10).unwrap().key, 10);
        assert_eq!(store.get(&10).unwrap().text, "Row 1");
    }

    #[test]
    fn rename_round_trip_restores_store() {
        let mut list = list_abc();
        let original = list.clone();
        list.rename_key(&"B".to_string(), "Q".to_string()).unwrap();
        list.rename_key(&"Q".to_string(), "B".to_string()).unwrap();
        assert_eq!(list, original);

        let mut store = keyed(&[4, 8, 15]);
        let original = store.clone();
        store.rename_key(&4, 16).unwrap();
        store.rename_key(&16, 4).unwrap();
        assert_eq!(store, original);
    }

    #[test]
    fn rename_onto_existing_key_fails() {
        let mut store = keyed(&[1, 2]);
        assert!(matches!(
            store.rename_key(&1, 2),
            Err(EntryError::DuplicateKey { .. })
        ));
        assert_eq!(store.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(store.rename_key(&1, 1), Ok(()));
    }

    #[test]
    fn goal_keys_with_same_id_and_different_types_coexist() {
        let mut store = CategoryStore::new("m10_00_00_00", StoreKind::Keyed);
        store
            .insert(EntryRecord::new(GoalKey::new(100, GoalType::Battle), "Attack"), None)
            .unwrap();
        store
            .insert(EntryRecord::new(GoalKey::new(100, GoalType::Logic), "Think"), None)
            .unwrap();
        assert_eq!(store.len(), 2);
        assert!(
            store
                .insert(EntryRecord::new(GoalKey::new(100, GoalType::Logic), "x"), None)
                .is_err()
        );
    }

    #[test]
    fn nearest_at_or_before_finds_closest_preceding_key() {
        let store = keyed(&[100, 200, 300]);
        assert_eq!(store.nearest_at_or_before(&200), Some(&200));
        assert_eq!(store.nearest_at_or_before(&250), Some(&200));
        assert_eq!(store.nearest_at_or_before(&1000), Some(&300));
        assert_eq!(store.nearest_at_or_before(&50), None);
    }

    #[test]
    fn set_text_returns_previous_text() {
        let mut store = keyed(&[7]);
        assert_eq!(store.set_text(&7, "Foo"), Ok("Row 7".to_string()));
        assert_eq!(store.get(&7).unwrap().text, "Foo");
        assert!(store.set_text(&8, "x").is_err());
    }
}
