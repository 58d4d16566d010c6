use crate::{CategoryStore, EditField, EntryError, EntryKey, statics};

/// Results of a text search over the active category, cycled one hit at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState<K> {
    query: String,
    hits: Vec<K>,
    cursor: Option<usize>,
}

impl<K> Default for SearchState<K> {
    fn default() -> Self {
        Self {
            query: String::new(),
            hits: Vec::new(),
            cursor: None,
        }
    }
}

impl<K: EntryKey> SearchState<K> {
    /// Collect the keys (in canonical order) whose text contains `query`.
    pub fn run(
        &mut self,
        store: &CategoryStore<K>,
        query: &str,
        case_sensitive: bool,
    ) -> Result<usize, EntryError> {
        if query.trim().is_empty() {
            return Err(EntryError::validation(
                EditField::Text,
                statics::EN_ERR_EMPTY_QUERY,
            ));
        }

        let needle = if case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };
        self.hits = store
            .iter()
            .filter(|record| {
                if case_sensitive {
                    record.text.contains(&needle)
                } else {
                    record.text.to_lowercase().contains(&needle)
                }
            })
            .map(|record| record.key.clone())
            .collect();
        self.query = query.to_string();
        self.cursor = None;
        Ok(self.hits.len())
    }

    /// Advance to the next hit, wrapping around. `None` without hits.
    pub fn next_hit(&mut self) -> Option<&K> {
        if self.hits.is_empty() {
            return None;
        }
        let next = self.cursor.map_or(0, |i| (i + 1) % self.hits.len());
        self.cursor = Some(next);
        self.hits.get(next)
    }

    /// Keep a hit valid after its entry's key changed from `from` to `to`.
    pub fn rename_hit(&mut self, from: &K, to: &K) {
        for hit in &mut self.hits {
            if *hit == *from {
                *hit = to.clone();
            }
        }
    }

    pub fn hits(&self) -> &[K] {
        &self.hits
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
