use crate::key::EntryKey;

/// One editable item of a category: its identity and the text shown in its row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord<K> {
    pub key: K,
    pub text: String,
}

impl<K: EntryKey> EntryRecord<K> {
    pub fn new(key: K, text: impl Into<String>) -> Self {
        Self {
            key,
            text: text.into(),
        }
    }

    pub fn tag(&self) -> Option<String> {
        self.key.tag()
    }
}
