use crate::{CategoryStore, EntryError, EntryKey, EntryRecord};

/// A fixed-size page of rows over the active category.
///
/// `start_offset` need not sit on a page boundary (jumps may land anywhere the
/// clamp allows), but stepping with `go_next`/`go_previous` always lands on one.
/// Whenever entries exist, the window starts inside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeWindow {
    page_size: usize,
    start_offset: usize,
    total_count: usize,
}

impl RangeWindow {
    /// `page_size` of zero is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            start_offset: 0,
            total_count: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Back to the first page of a (new) category with `total` entries.
    pub fn reset(&mut self, total: usize) {
        self.total_count = total;
        self.start_offset = 0;
    }

    /// Refresh the cached count after the store changed. If the window now
    /// starts past the end it steps back a page at a time; returns whether it did.
    pub fn set_total(&mut self, total: usize) -> bool {
        self.total_count = total;
        let mut stepped = false;
        while total > 0 && self.start_offset >= total {
            self.start_offset = self.start_offset.saturating_sub(self.page_size);
            stepped = true;
        }
        if total == 0 && self.start_offset != 0 {
            self.start_offset = 0;
            stepped = true;
        }
        stepped
    }

    /// Clamp `start` into `[0, total - page_size]`, or 0 when everything fits.
    pub fn set_window(&mut self, start: usize) {
        self.start_offset = if self.total_count > self.page_size {
            start.min(self.total_count - self.page_size)
        } else {
            0
        };
    }

    #[must_use]
    pub fn go_next(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.start_offset = (self.start_offset + self.page_size) / self.page_size * self.page_size;
        true
    }

    #[must_use]
    pub fn go_previous(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.start_offset = (self.start_offset - 1) / self.page_size * self.page_size;
        true
    }

    pub fn can_go_previous(&self) -> bool {
        self.start_offset > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.start_offset + self.page_size < self.total_count
    }

    pub fn current_page<'a, K: EntryKey>(
        &self,
        store: &'a CategoryStore<K>,
    ) -> Vec<&'a EntryRecord<K>> {
        store.get_range(self.start_offset, self.page_size)
    }

    /// Move to the page holding `key` and return its canonical position.
    pub fn jump_to_key<K: EntryKey>(
        &mut self,
        store: &CategoryStore<K>,
        key: &K,
    ) -> Result<usize, EntryError> {
        let position = store.get_index_of(key)?;
        self.total_count = store.len();
        self.start_offset = position / self.page_size * self.page_size;
        Ok(position)
    }

    /// Row within the current page for canonical `position`, if visible.
    pub fn position_in_page(&self, position: usize) -> Option<usize> {
        let row = position.checked_sub(self.start_offset)?;
        (row < self.page_size && position < self.total_count).then_some(row)
    }

    /// Zero-based page the window starts in.
    pub fn page_number(&self) -> usize {
        self.start_offset / self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.total_count.div_ceil(self.page_size)
    }
}
