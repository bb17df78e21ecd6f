use image::RgbaImage;

use crate::canvas::buffer_size;

// ============================================================================
// HISTORY MANAGER - Full-snapshot undo/redo with a cursor and memory limits
// ============================================================================

/// Default cap on the number of stored snapshots.
pub const DEFAULT_MAX_ENTRIES: usize = 50;
/// Default cap on the bytes held by all snapshots.
pub const DEFAULT_MAX_MEMORY_BYTES: usize = 512 * 1024 * 1024;

/// Ordered snapshots of the canvas with a cursor to the active one.
///
/// Every entry owns its own buffer. Committing after an undo discards the
/// redo branch. Oldest entries are pruned from the front when either the
/// entry or the memory cap is exceeded; the active entry is never dropped.
pub struct HistoryManager {
    entries: Vec<RgbaImage>,
    /// `None` before the first image is loaded.
    cursor: Option<usize>,
    max_entries: usize,
    /// Optional memory cap in bytes.
    max_memory_bytes: Option<usize>,
    /// Running memory total across all entries.
    total_memory: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl HistoryManager {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            max_entries: max_entries.max(1),
            max_memory_bytes: Some(DEFAULT_MAX_MEMORY_BYTES),
            total_memory: 0,
        }
    }

    /// History holding only `pristine`, cursor at 0.
    pub fn with_pristine(pristine: RgbaImage) -> Self {
        let mut history = Self::default();
        history.init(pristine);
        history
    }

    /// Replace the memory cap (`None` disables it).
    pub fn set_memory_limit(&mut self, max_bytes: Option<usize>) {
        self.max_memory_bytes = max_bytes;
        self.prune();
    }

    /// Collapse to a single pristine entry.
    pub fn init(&mut self, pristine: RgbaImage) {
        self.total_memory = buffer_size(&pristine);
        self.entries.clear();
        self.entries.push(pristine);
        self.cursor = Some(0);
    }

    /// Same as [`init`](Self::init); kept as its own verb for toolbar callers.
    pub fn reset(&mut self, pristine: RgbaImage) {
        self.init(pristine);
    }

    /// Append a new snapshot after the cursor, dropping any redo branch.
    pub fn commit(&mut self, image: RgbaImage) {
        let Some(cursor) = self.cursor else {
            self.init(image);
            return;
        };

        for dropped in self.entries.drain(cursor + 1..) {
            self.total_memory = self.total_memory.saturating_sub(buffer_size(&dropped));
        }

        self.total_memory += buffer_size(&image);
        self.entries.push(image);
        self.cursor = Some(self.entries.len() - 1);

        self.prune();
    }

    pub fn undo(&mut self) -> Option<&RgbaImage> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                self.entries.get(c - 1)
            }
            _ => None,
        }
    }

    pub fn redo(&mut self) -> Option<&RgbaImage> {
        match self.cursor {
            Some(c) if c + 1 < self.entries.len() => {
                self.cursor = Some(c + 1);
                self.entries.get(c + 1)
            }
            _ => None,
        }
    }

    /// The snapshot currently displayed.
    pub fn current(&self) -> Option<&RgbaImage> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.entries.len())
    }

    pub fn undo_count(&self) -> usize {
        self.cursor.unwrap_or(0)
    }

    pub fn redo_count(&self) -> usize {
        self.cursor
            .map_or(0, |c| self.entries.len().saturating_sub(c + 1))
    }

    /// Get the current memory usage of the history (O(1) via cached total)
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    /// Drop the oldest snapshots until both limits hold.
    fn prune(&mut self) {
        let mut dropped = 0;
        while self.entries.len() - dropped > self.max_entries {
            dropped += 1;
        }
        if let Some(max_bytes) = self.max_memory_bytes {
            let mut total = self.total_memory;
            for entry in &self.entries[..dropped] {
                total = total.saturating_sub(buffer_size(entry));
            }
            while total > max_bytes && self.entries.len() - dropped > 1 {
                total = total.saturating_sub(buffer_size(&self.entries[dropped]));
                dropped += 1;
            }
        }
        if dropped == 0 {
            return;
        }

        // Never drop past the active entry.
        let cursor = self.cursor.unwrap_or(0);
        let dropped = dropped.min(cursor);
        for removed in self.entries.drain(..dropped) {
            self.total_memory = self.total_memory.saturating_sub(buffer_size(&removed));
        }
        self.cursor = Some(cursor - dropped);
    }
}
