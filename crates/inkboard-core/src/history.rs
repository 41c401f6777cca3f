//! Snapshot-based undo/redo.

use crate::raster::RasterSnapshot;
use crate::shapes::VectorObject;
use std::collections::VecDeque;

/// Maximum number of undo states to keep.
pub const MAX_HISTORY: usize = 40;

/// Raster pixels and object list captured together.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub raster: RasterSnapshot,
    pub objects: Vec<VectorObject>,
}

/// Bounded undo ring plus redo stack.
///
/// After the board captures its baseline the undo ring always holds at
/// least one entry; its last entry mirrors the live state.
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    capacity: usize,
    suppressed: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl History {
    /// Create a history keeping at most `capacity` undo entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(capacity.max(1)),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
            suppressed: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether captures are currently ignored.
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Turn suppression on or off, returning the previous setting so nested
    /// scopes can put it back.
    pub fn set_suppressed(&mut self, suppressed: bool) -> bool {
        std::mem::replace(&mut self.suppressed, suppressed)
    }

    /// Record a new state. Ignored while suppressed. Evicts the oldest entry
    /// past capacity and clears the redo stack. Returns whether it was recorded.
    pub fn push(&mut self, entry: HistoryEntry) -> bool {
        if self.suppressed {
            return false;
        }
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
        log::debug!(
            "History captured ({} undo, {} redo)",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        true
    }

    /// Step back. Returns the entry to restore, or `None` when only the
    /// baseline is left.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if self.undo_stack.len() < 2 {
            return None;
        }
        let current = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        self.undo_stack.back()
    }

    /// Step forward. Returns the entry to restore, or `None` if nothing was undone.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        self.undo_stack.back()
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undo entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo_stack.iter()
    }

    /// The entry matching the live state.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.undo_stack.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::WorldSize;
    use crate::raster::RasterSurface;

    /// Entries told apart by object count.
    fn entry(surface: &mut RasterSurface, objects: usize) -> HistoryEntry {
        let mut doc = crate::document::BoardDocument::default();
        for _ in 0..objects {
            doc.create(crate::document::ObjectSpec::new(crate::shapes::ObjectKind::Rect));
        }
        HistoryEntry {
            raster: surface.snapshot(),
            objects: doc.snapshot(),
        }
    }

    #[test]
    fn test_undo_needs_baseline_plus_change() {
        let mut surface = RasterSurface::new(WorldSize::new(4, 4));
        let mut history = History::default();
        assert!(history.undo().is_none());
        history.push(entry(&mut surface, 0));
        assert!(!history.can_undo());
        assert!(history.undo().is_none());

        history.push(entry(&mut surface, 1));
        assert!(history.can_undo());
        let restored = history.undo().map(|e| e.objects.len());
        assert_eq!(restored, Some(0));
        assert!(history.can_redo());
    }

    #[test]
    fn test_redo_restores_undone_entry() {
        let mut surface = RasterSurface::new(WorldSize::new(4, 4));
        let mut history = History::default();
        history.push(entry(&mut surface, 0));
        history.push(entry(&mut surface, 1));
        history.undo();
        let redone = history.redo().map(|e| e.objects.len());
        assert_eq!(redone, Some(1));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut surface = RasterSurface::new(WorldSize::new(4, 4));
        let mut history = History::default();
        history.push(entry(&mut surface, 0));
        history.push(entry(&mut surface, 1));
        history.undo();
        assert_eq!(history.redo_len(), 1);
        history.push(entry(&mut surface, 2));
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_capacity_evicts_oldest_first() {
        let mut surface = RasterSurface::new(WorldSize::new(4, 4));
        let mut history = History::new(MAX_HISTORY);
        for n in 0..(MAX_HISTORY + 5) {
            history.push(entry(&mut surface, n));
        }
        assert_eq!(history.undo_len(), MAX_HISTORY);
        let counts: Vec<usize> = history.entries().map(|e| e.objects.len()).collect();
        let expected: Vec<usize> = (5..MAX_HISTORY + 5).collect();
        assert_eq!(counts, expected);
    }

    #[test]
    fn test_suppressed_push_is_ignored() {
        let mut surface = RasterSurface::new(WorldSize::new(4, 4));
        let mut history = History::default();
        let previous = history.set_suppressed(true);
        assert!(!previous);
        assert!(!history.push(entry(&mut surface, 0)));
        assert_eq!(history.undo_len(), 0);
        history.set_suppressed(previous);
        assert!(history.push(entry(&mut surface, 0)));
    }
}
