use std::collections::VecDeque;

use loam_blocks::Voxel;
use loam_geom::IVec3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub pos: IVec3,
    pub prev: Voxel,
    pub next: Voxel,
}

/// Undo/redo stacks. The undo side is capped; pushing past the cap drops the oldest entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct History {
    cap: usize,
    undo: VecDeque<HistoryEntry>,
    redo: Vec<HistoryEntry>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl History {
    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            undo: VecDeque::new(),
            redo: Vec::new(),
        }
    }

    fn push_undo(&mut self, e: HistoryEntry) {
        if self.undo.len() == self.cap {
            self.undo.pop_front();
        }
        self.undo.push_back(e);
    }

    /// Records a fresh user edit. Clears the redo stack.
    pub fn push(&mut self, e: HistoryEntry) {
        self.push_undo(e);
        self.redo.clear();
    }

    /// Pops the newest undoable entry and moves it to the redo stack.
    /// The caller writes `entry.prev` back.
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        let e = self.undo.pop_back()?;
        self.redo.push(e);
        Some(e)
    }

    /// Pops the newest redoable entry and moves it back to the undo stack.
    /// The caller writes `entry.next` again.
    pub fn redo(&mut self) -> Option<HistoryEntry> {
        let e = self.redo.pop()?;
        self.push_undo(e);
        Some(e)
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
