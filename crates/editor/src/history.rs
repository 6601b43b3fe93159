//! Snapshot-based undo/redo history.
//!
//! - Undo and redo stacks of [`EditorSnapshot`], most recent last
//! - Recording clears the redo stack (a new branch of edits)
//! - Recording a snapshot equal to the undo top is a no-op
//! - Gestures collapse a run of live edits (drag, resize) into one entry
//! - Bounded depth; the oldest undo entries are evicted first
//!
//! # Usage
//!
//! ```ignore
//! let mut history = HistoryManager::new(50);
//!
//! // Before a tracked edit, capture the current state
//! history.record("Delete section", EditorSnapshot::capture(&state));
//!
//! // Undo hands back the snapshot to restore and keeps `current` for redo
//! if let Some(entry) = history.undo(EditorSnapshot::capture(&state)) {
//!     entry.snapshot.restore(&mut state);
//! }
//! ```

use std::collections::VecDeque;
use std::time::Instant;

use crate::snapshot::EditorSnapshot;

/// A single entry in the undo/redo history.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Human-readable label of the edit this entry undoes or redoes.
    pub label: String,
    pub snapshot: EditorSnapshot,
    pub timestamp: Instant,
}

impl HistoryEntry {
    fn new(label: impl Into<String>, snapshot: EditorSnapshot) -> Self {
        Self {
            label: label.into(),
            snapshot,
            timestamp: Instant::now(),
        }
    }
}

/// An open gesture: its label and the state before it started.
#[derive(Clone, Debug)]
struct Gesture {
    label: String,
    before: EditorSnapshot,
}

/// Linear undo/redo over editor snapshots.
#[derive(Debug)]
pub struct HistoryManager {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    max_entries: usize,
    gesture: Option<Gesture>,
}

impl HistoryManager {
    /// Create a history holding at most `max_entries` per stack.
    pub fn new(max_entries: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_entries,
            gesture: None,
        }
    }

    /// Record the state *before* a tracked edit. Returns whether an entry was pushed.
    ///
    /// - While a gesture is open nothing is pushed, but the redo stack is
    ///   still cleared since the state has moved on.
    /// - A snapshot identical to the undo top is ignored entirely.
    pub fn record(&mut self, label: &str, snapshot: EditorSnapshot) -> bool {
        if self.gesture.is_some() {
            if !self.redo_stack.is_empty() {
                self.redo_stack.clear();
            }
            tracing::debug!(label, "Record suppressed: gesture in progress");
            return false;
        }
        self.push_undo(HistoryEntry::new(label, snapshot))
    }

    /// Step back. `current` is the state right now; it is kept for redo.
    ///
    /// Returns the entry whose snapshot should be restored, or `None` when
    /// there is nothing to undo. An open gesture is closed first.
    pub fn undo(&mut self, current: EditorSnapshot) -> Option<HistoryEntry> {
        if self.gesture.is_some() {
            tracing::warn!("Closing stuck gesture before undo");
            self.close_gesture(&current);
        }

        let entry = self.undo_stack.pop_back()?;
        tracing::debug!(
            label = %entry.label,
            undo_remaining = self.undo_stack.len(),
            "Undo"
        );

        self.redo_stack
            .push_back(HistoryEntry::new(entry.label.clone(), current));
        Self::enforce_limit(&mut self.redo_stack, self.max_entries);
        Some(entry)
    }

    /// Step forward again after an undo. Symmetric to [`undo`](Self::undo).
    pub fn redo(&mut self, current: EditorSnapshot) -> Option<HistoryEntry> {
        if self.gesture.is_some() {
            tracing::warn!("Closing stuck gesture before redo");
            self.close_gesture(&current);
        }

        let entry = self.redo_stack.pop_back()?;
        tracing::debug!(
            label = %entry.label,
            redo_remaining = self.redo_stack.len(),
            "Redo"
        );

        self.undo_stack
            .push_back(HistoryEntry::new(entry.label.clone(), current));
        Self::enforce_limit(&mut self.undo_stack, self.max_entries);
        Some(entry)
    }

    /// Open a gesture. Returns `false` (and keeps the first gesture) if one is
    /// already open.
    pub fn begin_gesture(&mut self, label: &str, before: EditorSnapshot) -> bool {
        if let Some(open) = &self.gesture {
            tracing::warn!(label, open = %open.label, "Gesture already in progress, ignoring");
            return false;
        }
        self.gesture = Some(Gesture {
            label: label.to_string(),
            before,
        });
        tracing::debug!(label, "Gesture started");
        true
    }

    /// Close the open gesture. `after` is the state now; a single entry is
    /// recorded if it differs from the state the gesture started from.
    ///
    /// Returns `None` if no gesture was open, otherwise whether an entry was
    /// recorded.
    pub fn end_gesture(&mut self, after: &EditorSnapshot) -> Option<bool> {
        if self.gesture.is_none() {
            return None;
        }
        Some(self.close_gesture(after))
    }

    fn close_gesture(&mut self, after: &EditorSnapshot) -> bool {
        let Some(Gesture { label, before }) = self.gesture.take() else {
            return false;
        };
        if before == *after {
            tracing::debug!(label = %label, "Gesture ended without changes");
            return false;
        }
        let pushed = self.push_undo(HistoryEntry::new(label, before));
        tracing::debug!(undo_depth = self.undo_stack.len(), "Gesture ended");
        pushed
    }

    fn push_undo(&mut self, entry: HistoryEntry) -> bool {
        if self
            .undo_stack
            .back()
            .is_some_and(|top| top.snapshot == entry.snapshot)
        {
            tracing::debug!(label = %entry.label, "Snapshot identical to undo top, skipped");
            return false;
        }

        self.redo_stack.clear();
        let label = entry.label.clone();
        self.undo_stack.push_back(entry);
        Self::enforce_limit(&mut self.undo_stack, self.max_entries);

        tracing::debug!(
            label = %label,
            undo_depth = self.undo_stack.len(),
            "History entry pushed"
        );
        true
    }

    fn enforce_limit(stack: &mut VecDeque<HistoryEntry>, max: usize) {
        while stack.len() > max {
            if let Some(evicted) = stack.pop_front() {
                tracing::debug!(label = %evicted.label, "History entry evicted");
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn is_in_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn gesture_label(&self) -> Option<&str> {
        self.gesture.as_ref().map(|g| g.label.as_str())
    }

    /// Label of the edit that would be undone next.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(|e| e.label.as_str())
    }

    /// Label of the edit that would be redone next.
    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.back().map(|e| e.label.as_str())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undo labels, oldest first.
    pub fn undo_labels(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().map(|e| e.label.as_str())
    }

    /// Drop both stacks and any open gesture.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.gesture = None;
        tracing::debug!("History cleared");
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Change the depth limit, trimming the oldest entries if needed.
    pub fn set_max_entries(&mut self, max: usize) {
        self.max_entries = max;
        Self::enforce_limit(&mut self.undo_stack, max);
        Self::enforce_limit(&mut self.redo_stack, max);
    }
}
