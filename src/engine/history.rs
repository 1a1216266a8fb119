// SPDX-License-Identifier: MPL-2.0
//! Bounded snapshot history for undo/redo.
//!
//! Each committed edit stores an encoded snapshot of the processed image.
//! The stack keeps at most `capacity` entries: pushing past the limit
//! evicts the oldest entry, and pushing while the cursor sits below the
//! tip discards the abandoned redo branch first.

use std::sync::Arc;

/// Encoded image payload stored in the history stack.
///
/// Snapshots are shared references; cloning one is cheap.
pub type Snapshot = Arc<Vec<u8>>;

#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    entries: Vec<Snapshot>,
    cursor: usize,
    capacity: usize,
}

impl SnapshotHistory {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Drop everything and start over with a single entry (a fresh load).
    pub fn reset(&mut self, initial: Snapshot) {
        self.entries.clear();
        self.entries.push(initial);
        self.cursor = 0;
    }

    /// Append a snapshot at the cursor, discarding any redo branch and
    /// evicting the oldest entry when the stack outgrows its capacity.
    pub fn push(&mut self, snapshot: Snapshot) {
        if !self.entries.is_empty() && self.cursor < self.entries.len() - 1 {
            self.entries.truncate(self.cursor + 1);
        }

        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;

        if self.entries.len() > self.capacity {
            self.entries.remove(0);
            self.cursor -= 1;
        }
    }

    /// Whether an undo step is currently possible.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a redo step is currently possible.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor < self.entries.len() - 1
    }

    /// The snapshot an undo would land on, without moving the cursor.
    #[must_use]
    pub fn peek_back(&self) -> Option<&Snapshot> {
        if self.can_undo() {
            self.entries.get(self.cursor - 1)
        } else {
            None
        }
    }

    /// The snapshot a redo would land on, without moving the cursor.
    #[must_use]
    pub fn peek_forward(&self) -> Option<&Snapshot> {
        if self.can_redo() {
            self.entries.get(self.cursor + 1)
        } else {
            None
        }
    }

    /// Move the cursor one step back. Returns false at the boundary.
    pub fn step_back(&mut self) -> bool {
        if self.can_undo() {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Move the cursor one step forward. Returns false at the boundary.
    pub fn step_forward(&mut self) -> bool {
        if self.can_redo() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// The snapshot at the cursor, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.cursor)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
