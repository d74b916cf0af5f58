//! Selection state of form controls
//!
//! Offsets count characters, not bytes, and are clamped to the current value.

use serde::{Deserialize, Serialize};

/// Selection range inside a text form control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

impl SelectionRange {
    /// Create a range, clamping both ends to `len` and ordering them
    pub fn clamped(start: usize, end: usize, len: usize) -> Self {
        let start = start.min(len);
        let end = end.min(len).max(start);
        Self { start, end }
    }

    /// Collapsed caret at `offset`
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Selection captured while a controlled input was forced back to its
/// imposed value; restored on the next value write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    pub selection_start: usize,
    pub selection_end: usize,
    pub is_caret_at_end: bool,
}

impl SelectionSnapshot {
    /// Selection to apply once the control holds `len` characters
    pub fn resolve(&self, len: usize) -> SelectionRange {
        if self.is_caret_at_end {
            SelectionRange::caret(len)
        } else {
            SelectionRange::clamped(self.selection_start, self.selection_end, len)
        }
    }
}
