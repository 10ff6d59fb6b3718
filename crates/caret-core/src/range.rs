//! Half-open character ranges.

use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` interval of character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TextRange {
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl TextRange {
    /// Create a range, swapping the bounds if they arrive reversed.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// An empty range at `offset`.
    pub fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Number of characters covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the range covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `[start, end)` lies entirely inside this range.
    pub fn contains(&self, start: usize, end: usize) -> bool {
        self.start <= start && start <= end && end <= self.end
    }

    /// Returns `true` if `offset` is in `[start, end]`.
    ///
    /// The end is inclusive: a caret sitting right after the last character still belongs to
    /// the range.
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Returns `true` if both ranges share at least one character.
    ///
    /// An empty range never overlaps anything.
    pub fn overlaps(&self, other: &TextRange) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.start < other.end
            && other.start < self.end
    }

    /// The common part of both ranges, if any (an empty result at a shared edge counts).
    pub fn intersect(&self, other: &TextRange) -> Option<TextRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(TextRange { start, end })
    }

    /// The smallest range covering both.
    pub fn include(&self, other: &TextRange) -> TextRange {
        TextRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Same range with a new start, clamped so the range stays well formed.
    pub fn with_start(&self, start: usize) -> TextRange {
        TextRange {
            start: start.min(self.end),
            end: self.end,
        }
    }

    /// Same range with a new end, clamped so the range stays well formed.
    pub fn with_end(&self, end: usize) -> TextRange {
        TextRange {
            start: self.start,
            end: end.max(self.start),
        }
    }
}
