//! Caret values, handles and value-based identity.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::host::CaretHost;
use crate::range::TextRange;

/// Position coordinates (line and column numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based logical line index.
    pub line: usize,
    /// Zero-based column in characters within the logical line.
    pub column: usize,
}

impl Position {
    /// Create a new logical position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Opaque handle to a live caret owned by a [`CaretHost`].
///
/// A handle becomes stale as soon as the host removes its caret. The engine never keeps a
/// handle across a commit; it re-resolves carets through [`CoordinateKey`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaretId(u64);

impl CaretId {
    /// Wrap a host-assigned raw id.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The host-assigned raw id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CaretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A caret as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Caret {
    /// Character offset of the caret.
    pub offset: usize,
    /// Selected range, if any.
    pub selection: Option<TextRange>,
    /// Whether this is the primary caret.
    pub is_primary: bool,
}

impl Caret {
    /// A caret without selection.
    pub fn at(offset: usize) -> Self {
        Self {
            offset,
            selection: None,
            is_primary: false,
        }
    }

    /// Returns `true` if the caret carries a non-empty selection.
    pub fn has_selection(&self) -> bool {
        self.selection.is_some_and(|s| !s.is_empty())
    }
}

/// Handle-free description of a caret: where it sits and what it selects.
///
/// Spawn requests, session snapshots and rebuild plans are all expressed in `CaretState`s so
/// that nothing depends on host handles surviving a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CaretState {
    /// Caret offset.
    pub position: usize,
    /// Selection start (equal to `selection_end` when there is no selection).
    pub selection_start: usize,
    /// Selection end.
    pub selection_end: usize,
}

impl CaretState {
    /// A state without selection.
    pub fn at(position: usize) -> Self {
        Self {
            position,
            selection_start: position,
            selection_end: position,
        }
    }

    /// A state at `position` selecting `selection`.
    pub fn with_selection(position: usize, selection: TextRange) -> Self {
        Self {
            position,
            selection_start: selection.start,
            selection_end: selection.end,
        }
    }

    /// Capture a host caret.
    pub fn from_caret(caret: &Caret) -> Self {
        match caret.selection {
            Some(selection) => Self::with_selection(caret.offset, selection),
            None => Self::at(caret.offset),
        }
    }

    /// The selection, or `None` when it is empty.
    pub fn selection(&self) -> Option<TextRange> {
        let range = TextRange::new(self.selection_start, self.selection_end);
        (!range.is_empty()).then_some(range)
    }
}

/// Value-based caret identity: the logical line/column of the caret offset.
///
/// Two carets at the same logical position always produce equal keys, whatever handles the
/// host gave them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordinateKey {
    /// Logical line.
    pub line: usize,
    /// Column in characters within the line.
    pub column: usize,
}

impl CoordinateKey {
    /// Derive the key of `offset` through the host's line index.
    pub fn of<H: CaretHost + ?Sized>(host: &H, offset: usize) -> Self {
        let line = host.line_of(offset);
        Self {
            line,
            column: offset.saturating_sub(host.line_start(line)),
        }
    }
}

impl From<Position> for CoordinateKey {
    fn from(position: Position) -> Self {
        Self {
            line: position.line,
            column: position.column,
        }
    }
}
