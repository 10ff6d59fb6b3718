//! The editor-side interface the engine drives.
//!
//! The engine reads text and carets through [`CaretHost`] and mutates the caret set only through
//! its primitives, always inside [`CaretHost::run_atomic`]. [`crate::CaretEditor`] is the
//! in-memory reference implementation; embedders implement the trait over their own editor.

use crate::caret::{Caret, CaretId};
use crate::error::CaretError;
use crate::range::TextRange;

/// Text and caret primitives supplied by the embedding editor.
pub trait CaretHost {
    /// Total number of characters in the buffer.
    fn len_chars(&self) -> usize;

    /// Line containing `offset`.
    fn line_of(&self, offset: usize) -> usize;

    /// Offset of the first character of `line`.
    fn line_start(&self, line: usize) -> usize;

    /// Offset just past the last character of `line`, before its terminator.
    fn line_end(&self, line: usize) -> usize;

    /// Read-only copy of the text inside `range`.
    fn chars_in_range(&self, range: TextRange) -> String;

    /// All live carets in offset order.
    fn carets(&self) -> Vec<(CaretId, Caret)>;

    /// The primary caret.
    fn primary_caret(&self) -> (CaretId, Caret);

    /// Look up a caret by handle.
    fn caret(&self, id: CaretId) -> Option<Caret> {
        self.carets()
            .into_iter()
            .find_map(|(candidate, caret)| (candidate == id).then_some(caret))
    }

    /// Add a caret. Returns `Ok(None)` if a caret already sits at `offset`.
    fn add_caret(
        &mut self,
        offset: usize,
        selection: Option<TextRange>,
    ) -> Result<Option<CaretId>, CaretError>;

    /// Remove a caret.
    fn remove_caret(&mut self, id: CaretId) -> Result<(), CaretError>;

    /// Move a caret, clearing its selection.
    fn move_caret(&mut self, id: CaretId, offset: usize) -> Result<(), CaretError>;

    /// Set (or clear, with `None`) a caret's selection.
    fn set_selection(&mut self, id: CaretId, selection: Option<TextRange>)
    -> Result<(), CaretError>;

    /// Make `id` the primary caret.
    fn set_primary(&mut self, id: CaretId) -> Result<(), CaretError>;

    /// Run `f` as one all-or-nothing caret-set transaction.
    ///
    /// Observers see either every mutation made by `f` or, if `f` returns `Err`, none of them.
    fn run_atomic<R, F>(&mut self, f: F) -> Result<R, CaretError>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<R, CaretError>;
}
