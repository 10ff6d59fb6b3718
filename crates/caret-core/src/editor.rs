//! In-memory reference host.
//!
//! [`CaretEditor`] owns a [`TextBuffer`] and a multi-caret set and implements [`CaretHost`]
//! with the transactional behaviour the engine relies on:
//!
//! - carets are addressed by [`CaretId`] handles that go stale on removal;
//! - [`CaretHost::add_caret`] refuses to stack a caret on top of another one;
//! - the last caret can never be removed;
//! - changes made inside [`CaretHost::run_atomic`] are announced to subscribers only after the
//!   outermost transaction commits, and are discarded (with the caret set restored) when the
//!   transaction fails.
//!
//! # Example
//!
//! ```rust
//! use caret_core::{CaretEditor, CaretHost};
//!
//! let mut editor = CaretEditor::new("foo bar foo");
//! editor.subscribe(|change| println!("{:?}", change.kind));
//!
//! editor
//!     .run_atomic(|host| {
//!         host.add_caret(8, None)?;
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(editor.carets().len(), 2);
//! ```

use crate::buffer::TextBuffer;
use crate::caret::{Caret, CaretId, CaretState, Position};
use crate::error::CaretError;
use crate::host::CaretHost;
use crate::range::TextRange;

/// Kind of caret-set change announced to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretChangeKind {
    /// A caret was added.
    Added,
    /// A caret was removed (explicitly or merged into a duplicate).
    Removed,
    /// A caret moved.
    Moved,
    /// A caret's selection changed.
    SelectionChanged,
    /// Another caret became primary.
    PrimaryChanged,
    /// The whole caret set was replaced from a snapshot.
    Restored,
    /// Buffer text changed.
    TextModified,
}

/// A change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretChange {
    /// What happened.
    pub kind: CaretChangeKind,
    /// The caret concerned, if the change is about one caret.
    pub caret: Option<CaretId>,
    /// Editor version after the change.
    pub version: u64,
}

/// Subscriber callback type.
pub type CaretChangeCallback = Box<dyn FnMut(&CaretChange) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CaretSlot {
    id: CaretId,
    offset: usize,
    selection: Option<TextRange>,
}

impl CaretSlot {
    fn to_caret(self, is_primary: bool) -> Caret {
        Caret {
            offset: self.offset,
            selection: self.selection,
            is_primary,
        }
    }
}

/// Saved caret set, restorable with [`CaretEditor::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretSnapshot {
    slots: Vec<CaretSlot>,
    primary: CaretId,
}

impl CaretSnapshot {
    /// The saved carets as handle-free states, in offset order.
    pub fn states(&self) -> Vec<CaretState> {
        let mut slots = self.slots.clone();
        slots.sort_by_key(|s| (s.offset, s.id));
        slots
            .iter()
            .map(|s| CaretState::from_caret(&s.to_caret(false)))
            .collect()
    }
}

struct Transaction {
    snapshot: CaretSnapshot,
    pending: Vec<CaretChange>,
}

/// Reference multi-caret editor.
pub struct CaretEditor {
    buffer: TextBuffer,
    slots: Vec<CaretSlot>,
    primary: CaretId,
    next_id: u64,
    version: u64,
    callbacks: Vec<CaretChangeCallback>,
    transactions: Vec<Transaction>,
}

impl CaretEditor {
    /// Create an editor with one primary caret at offset 0.
    pub fn new(text: &str) -> Self {
        let primary = CaretId::from_raw(0);
        Self {
            buffer: TextBuffer::from_text(text),
            slots: vec![CaretSlot {
                id: primary,
                offset: 0,
                selection: None,
            }],
            primary,
            next_id: 1,
            version: 0,
            callbacks: Vec::new(),
            transactions: Vec::new(),
        }
    }

    /// Create an editor whose carets are `states`; the first state becomes primary.
    ///
    /// Duplicate positions are merged. An empty `states` yields a single caret at 0.
    pub fn with_carets(text: &str, states: &[CaretState]) -> Result<Self, CaretError> {
        let mut editor = Self::new(text);
        let Some((first, rest)) = states.split_first() else {
            return Ok(editor);
        };

        editor.check_state(first)?;
        editor.slots[0].offset = first.position;
        editor.slots[0].selection = first.selection();
        for state in rest {
            editor.check_state(state)?;
            let id = editor.allocate_id();
            editor.slots.push(CaretSlot {
                id,
                offset: state.position,
                selection: state.selection(),
            });
        }
        editor.merge_duplicates();
        Ok(editor)
    }

    /// The text buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Full buffer text.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Monotonic change counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Register a change subscriber.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&CaretChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Carets as handle-free states, in offset order.
    pub fn caret_states(&self) -> Vec<CaretState> {
        self.carets()
            .iter()
            .map(|(_, caret)| CaretState::from_caret(caret))
            .collect()
    }

    /// State of the primary caret.
    pub fn primary_state(&self) -> CaretState {
        CaretState::from_caret(&self.primary_caret().1)
    }

    /// Line/column of an offset.
    pub fn position_of(&self, offset: usize) -> Position {
        self.buffer.position_of(offset)
    }

    /// Save the caret set.
    pub fn snapshot(&self) -> CaretSnapshot {
        CaretSnapshot {
            slots: self.slots.clone(),
            primary: self.primary,
        }
    }

    /// Replace the caret set with a snapshot taken earlier.
    ///
    /// Handles captured in the snapshot come back to life; handles allocated since then go
    /// stale.
    pub fn restore(&mut self, snapshot: CaretSnapshot) {
        self.restore_silently(snapshot);
        self.emit(CaretChangeKind::Restored, None);
    }

    /// Insert text, shifting carets at or after `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), CaretError> {
        self.buffer.insert(offset, text)?;
        let inserted = text.chars().count();
        let shift = |o: usize| if o >= offset { o + inserted } else { o };
        for slot in &mut self.slots {
            slot.offset = shift(slot.offset);
            slot.selection = slot
                .selection
                .map(|s| TextRange::new(shift(s.start), shift(s.end)));
        }
        self.emit(CaretChangeKind::TextModified, None);
        Ok(())
    }

    /// Delete the text in `range`, collapsing carets inside it onto its start.
    pub fn delete(&mut self, range: TextRange) -> Result<(), CaretError> {
        self.buffer.remove(range)?;
        let shift = |o: usize| {
            if o >= range.end {
                o - range.len()
            } else if o > range.start {
                range.start
            } else {
                o
            }
        };
        for slot in &mut self.slots {
            slot.offset = shift(slot.offset);
            slot.selection = slot
                .selection
                .map(|s| TextRange::new(shift(s.start), shift(s.end)))
                .filter(|s| !s.is_empty());
        }
        self.emit(CaretChangeKind::TextModified, None);
        if self.transactions.is_empty() {
            self.merge_duplicates();
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> CaretId {
        let id = CaretId::from_raw(self.next_id);
        self.next_id += 1;
        id
    }

    fn slot_index(&self, id: CaretId) -> Result<usize, CaretError> {
        self.slots
            .iter()
            .position(|s| s.id == id)
            .ok_or(CaretError::StaleCaret(id))
    }

    fn check_offset(&self, offset: usize) -> Result<(), CaretError> {
        let len = self.buffer.len_chars();
        if offset > len {
            return Err(CaretError::OffsetOutOfBounds { offset, len });
        }
        Ok(())
    }

    fn check_state(&self, state: &CaretState) -> Result<(), CaretError> {
        self.check_offset(state.position)?;
        self.check_offset(state.selection_start)?;
        self.check_offset(state.selection_end)
    }

    fn restore_silently(&mut self, snapshot: CaretSnapshot) {
        self.slots = snapshot.slots;
        self.primary = snapshot.primary;
    }

    fn emit(&mut self, kind: CaretChangeKind, caret: Option<CaretId>) {
        self.version += 1;
        let change = CaretChange {
            kind,
            caret,
            version: self.version,
        };
        match self.transactions.last_mut() {
            Some(tx) => tx.pending.push(change),
            None => self.deliver(&[change]),
        }
    }

    fn deliver(&mut self, changes: &[CaretChange]) {
        for change in changes {
            for callback in &mut self.callbacks {
                callback(change);
            }
        }
    }

    /// Collapse carets sharing an offset, keeping the primary when it is among them.
    fn merge_duplicates(&mut self) {
        let primary = self.primary;
        self.slots
            .sort_by_key(|s| (s.offset, s.id != primary, s.id));

        let mut merged: Vec<CaretSlot> = Vec::with_capacity(self.slots.len());
        let mut dropped = Vec::new();
        for slot in self.slots.drain(..) {
            match merged.last() {
                Some(last) if last.offset == slot.offset => dropped.push(slot.id),
                _ => merged.push(slot),
            }
        }
        self.slots = merged;

        for id in dropped {
            tracing::trace!(caret = %id, "merged duplicate caret");
            self.emit(CaretChangeKind::Removed, Some(id));
        }
    }
}

impl CaretHost for CaretEditor {
    fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    fn line_of(&self, offset: usize) -> usize {
        self.buffer.line_of(offset)
    }

    fn line_start(&self, line: usize) -> usize {
        self.buffer.line_start(line)
    }

    fn line_end(&self, line: usize) -> usize {
        self.buffer.line_end(line)
    }

    fn chars_in_range(&self, range: TextRange) -> String {
        self.buffer.slice(range)
    }

    fn carets(&self) -> Vec<(CaretId, Caret)> {
        let mut slots = self.slots.clone();
        slots.sort_by_key(|s| (s.offset, s.id));
        slots
            .into_iter()
            .map(|s| (s.id, s.to_caret(s.id == self.primary)))
            .collect()
    }

    fn primary_caret(&self) -> (CaretId, Caret) {
        match self
            .slots
            .iter()
            .find(|s| s.id == self.primary)
            .or(self.slots.first())
        {
            Some(slot) => (slot.id, slot.to_caret(true)),
            None => (
                self.primary,
                Caret {
                    is_primary: true,
                    ..Caret::at(0)
                },
            ),
        }
    }

    fn caret(&self, id: CaretId) -> Option<Caret> {
        self.slots
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.to_caret(s.id == self.primary))
    }

    fn add_caret(
        &mut self,
        offset: usize,
        selection: Option<TextRange>,
    ) -> Result<Option<CaretId>, CaretError> {
        self.check_offset(offset)?;
        if let Some(selection) = selection {
            self.check_offset(selection.end)?;
        }
        if self.slots.iter().any(|s| s.offset == offset) {
            return Ok(None);
        }

        let id = self.allocate_id();
        self.slots.push(CaretSlot {
            id,
            offset,
            selection: selection.filter(|s| !s.is_empty()),
        });
        self.emit(CaretChangeKind::Added, Some(id));
        Ok(Some(id))
    }

    fn remove_caret(&mut self, id: CaretId) -> Result<(), CaretError> {
        let index = self.slot_index(id)?;
        if self.slots.len() == 1 {
            return Err(CaretError::LastCaret);
        }

        self.slots.remove(index);
        self.emit(CaretChangeKind::Removed, Some(id));

        if id == self.primary
            && let Some(next) = self.slots.first().map(|s| s.id)
        {
            self.primary = next;
            self.emit(CaretChangeKind::PrimaryChanged, Some(next));
        }
        Ok(())
    }

    fn move_caret(&mut self, id: CaretId, offset: usize) -> Result<(), CaretError> {
        let index = self.slot_index(id)?;
        self.check_offset(offset)?;

        let slot = &mut self.slots[index];
        if slot.offset == offset && slot.selection.is_none() {
            return Ok(());
        }
        slot.offset = offset;
        slot.selection = None;
        self.emit(CaretChangeKind::Moved, Some(id));
        Ok(())
    }

    fn set_selection(
        &mut self,
        id: CaretId,
        selection: Option<TextRange>,
    ) -> Result<(), CaretError> {
        let index = self.slot_index(id)?;
        if let Some(selection) = selection {
            self.check_offset(selection.end)?;
        }

        let selection = selection.filter(|s| !s.is_empty());
        let slot = &mut self.slots[index];
        if slot.selection == selection {
            return Ok(());
        }
        slot.selection = selection;
        self.emit(CaretChangeKind::SelectionChanged, Some(id));
        Ok(())
    }

    fn set_primary(&mut self, id: CaretId) -> Result<(), CaretError> {
        self.slot_index(id)?;
        if self.primary != id {
            self.primary = id;
            self.emit(CaretChangeKind::PrimaryChanged, Some(id));
        }
        Ok(())
    }

    fn run_atomic<R, F>(&mut self, f: F) -> Result<R, CaretError>
    where
        F: FnOnce(&mut Self) -> Result<R, CaretError>,
    {
        self.transactions.push(Transaction {
            snapshot: self.snapshot(),
            pending: Vec::new(),
        });

        let result = f(self);

        let Some(tx) = self.transactions.pop() else {
            return result;
        };

        match result {
            Ok(value) => {
                if let Some(outer) = self.transactions.last_mut() {
                    outer.pending.extend(tx.pending);
                } else {
                    // Merge notifications join the batch being committed.
                    self.transactions.push(tx);
                    self.merge_duplicates();
                    if let Some(tx) = self.transactions.pop() {
                        self.deliver(&tx.pending);
                    }
                }
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(error = %err, "caret transaction rolled back");
                self.restore_silently(tx.snapshot);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recorder(editor: &mut CaretEditor) -> Arc<Mutex<Vec<CaretChangeKind>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        editor.subscribe(move |change| sink.lock().unwrap().push(change.kind));
        seen
    }

    #[test]
    fn test_add_refuses_collision() {
        let mut editor = CaretEditor::new("hello");
        assert!(editor.add_caret(0, None).unwrap().is_none());
        assert!(editor.add_caret(3, None).unwrap().is_some());
        assert_eq!(editor.carets().len(), 2);
    }

    #[test]
    fn test_last_caret_survives() {
        let mut editor = CaretEditor::new("hello");
        let (id, _) = editor.primary_caret();
        assert_eq!(editor.remove_caret(id), Err(CaretError::LastCaret));
    }

    #[test]
    fn test_removing_primary_promotes_next() {
        let mut editor = CaretEditor::new("hello");
        let second = editor.add_caret(4, None).unwrap().unwrap();
        let (primary, _) = editor.primary_caret();
        editor.remove_caret(primary).unwrap();
        assert_eq!(editor.primary_caret().0, second);
        assert_eq!(editor.remove_caret(primary), Err(CaretError::StaleCaret(primary)));
    }

    #[test]
    fn test_transaction_delivers_after_commit() {
        let mut editor = CaretEditor::new("hello world");
        let seen = recorder(&mut editor);

        editor
            .run_atomic(|host| {
                host.add_caret(6, None)?;
                assert!(seen.lock().unwrap().is_empty());
                Ok(())
            })
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![CaretChangeKind::Added]);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let mut editor = CaretEditor::new("hello world");
        let seen = recorder(&mut editor);
        let before = editor.snapshot();

        let result: Result<(), CaretError> = editor.run_atomic(|host| {
            host.add_caret(6, None)?;
            let (id, _) = host.primary_caret();
            host.move_caret(id, 3)?;
            host.move_caret(id, 99)
        });

        assert!(matches!(result, Err(CaretError::OffsetOutOfBounds { .. })));
        assert_eq!(editor.snapshot(), before);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_commit_merges_transient_duplicates() {
        let mut editor = CaretEditor::new("hello world");
        let other = editor.add_caret(6, None).unwrap().unwrap();
        let (primary, _) = editor.primary_caret();

        editor
            .run_atomic(|host| host.move_caret(other, 0))
            .unwrap();

        let carets = editor.carets();
        assert_eq!(carets.len(), 1);
        assert_eq!(carets[0].0, primary);
    }

    #[test]
    fn test_text_edits_shift_carets() {
        let mut editor =
            CaretEditor::with_carets("abc def", &[CaretState::at(1), CaretState::at(5)]).unwrap();
        editor.insert(0, "xx").unwrap();
        assert_eq!(editor.caret_states(), vec![CaretState::at(3), CaretState::at(7)]);

        editor.delete(TextRange::new(2, 8)).unwrap();
        assert_eq!(editor.text(), "xxf");
        assert_eq!(editor.caret_states(), vec![CaretState::at(2)]);
    }
}
