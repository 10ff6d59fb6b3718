use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use caret_core::{
    Caret, CaretChangeKind, CaretEditor, CaretError, CaretHost, CaretId, CaretSearchEngine,
    CaretState, Direction, MatchMode, Pattern, SearchPolicy, SearchStatus, TextRange,
};
use pretty_assertions::assert_eq;

/// Host whose `add_caret` starts failing after a number of calls.
struct FlakyHost {
    inner: CaretEditor,
    adds_left: usize,
}

impl CaretHost for FlakyHost {
    fn len_chars(&self) -> usize {
        self.inner.len_chars()
    }

    fn line_of(&self, offset: usize) -> usize {
        self.inner.line_of(offset)
    }

    fn line_start(&self, line: usize) -> usize {
        self.inner.line_start(line)
    }

    fn line_end(&self, line: usize) -> usize {
        self.inner.line_end(line)
    }

    fn chars_in_range(&self, range: TextRange) -> String {
        self.inner.chars_in_range(range)
    }

    fn carets(&self) -> Vec<(CaretId, Caret)> {
        self.inner.carets()
    }

    fn primary_caret(&self) -> (CaretId, Caret) {
        self.inner.primary_caret()
    }

    fn add_caret(
        &mut self,
        offset: usize,
        selection: Option<TextRange>,
    ) -> Result<Option<CaretId>, CaretError> {
        if self.adds_left == 0 {
            return Err(CaretError::OffsetOutOfBounds { offset, len: 0 });
        }
        self.adds_left -= 1;
        self.inner.add_caret(offset, selection)
    }

    fn remove_caret(&mut self, id: CaretId) -> Result<(), CaretError> {
        self.inner.remove_caret(id)
    }

    fn move_caret(&mut self, id: CaretId, offset: usize) -> Result<(), CaretError> {
        self.inner.move_caret(id, offset)
    }

    fn set_selection(
        &mut self,
        id: CaretId,
        selection: Option<TextRange>,
    ) -> Result<(), CaretError> {
        self.inner.set_selection(id, selection)
    }

    fn set_primary(&mut self, id: CaretId) -> Result<(), CaretError> {
        self.inner.set_primary(id)
    }

    fn run_atomic<R, F>(&mut self, f: F) -> Result<R, CaretError>
    where
        F: FnOnce(&mut Self) -> Result<R, CaretError>,
    {
        let snapshot = self.inner.snapshot();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.inner.restore(snapshot);
                Err(err)
            }
        }
    }
}

#[test]
fn test_failed_commit_rolls_back() {
    let mut host = FlakyHost {
        inner: CaretEditor::new("foo bar foo baz foo"),
        adds_left: 1,
    };
    let before = host.inner.caret_states();
    let mut engine = CaretSearchEngine::default();

    let result = engine.execute(
        &mut host,
        &Pattern::literal("foo", Direction::Forward),
        &SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll),
    );

    assert!(matches!(result, Err(CaretError::OffsetOutOfBounds { .. })));
    assert_eq!(host.inner.caret_states(), before);
    assert!(!engine.guard().is_guarded());
}

#[test]
fn test_editor_transaction_rolls_back_and_stays_silent() {
    let mut editor = CaretEditor::new("abcdef");
    let events = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&events);
    editor.subscribe(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    let before = editor.snapshot();

    let result: Result<(), CaretError> = editor.run_atomic(|host| {
        host.add_caret(3, None)?;
        host.add_caret(99, None)?;
        Ok(())
    });

    assert!(result.is_err());
    assert_eq!(editor.snapshot(), before);
    assert_eq!(events.load(Ordering::SeqCst), 0);
}

#[test]
fn test_listeners_see_guard_raised_during_rebuild() {
    let mut editor = CaretEditor::new("ab ab ab");
    let mut engine = CaretSearchEngine::default();

    let guard = engine.guard().clone();
    let guarded = Arc::new(AtomicUsize::new(0));
    let unguarded = Arc::new(AtomicUsize::new(0));
    let (g, u) = (Arc::clone(&guarded), Arc::clone(&unguarded));
    editor.subscribe(move |_| {
        if guard.if_unguarded(|| u.fetch_add(1, Ordering::SeqCst)).is_none() {
            g.fetch_add(1, Ordering::SeqCst);
        }
    });

    engine
        .execute(
            &mut editor,
            &Pattern::literal("ab", Direction::Forward),
            &SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll),
        )
        .unwrap();
    assert!(guarded.load(Ordering::SeqCst) > 0);
    assert_eq!(unguarded.load(Ordering::SeqCst), 0);

    let id = editor.carets()[0].0;
    editor.move_caret(id, 1).unwrap();
    assert_eq!(unguarded.load(Ordering::SeqCst), 1);
}

#[test]
fn test_reentrant_invocation_is_suppressed() {
    let mut editor = CaretEditor::new("ab ab");
    let mut engine = CaretSearchEngine::default();
    let before = editor.caret_states();

    let guard = engine.guard().clone();
    let _scope = guard.scope();
    let policy = SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll);

    let outcome = engine
        .execute(&mut editor, &Pattern::literal("ab", Direction::Forward), &policy)
        .unwrap();
    assert_eq!(outcome.status, SearchStatus::Suppressed);

    let outcome = engine.spawn(&mut editor, &policy).unwrap();
    assert_eq!(outcome.status, SearchStatus::Suppressed);
    assert_eq!(editor.caret_states(), before);
}

#[test]
fn test_events_delivered_once_after_commit() {
    let mut editor = CaretEditor::new("ab ab ab");
    let mut engine = CaretSearchEngine::default();

    let kinds = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&kinds);
    editor.subscribe(move |change| {
        if let Ok(mut kinds) = sink.lock() {
            kinds.push(change.kind);
        }
    });

    engine
        .execute(
            &mut editor,
            &Pattern::literal("ab", Direction::Forward),
            &SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll),
        )
        .unwrap();

    let kinds = kinds.lock().unwrap().clone();
    let added = kinds
        .iter()
        .filter(|k| **k == CaretChangeKind::Added)
        .count();
    assert_eq!(added, 2);
    assert_eq!(
        editor.caret_states(),
        vec![
            CaretState::with_selection(0, TextRange::new(0, 2)),
            CaretState::with_selection(3, TextRange::new(3, 5)),
            CaretState::with_selection(6, TextRange::new(6, 8)),
        ]
    );
}
