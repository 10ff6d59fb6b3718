use caret_core::{
    CaretEditor, CaretHost, CaretSearchEngine, CaretState, Direction, Landing, MatchMode, Pattern,
    SearchPolicy, SearchStatus, SpawnSettings, TextRange,
};
use pretty_assertions::assert_eq;

fn positions(editor: &CaretEditor) -> Vec<usize> {
    editor.caret_states().iter().map(|s| s.position).collect()
}

fn selections(editor: &CaretEditor) -> Vec<Option<TextRange>> {
    editor.caret_states().iter().map(|s| s.selection()).collect()
}

#[test]
fn test_spawn_all_literal_occurrences() {
    let mut editor = CaretEditor::new("foo bar foo baz foo");
    let mut engine = CaretSearchEngine::default();

    let policy = SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll);
    let outcome = engine
        .execute(&mut editor, &Pattern::literal("foo", Direction::Forward), &policy)
        .unwrap();

    assert_eq!(outcome.status, SearchStatus::Committed);
    assert_eq!((outcome.kept, outcome.spawned, outcome.removed), (1, 2, 0));
    assert_eq!(positions(&editor), vec![0, 8, 16]);
    assert_eq!(
        selections(&editor),
        vec![
            Some(TextRange::new(0, 3)),
            Some(TextRange::new(8, 11)),
            Some(TextRange::new(16, 19)),
        ]
    );
    assert_eq!(editor.primary_state().position, 0);
}

#[test]
fn test_inferred_identifier_spawn() {
    let mut editor = CaretEditor::new("foo bar foo baz foo");
    let mut engine = CaretSearchEngine::default();

    let outcome = engine
        .spawn(
            &mut editor,
            &SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll),
        )
        .unwrap();

    assert_eq!(outcome.status, SearchStatus::Committed);
    assert_eq!(positions(&editor), vec![0, 8, 16]);
}

#[test]
fn test_smart_prefix_spawns_on_every_variant() {
    let text = "myCountOfItems = countOfItems + getCountOfItems;";
    let mut editor = CaretEditor::new(text);
    let mut engine = CaretSearchEngine::new(SpawnSettings {
        smart_prefix: true,
        prefix_pattern: "my|get|is".to_string(),
        ..SpawnSettings::default()
    });

    let outcome = engine
        .spawn(
            &mut editor,
            &SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll),
        )
        .unwrap();

    assert_eq!(outcome.carets.len(), 3);
    assert_eq!(positions(&editor), vec![0, 17, 32]);
    assert_eq!(
        selections(&editor),
        vec![
            Some(TextRange::new(0, 14)),
            Some(TextRange::new(17, 29)),
            Some(TextRange::new(32, 47)),
        ]
    );
}

#[test]
fn test_single_match_moves_primary() {
    let mut editor = CaretEditor::with_carets("foo bar foo", &[CaretState::at(1)]).unwrap();
    let mut engine = CaretSearchEngine::default();

    let outcome = engine
        .execute(
            &mut editor,
            &Pattern::literal("foo", Direction::Forward),
            &SearchPolicy::new(Direction::Forward, MatchMode::SingleMatch),
        )
        .unwrap();

    assert_eq!((outcome.kept, outcome.spawned), (1, 0));
    assert_eq!(positions(&editor), vec![8]);
    assert_eq!(editor.primary_state().position, 8);
    assert_eq!(editor.carets().len(), 1);
}

#[test]
fn test_spawn_all_count() {
    let mut editor = CaretEditor::new("x x x x x");
    let mut engine = CaretSearchEngine::default();

    let outcome = engine
        .execute(
            &mut editor,
            &Pattern::literal("x", Direction::Forward),
            &SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll),
        )
        .unwrap();

    assert_eq!(outcome.spawned, 4);
    assert_eq!(positions(&editor), vec![0, 2, 4, 6, 8]);
}

#[test]
fn test_no_match_is_a_noop() {
    let states = [CaretState::at(4), CaretState::at(0)];
    let mut editor = CaretEditor::with_carets("foo bar", &states).unwrap();
    let before = editor.caret_states();
    let version = editor.version();
    let mut engine = CaretSearchEngine::default();

    let outcome = engine
        .execute(
            &mut editor,
            &Pattern::literal("zzz", Direction::Forward),
            &SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll),
        )
        .unwrap();

    assert_eq!(outcome.status, SearchStatus::NoMatch);
    assert_eq!(editor.caret_states(), before);
    assert_eq!(editor.primary_state().position, 4);
    assert_eq!(editor.version(), version);
}

#[test]
fn test_collapse_on_no_match_keeps_primary() {
    let states = [CaretState::at(4), CaretState::at(0)];
    let mut editor = CaretEditor::with_carets("foo bar", &states).unwrap();
    let mut engine = CaretSearchEngine::default();

    let policy = SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll)
        .with_collapse_on_no_match(true);
    let outcome = engine
        .execute(
            &mut editor,
            &Pattern::literal("zzz", Direction::Forward),
            &policy,
        )
        .unwrap();

    assert_eq!(outcome.status, SearchStatus::NoMatch);
    assert_eq!(outcome.removed, 1);
    assert_eq!(positions(&editor), vec![4]);
}

#[test]
fn test_carets_without_match_are_dropped() {
    let mut editor = CaretEditor::with_carets(
        "ab ab\ncd",
        &[CaretState::at(0), CaretState::at(6)],
    )
    .unwrap();
    let mut engine = CaretSearchEngine::default();

    let outcome = engine
        .execute(
            &mut editor,
            &Pattern::literal("ab", Direction::Forward),
            &SearchPolicy::new(Direction::Forward, MatchMode::SingleMatch),
        )
        .unwrap();

    assert_eq!(outcome.removed, 1);
    assert_eq!(positions(&editor), vec![0]);
}

#[test]
fn test_direction_symmetry() {
    let text = "foo bar foo";
    let policy = |direction| SearchPolicy::new(direction, MatchMode::SpawnAll);
    let mut engine = CaretSearchEngine::default();

    let mut forward = CaretEditor::with_carets(text, &[CaretState::at(0)]).unwrap();
    engine
        .execute(
            &mut forward,
            &Pattern::literal("foo", Direction::Forward),
            &policy(Direction::Forward),
        )
        .unwrap();

    let mut backward = CaretEditor::with_carets(text, &[CaretState::at(11)]).unwrap();
    engine
        .execute(
            &mut backward,
            &Pattern::literal("foo", Direction::Backward),
            &policy(Direction::Backward),
        )
        .unwrap();

    assert_eq!(selections(&forward), selections(&backward));
    assert_eq!(positions(&forward), vec![0, 8]);
    assert_eq!(positions(&backward), vec![3, 11]);
    assert_eq!(backward.primary_state().position, 11);
}

#[test]
fn test_backward_regex_with_groups() {
    let mut editor = CaretEditor::with_carets("a1 b22 c333", &[CaretState::at(11)]).unwrap();
    let mut engine = CaretSearchEngine::default();

    engine
        .execute(
            &mut editor,
            &Pattern::new(r"[a-z]([0-9]+)", Direction::Backward),
            &SearchPolicy::new(Direction::Backward, MatchMode::SpawnAll),
        )
        .unwrap();

    assert_eq!(positions(&editor), vec![2, 6, 11]);
    assert_eq!(
        selections(&editor),
        vec![
            Some(TextRange::new(1, 2)),
            Some(TextRange::new(4, 6)),
            Some(TextRange::new(8, 11)),
        ]
    );
}

#[test]
fn test_whitespace_groups_select_the_gap() {
    let mut editor = CaretEditor::with_carets("a   b   c", &[CaretState::at(1)]).unwrap();
    let mut engine = CaretSearchEngine::default();

    engine
        .spawn(
            &mut editor,
            &SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll),
        )
        .unwrap();

    assert_eq!(positions(&editor), vec![4, 8]);
    assert_eq!(
        selections(&editor),
        vec![Some(TextRange::new(1, 4)), Some(TextRange::new(5, 8))]
    );
    assert_eq!(editor.primary_state().position, 4);
}

#[test]
fn test_spawn_onto_dropped_caret_survives() {
    // The caret at 4 finds nothing, but the primary spawns onto its spot.
    let mut editor =
        CaretEditor::with_carets("x;x;yy", &[CaretState::at(0), CaretState::at(4)]).unwrap();
    let mut engine = CaretSearchEngine::default();

    let pattern = Pattern::new("x;", Direction::Forward).with_landing(Landing::SelectionBoundary);
    engine
        .execute(
            &mut editor,
            &pattern,
            &SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll),
        )
        .unwrap();

    assert_eq!(positions(&editor), vec![2, 4]);
    assert_eq!(editor.primary_state().position, 2);
}

#[test]
fn test_caret_to_selection_boundary_policy() {
    let mut editor = CaretEditor::new("foo bar foo");
    let mut engine = CaretSearchEngine::default();

    let policy = SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll)
        .with_caret_to_selection_boundary(true);
    engine
        .execute(&mut editor, &Pattern::literal("foo", Direction::Forward), &policy)
        .unwrap();

    assert_eq!(positions(&editor), vec![3, 11]);
}

#[test]
fn test_line_mode_keeps_each_caret_on_its_line() {
    let text = "a=1 b=2\nc=3 d=4\ne=5";
    let mut editor =
        CaretEditor::with_carets(text, &[CaretState::at(0), CaretState::at(8)]).unwrap();
    let mut engine = CaretSearchEngine::default();

    let policy = SearchPolicy::analyze(&editor, Direction::Forward, MatchMode::SpawnAll);
    assert!(policy.line_mode);
    engine
        .execute(&mut editor, &Pattern::new("=", Direction::Forward), &policy)
        .unwrap();

    assert_eq!(positions(&editor), vec![1, 5, 9, 13]);
}

#[test]
fn test_line_mode_scans_forward_from_the_caret() {
    let mut editor = CaretEditor::with_carets("foo x foo\nbar", &[CaretState::at(4)]).unwrap();
    let mut engine = CaretSearchEngine::default();

    let policy = SearchPolicy::new(Direction::Forward, MatchMode::SingleMatch).with_line_mode(true);
    engine
        .execute(&mut editor, &Pattern::literal("foo", Direction::Forward), &policy)
        .unwrap();

    assert_eq!(positions(&editor), vec![6]);
    assert_eq!(selections(&editor), vec![Some(TextRange::new(6, 9))]);
}

#[test]
fn test_whole_word_spawn_checks_past_neighbouring_caret() {
    // `foo` in `foobar` ends exactly where the next caret's range starts.
    let mut editor =
        CaretEditor::with_carets("foo foobar", &[CaretState::at(0), CaretState::at(7)]).unwrap();
    let mut engine = CaretSearchEngine::default();

    let outcome = engine
        .spawn(
            &mut editor,
            &SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll),
        )
        .unwrap();

    assert_eq!(outcome.status, SearchStatus::Committed);
    assert_eq!(positions(&editor), vec![0]);
    assert_eq!(selections(&editor), vec![Some(TextRange::new(0, 3))]);
}

#[test]
fn test_backward_whole_word_spawn_checks_before_range() {
    // `foo` in `barfoo` starts exactly where the previous caret's range ends.
    let mut editor =
        CaretEditor::with_carets("barfoo foo", &[CaretState::at(10), CaretState::at(3)]).unwrap();
    let mut engine = CaretSearchEngine::default();

    let outcome = engine
        .spawn(
            &mut editor,
            &SearchPolicy::new(Direction::Backward, MatchMode::SpawnAll),
        )
        .unwrap();

    assert_eq!(outcome.status, SearchStatus::Committed);
    assert_eq!(positions(&editor), vec![10]);
    assert_eq!(selections(&editor), vec![Some(TextRange::new(7, 10))]);
}

#[test]
fn test_exact_punctuation_run_checks_past_neighbouring_caret() {
    let mut editor =
        CaretEditor::with_carets(";; ;;;", &[CaretState::at(0), CaretState::at(5)]).unwrap();
    let mut engine = CaretSearchEngine::default();

    engine
        .spawn(
            &mut editor,
            &SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll),
        )
        .unwrap();

    assert_eq!(positions(&editor), vec![0]);
    assert_eq!(selections(&editor), vec![Some(TextRange::new(0, 2))]);
}

#[test]
fn test_invalid_pattern_leaves_carets_alone() {
    let mut editor = CaretEditor::new("foo");
    let before = editor.caret_states();
    let mut engine = CaretSearchEngine::default();

    let result = engine.execute(
        &mut editor,
        &Pattern::new("(foo", Direction::Forward),
        &SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll),
    );

    assert!(matches!(
        result,
        Err(caret_core::CaretError::InvalidPattern { .. })
    ));
    assert_eq!(editor.caret_states(), before);
    assert!(!engine.has_session());
}

#[test]
fn test_case_insensitive_settings() {
    let mut editor = CaretEditor::new("Foo foo FOO");
    let mut engine = CaretSearchEngine::new(SpawnSettings {
        case_sensitive: false,
        ..SpawnSettings::default()
    });

    engine
        .spawn(
            &mut editor,
            &SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll),
        )
        .unwrap();

    assert_eq!(positions(&editor), vec![0, 4, 8]);
}
