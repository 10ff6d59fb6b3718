//! Spawning carets example
//!
//! Demonstrates inferred spawning, backward search and an interactive session.

use caret_core::{
    CaretEditor, CaretSearchEngine, CaretState, CommentConfig, Direction, LineCaretFilter,
    MatchMode, SearchPolicy, SpawnSettings, filter_line_carets,
};

fn print_carets(label: &str, editor: &CaretEditor) {
    println!("{label}:");
    for state in editor.caret_states() {
        let primary = if state.position == editor.primary_state().position {
            " (primary)"
        } else {
            ""
        };
        match state.selection() {
            Some(selection) => println!(
                "  caret {}{primary} selecting {:?}",
                state.position,
                editor.buffer().slice(selection)
            ),
            None => println!("  caret {}{primary}", state.position),
        }
    }
    println!();
}

fn main() {
    let text = "let myCount = 0;\n// count the items\nlet count = getCount(items);\n";
    let mut editor = CaretEditor::with_carets(text, &[CaretState::at(4)]).unwrap();
    let mut engine = CaretSearchEngine::new(SpawnSettings {
        smart_prefix: true,
        ..SpawnSettings::default()
    });

    // 1. Spawn on every prefixed/unprefixed variant of the identifier at the caret.
    let policy = SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll);
    let outcome = engine.spawn(&mut editor, &policy).unwrap();
    println!("status: {:?}, spawned {}", outcome.status, outcome.spawned);
    print_carets("after smart-prefix spawn", &editor);
    engine.accept();

    // 2. Drop carets sitting on comment lines.
    filter_line_carets(
        &mut editor,
        engine.guard(),
        &CommentConfig::line("//"),
        LineCaretFilter::KeepSmart,
    )
    .unwrap();
    print_carets("after keeping code lines", &editor);

    // 3. Interactive session: search backward, then refine the pattern.
    let end = editor.buffer().len_chars();
    let mut editor = CaretEditor::with_carets(text, &[CaretState::at(end)]).unwrap();
    let policy = SearchPolicy::new(Direction::Backward, MatchMode::SpawnAll);
    let pattern = caret_core::Pattern::new(r"let\s+", Direction::Backward);
    engine.execute(&mut editor, &pattern, &policy).unwrap();
    print_carets("backward search for `let`", &editor);

    engine.set_pattern(r"\bcount\b").unwrap();
    engine.rerun(&mut editor).unwrap();
    print_carets("rerun with `\\bcount\\b`", &editor);

    engine.cancel(&mut editor).unwrap();
    print_carets("cancelled", &editor);
}
