//! Pattern inference from the text next to a caret.
//!
//! The character adjacent to the caret in the scan direction picks the strategy:
//!
//! | adjacent character | pattern                                                    |
//! |--------------------|------------------------------------------------------------|
//! | whitespace / edge  | the gap plus the next token; caret lands between them      |
//! | identifier         | the whole identifier (or any number of a compatible base)  |
//! | punctuation        | a run of that character                                    |

use crate::caret::Caret;
use crate::classify::{
    CharClass, NumberKind, classify_char, classify_number, identifier_run, same_char_run,
};
use crate::error::CaretError;
use crate::host::CaretHost;
use crate::pattern::{Direction, Landing, Pattern};
use crate::policy::MatchMode;
use crate::range::TextRange;
use crate::settings::SpawnSettings;

/// Identifier start/end assertions; `$` counts as an identifier character.
const WORD_START: &str = r"(?<![\w$])";
const WORD_END: &str = r"(?![\w$])";

/// Infer a pattern from the text next to `caret`.
///
/// Returns `Err(CaretError::DegenerateClassification)` when the adjacent character cannot
/// seed a pattern.
pub fn try_infer<H: CaretHost + ?Sized>(
    host: &H,
    caret: &Caret,
    direction: Direction,
    mode: MatchMode,
    settings: &SpawnSettings,
) -> Result<Pattern, CaretError> {
    let offset = caret.offset.min(host.len_chars());
    let line = host.line_of(offset);
    let line_range = TextRange::new(host.line_start(line), host.line_end(line));
    let chars: Vec<char> = host.chars_in_range(line_range).chars().collect();
    let column = offset.saturating_sub(line_range.start);

    let adjacent = match direction {
        Direction::Forward => Some(column),
        Direction::Backward => column.checked_sub(1),
    }
    .filter(|&i| i < chars.len());

    let class = classify_char(adjacent.map(|i| chars[i]));
    let pattern = match (class, adjacent) {
        (CharClass::Whitespace, _) | (_, None) => whitespace_pattern(direction),
        (CharClass::Identifier, Some(at)) => identifier_pattern(&chars, at, direction, settings),
        (CharClass::Punctuation(c), Some(at)) => {
            if c.is_control() {
                return Err(CaretError::DegenerateClassification(c));
            }
            punctuation_pattern(&chars, at, c, direction, mode)
        }
    };

    tracing::debug!(
        offset,
        ?direction,
        pattern = pattern.source(),
        "inferred pattern"
    );
    Ok(pattern.with_case_sensitive(settings.case_sensitive))
}

/// [`try_infer`], with degenerate input reduced to `None`.
pub fn infer<H: CaretHost + ?Sized>(
    host: &H,
    caret: &Caret,
    direction: Direction,
    mode: MatchMode,
    settings: &SpawnSettings,
) -> Option<Pattern> {
    match try_infer(host, caret, direction, mode, settings) {
        Ok(pattern) => Some(pattern),
        Err(err) => {
            tracing::debug!(error = %err, "no pattern inferred");
            None
        }
    }
}

fn whitespace_pattern(direction: Direction) -> Pattern {
    let source = match direction {
        Direction::Forward => r"(\s+)\S+",
        Direction::Backward => r"\S+(\s+)",
    };
    Pattern::new(source, direction).with_landing(Landing::SelectionBoundary)
}

fn identifier_pattern(
    chars: &[char],
    at: usize,
    direction: Direction,
    settings: &SpawnSettings,
) -> Pattern {
    let run = identifier_run(chars, at).unwrap_or(TextRange::new(at, at + 1));
    let text: String = chars[run.start..run.end].iter().collect();
    let before = [
        run.start.checked_sub(1).map(|i| chars[i]),
        run.start.checked_sub(2).map(|i| chars[i]),
    ];

    let number = settings
        .numeric_enabled()
        .then(|| classify_number(&text, before, settings.hex_search))
        .flatten();

    let body = match number {
        Some(kind) => numeric_body(kind).to_string(),
        None if settings.smart_prefix => smart_prefix_body(&text, &settings.prefix_pattern)
            .unwrap_or_else(|| regex::escape(&text)),
        None => regex::escape(&text),
    };

    Pattern::new(format!("{WORD_START}(?:{body}){WORD_END}"), direction)
}

fn numeric_body(kind: NumberKind) -> &'static str {
    match kind {
        NumberKind::Decimal => "[0-9]+",
        NumberKind::Signed => "[-+]?[0-9]+",
        NumberKind::Octal => "0[0-7]+",
        NumberKind::Hex { prefixed: true } => "0[xX][0-9a-fA-F]+",
        NumberKind::Hex { prefixed: false } => "[0-9a-fA-F]*[0-9][0-9a-fA-F]*",
    }
}

/// `(?:PREFIXES)Stem|stem` for a camel-case identifier, with any leading prefix stripped.
///
/// A prefix only counts when an uppercase letter follows it, so `island` keeps its `is`.
fn smart_prefix_body(text: &str, prefixes: &str) -> Option<String> {
    if prefixes.is_empty() {
        return None;
    }

    let detector = match onig::Regex::new(&format!(r"\A(?:{prefixes})(?=\p{{Lu}})")) {
        Ok(detector) => detector,
        Err(err) => {
            tracing::warn!(prefixes, error = %err, "invalid prefix pattern");
            return None;
        }
    };
    let stem = match detector.find(text) {
        Some((_, end)) => &text[end..],
        None => text,
    };

    let mut rest = stem.chars();
    let first = rest.next().filter(|c| c.is_alphabetic())?;
    let rest = rest.as_str();
    let upper: String = first.to_uppercase().chain(rest.chars()).collect();
    let lower: String = first.to_lowercase().chain(rest.chars()).collect();

    Some(format!(
        "(?:{prefixes}){}|{}",
        regex::escape(&upper),
        regex::escape(&lower)
    ))
}

fn punctuation_pattern(
    chars: &[char],
    at: usize,
    c: char,
    direction: Direction,
    mode: MatchMode,
) -> Pattern {
    let escaped = regex::escape(&c.to_string());
    let source = match mode {
        MatchMode::SingleMatch => format!("{escaped}+"),
        MatchMode::SpawnAll => {
            let run = same_char_run(chars, at).map_or(1, |r| r.len());
            format!("(?<!{escaped}){escaped}{{{run}}}(?!{escaped})")
        }
    };
    Pattern::new(source, direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caret::CaretState;
    use crate::editor::CaretEditor;

    fn infer_at(text: &str, offset: usize, direction: Direction, settings: &SpawnSettings) -> Pattern {
        let editor = CaretEditor::with_carets(text, &[CaretState::at(offset)]).unwrap();
        let caret = editor.primary_caret().1;
        try_infer(&editor, &caret, direction, MatchMode::SpawnAll, settings).unwrap()
    }

    #[test]
    fn test_whitespace_patterns() {
        let settings = SpawnSettings::default();
        let forward = infer_at("a   b", 1, Direction::Forward, &settings);
        assert_eq!(forward.source(), r"(\s+)\S+");
        assert_eq!(forward.landing(), Landing::SelectionBoundary);

        let backward = infer_at("a   b", 4, Direction::Backward, &settings);
        assert_eq!(backward.source(), r"\S+(\s+)");

        // End of line counts as whitespace.
        let eol = infer_at("ab\ncd", 2, Direction::Forward, &settings);
        assert_eq!(eol.source(), r"(\s+)\S+");
    }

    #[test]
    fn test_identifier_literal() {
        let settings = SpawnSettings::default();
        let pattern = infer_at("let foo.bar = 1", 5, Direction::Forward, &settings);
        assert_eq!(pattern.source(), r"(?<![\w$])(?:foo)(?![\w$])");

        let backward = infer_at("let foo.bar = 1", 7, Direction::Backward, &settings);
        assert_eq!(backward.source(), r"(?<![\w$])(?:foo)(?![\w$])");
    }

    #[test]
    fn test_numeric_patterns() {
        let settings = SpawnSettings {
            hex_search: true,
            ..SpawnSettings::default()
        };
        let octal = infer_at("x = 0755;", 5, Direction::Forward, &settings);
        assert_eq!(octal.source(), r"(?<![\w$])(?:0[0-7]+)(?![\w$])");

        let hex = infer_at("x = 0xFF;", 4, Direction::Forward, &settings);
        assert_eq!(hex.source(), r"(?<![\w$])(?:0[xX][0-9a-fA-F]+)(?![\w$])");

        let signed = infer_at("x = -12;", 5, Direction::Forward, &settings);
        assert_eq!(signed.source(), r"(?<![\w$])(?:[-+]?[0-9]+)(?![\w$])");

        let plain = infer_at("x = 12;", 4, Direction::Forward, &SpawnSettings::default());
        assert_eq!(plain.source(), r"(?<![\w$])(?:12)(?![\w$])");
    }

    #[test]
    fn test_smart_prefix_body() {
        assert_eq!(
            smart_prefix_body("myCountOfItems", "my|get|is").as_deref(),
            Some("(?:my|get|is)CountOfItems|countOfItems")
        );
        assert_eq!(
            smart_prefix_body("countOfItems", "my|get|is").as_deref(),
            Some("(?:my|get|is)CountOfItems|countOfItems")
        );
        assert_eq!(
            smart_prefix_body("island", "my|get|is").as_deref(),
            Some("(?:my|get|is)Island|island")
        );
        assert_eq!(smart_prefix_body("_tmp", "my"), None);
        assert_eq!(smart_prefix_body("count", "(my"), None);
    }

    #[test]
    fn test_punctuation_patterns() {
        let editor = CaretEditor::with_carets("a == b", &[CaretState::at(2)]).unwrap();
        let caret = editor.primary_caret().1;
        let settings = SpawnSettings::default();

        let exact = try_infer(&editor, &caret, Direction::Forward, MatchMode::SpawnAll, &settings)
            .unwrap();
        assert_eq!(exact.source(), "(?<!=)={2}(?!=)");

        let greedy =
            try_infer(&editor, &caret, Direction::Forward, MatchMode::SingleMatch, &settings)
                .unwrap();
        assert_eq!(greedy.source(), "=+");
    }

    #[test]
    fn test_control_character_is_degenerate() {
        let editor = CaretEditor::with_carets("a\u{1}b", &[CaretState::at(1)]).unwrap();
        let caret = editor.primary_caret().1;
        let result = try_infer(
            &editor,
            &caret,
            Direction::Forward,
            MatchMode::SpawnAll,
            &SpawnSettings::default(),
        );
        assert_eq!(result, Err(CaretError::DegenerateClassification('\u{1}')));
    }
}
