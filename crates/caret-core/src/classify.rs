//! Character and identifier-run classification used by pattern inference.

use crate::range::TextRange;

/// Class of the character next to the pattern caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Whitespace, a line break, or the edge of the buffer.
    Whitespace,
    /// A character that can be part of an identifier.
    Identifier,
    /// Anything else.
    Punctuation(char),
}

/// Numeric flavour of an identifier run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    /// `[0-9]+`
    Decimal,
    /// `0[0-7]+`
    Octal,
    /// Decimal directly preceded by a unary `-` or `+`.
    Signed,
    /// Hexadecimal, with or without a `0x` prefix.
    Hex {
        /// The literal carries a `0x`/`0X` prefix.
        prefixed: bool,
    },
}

/// Identifier characters: alphanumerics, `_` and `$`.
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Classify an adjacent character; `None` (buffer edge) counts as whitespace.
pub fn classify_char(c: Option<char>) -> CharClass {
    match c {
        None => CharClass::Whitespace,
        Some(c) if c.is_whitespace() => CharClass::Whitespace,
        Some(c) if is_identifier_char(c) => CharClass::Identifier,
        Some(c) => CharClass::Punctuation(c),
    }
}

/// Maximal run of identifier characters containing `chars[at]`.
///
/// Returns `None` if `chars[at]` is not an identifier character.
pub fn identifier_run(chars: &[char], at: usize) -> Option<TextRange> {
    if !chars.get(at).copied().is_some_and(is_identifier_char) {
        return None;
    }

    let mut start = at;
    while start > 0 && is_identifier_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = at + 1;
    while end < chars.len() && is_identifier_char(chars[end]) {
        end += 1;
    }
    Some(TextRange::new(start, end))
}

/// Maximal run of the character at `chars[at]`.
pub fn same_char_run(chars: &[char], at: usize) -> Option<TextRange> {
    let c = *chars.get(at)?;
    let mut start = at;
    while start > 0 && chars[start - 1] == c {
        start -= 1;
    }
    let mut end = at + 1;
    while end < chars.len() && chars[end] == c {
        end += 1;
    }
    Some(TextRange::new(start, end))
}

/// Decide whether an identifier run is a number.
///
/// `before` holds the two characters preceding the run (nearest first) and decides whether a
/// leading `-`/`+` is a unary sign. Returns `None` for textual runs.
pub fn classify_number(run: &str, before: [Option<char>; 2], hex: bool) -> Option<NumberKind> {
    if run.is_empty() {
        return None;
    }

    if hex
        && let Some(digits) = run.strip_prefix("0x").or_else(|| run.strip_prefix("0X"))
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Some(NumberKind::Hex { prefixed: true });
    }

    if run.chars().all(|c| c.is_ascii_digit()) {
        if run.len() > 1 && run.starts_with('0') && run.chars().all(|c| ('0'..='7').contains(&c))
        {
            return Some(NumberKind::Octal);
        }
        let unary = matches!(before[0], Some('-' | '+'))
            && !before[1].is_some_and(is_identifier_char);
        return Some(if unary {
            NumberKind::Signed
        } else {
            NumberKind::Decimal
        });
    }

    if hex
        && run.chars().all(|c| c.is_ascii_hexdigit())
        && run.chars().any(|c| c.is_ascii_digit())
    {
        return Some(NumberKind::Hex { prefixed: false });
    }

    None
}
