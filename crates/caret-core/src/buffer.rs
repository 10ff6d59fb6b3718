//! Rope-backed text storage with line/offset conversion.
//!
//! All offsets are character (Unicode scalar value) offsets, matching the offsets carets use.

use ropey::Rope;

use crate::caret::Position;
use crate::error::CaretError;
use crate::range::TextRange;

/// Text buffer addressed by character offsets.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

impl TextBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build a buffer from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Total number of characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns `true` if the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Number of lines (an empty buffer has one line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line number containing `offset` (clamped to the buffer).
    pub fn line_of(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    /// Offset of the first character of `line` (clamped to the last line).
    pub fn line_start(&self, line: usize) -> usize {
        let line = line.min(self.rope.len_lines().saturating_sub(1));
        self.rope.line_to_char(line)
    }

    /// Offset just past the last character of `line`, before its line terminator.
    pub fn line_end(&self, line: usize) -> usize {
        let line = line.min(self.rope.len_lines().saturating_sub(1));
        let start = self.rope.line_to_char(line);
        let slice = self.rope.line(line);

        let mut len = slice.len_chars();
        while len > 0 && is_line_break(slice.char(len - 1)) {
            len -= 1;
        }
        start + len
    }

    /// Range of `line` without its terminator.
    pub fn line_range(&self, line: usize) -> TextRange {
        TextRange::new(self.line_start(line), self.line_end(line))
    }

    /// Text of `line` without its terminator.
    pub fn line_text(&self, line: usize) -> String {
        self.slice(self.line_range(line))
    }

    /// Character at `offset`, if any.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.rope.len_chars()).then(|| self.rope.char(offset))
    }

    /// Text inside `range` (clamped to the buffer).
    pub fn slice(&self, range: TextRange) -> String {
        let len = self.rope.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len);
        self.rope.slice(start..end).to_string()
    }

    /// Full text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Convert a character offset into a line/column position.
    pub fn position_of(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        Position::new(line, offset - self.rope.line_to_char(line))
    }

    /// Convert a position into a character offset; the column is clamped to the line end.
    pub fn offset_of(&self, position: Position) -> usize {
        if position.line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        let start = self.line_start(position.line);
        let end = self.line_end(position.line);
        (start + position.column).min(end)
    }

    /// Insert `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), CaretError> {
        self.check_offset(offset)?;
        self.rope.insert(offset, text);
        Ok(())
    }

    /// Remove the characters in `range`.
    pub fn remove(&mut self, range: TextRange) -> Result<(), CaretError> {
        self.check_offset(range.end)?;
        self.rope.remove(range.start..range.end);
        Ok(())
    }

    fn check_offset(&self, offset: usize) -> Result<(), CaretError> {
        let len = self.rope.len_chars();
        if offset > len {
            return Err(CaretError::OffsetOutOfBounds { offset, len });
        }
        Ok(())
    }
}
