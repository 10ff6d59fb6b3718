//! Haystacks for the regex engine: forward or reversed copies of the buffer text with the
//! index mapping needed to translate match positions back into buffer offsets.

use std::cell::OnceCell;

use crate::pattern::Direction;
use crate::range::TextRange;

/// Char offset <-> byte offset table for one string.
#[derive(Debug, Clone)]
pub(crate) struct CharIndex {
    char_to_byte: Vec<usize>,
    text_len: usize,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    pub(crate) fn char_count(&self) -> usize {
        self.char_to_byte.len().saturating_sub(1)
    }

    pub(crate) fn char_to_byte(&self, char_offset: usize) -> usize {
        let clamped = char_offset.min(self.char_count());
        self.char_to_byte
            .get(clamped)
            .copied()
            .unwrap_or(self.text_len)
    }

    pub(crate) fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }
}

/// Translates offsets between buffer coordinates and view coordinates.
///
/// A reversed view of length `n` maps offset `o` to `n - o`; a half-open range `[s, e)` maps to
/// `[n - e, n - s)`. The mapping is its own inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMapper {
    /// View and buffer coordinates coincide.
    Identity,
    /// The view is the buffer read back to front.
    Reversed {
        /// Length of the text in characters.
        len: usize,
    },
}

impl IndexMapper {
    /// Buffer offset to view offset.
    pub fn to_view(&self, offset: usize) -> usize {
        match *self {
            IndexMapper::Identity => offset,
            IndexMapper::Reversed { len } => len.saturating_sub(offset),
        }
    }

    /// View offset to buffer offset.
    pub fn to_buffer(&self, offset: usize) -> usize {
        self.to_view(offset)
    }

    /// Buffer range to view range.
    pub fn range_to_view(&self, range: TextRange) -> TextRange {
        TextRange::new(self.to_view(range.start), self.to_view(range.end))
    }

    /// View range to buffer range.
    pub fn range_to_buffer(&self, range: TextRange) -> TextRange {
        self.range_to_view(range)
    }
}

/// A searchable string plus its index tables.
#[derive(Debug, Clone)]
pub struct TextView {
    text: String,
    index: CharIndex,
    mapper: IndexMapper,
}

impl TextView {
    /// View the text as is.
    pub fn forward(text: String) -> Self {
        let index = CharIndex::new(&text);
        Self {
            text,
            index,
            mapper: IndexMapper::Identity,
        }
    }

    /// View the text back to front.
    pub fn reversed(text: &str) -> Self {
        let reversed: String = text.chars().rev().collect();
        let index = CharIndex::new(&reversed);
        let len = index.char_count();
        Self {
            text: reversed,
            index,
            mapper: IndexMapper::Reversed { len },
        }
    }

    /// The string handed to the regex engine.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len_chars(&self) -> usize {
        self.index.char_count()
    }

    /// Coordinate mapping back to the buffer.
    pub fn mapper(&self) -> IndexMapper {
        self.mapper
    }

    pub(crate) fn char_to_byte(&self, offset: usize) -> usize {
        self.index.char_to_byte(offset)
    }

    pub(crate) fn byte_to_char(&self, offset: usize) -> usize {
        self.index.byte_to_char(offset)
    }
}

/// The buffer text, with the reversed view built on first backward use.
#[derive(Debug)]
pub struct Haystack {
    forward: TextView,
    reversed: OnceCell<TextView>,
}

impl Haystack {
    /// Wrap the full buffer text.
    pub fn new(text: String) -> Self {
        Self {
            forward: TextView::forward(text),
            reversed: OnceCell::new(),
        }
    }

    /// Length in characters.
    pub fn len_chars(&self) -> usize {
        self.forward.len_chars()
    }

    /// The view a search in `direction` runs over.
    pub fn view(&self, direction: Direction) -> &TextView {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => self
                .reversed
                .get_or_init(|| TextView::reversed(self.forward.as_str())),
        }
    }
}
