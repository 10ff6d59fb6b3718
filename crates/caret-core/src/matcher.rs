//! Range-confined directional matching.
//!
//! [`DirectionalMatcher`] yields the matches of a compiled pattern that lie entirely inside one
//! search range, nearest to the scan origin first. Backward matchers run over the reversed
//! text and translate every position back into buffer coordinates, so callers never see view
//! coordinates.
//!
//! The regex runs over the whole text, not a slice of it: lookaround sees past the range edges
//! and `^`/`$`/`\b` are evaluated against the real neighbouring characters.

use onig::{Region, SearchOptions};

use crate::caret::CaretState;
use crate::pattern::{CompiledPattern, Direction, Landing};
use crate::range::TextRange;
use crate::text_view::{Haystack, TextView};

/// One accepted match, in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Where the caret lands.
    pub landing_offset: usize,
    /// Start of the whole match.
    pub start: usize,
    /// Length of the whole match.
    pub length: usize,
    /// Selection start: the group span if the pattern has groups, else the match start.
    pub selection_start: usize,
    /// Selection end.
    pub selection_end: usize,
}

impl Match {
    /// The whole match span.
    pub fn span(&self) -> TextRange {
        TextRange::new(self.start, self.start + self.length)
    }

    /// The selection span.
    pub fn selection(&self) -> TextRange {
        TextRange::new(self.selection_start, self.selection_end)
    }

    /// The caret this match produces.
    pub fn caret_state(&self) -> CaretState {
        CaretState::with_selection(self.landing_offset, self.selection())
    }
}

/// Lazy sequence of matches inside one search range.
pub struct DirectionalMatcher<'a> {
    pattern: &'a CompiledPattern,
    view: &'a TextView,
    direction: Direction,
    landing: Landing,
    /// Search range in view coordinates.
    bounds: TextRange,
    /// Next view offset to search from.
    cursor: usize,
    region: Region,
    done: bool,
}

impl<'a> DirectionalMatcher<'a> {
    /// Match `pattern` inside `range` (buffer coordinates).
    pub fn new(pattern: &'a CompiledPattern, haystack: &'a Haystack, range: TextRange) -> Self {
        let direction = pattern.pattern().direction();
        let view = haystack.view(direction);
        let range = TextRange::new(
            range.start.min(view.len_chars()),
            range.end.min(view.len_chars()),
        );
        let bounds = view.mapper().range_to_view(range);
        Self {
            pattern,
            view,
            direction,
            landing: pattern.pattern().landing(),
            bounds,
            cursor: bounds.start,
            region: Region::new(),
            done: false,
        }
    }

    /// Start again from the scan origin.
    pub fn restart(&mut self) {
        self.cursor = self.bounds.start;
        self.done = false;
    }

    /// Find the next accepted match.
    pub fn next_match(&mut self) -> Option<Match> {
        while !self.done && self.cursor <= self.bounds.end {
            let from = self.view.char_to_byte(self.cursor);
            // Search to the end of the view so lookaround sees past the range edge.
            let to = self.view.as_str().len();
            self.region.clear();

            let found = self.pattern.regex().search_with_options(
                self.view.as_str(),
                from,
                to,
                SearchOptions::SEARCH_OPTION_NONE,
                Some(&mut self.region),
            );
            let Some((byte_start, byte_end)) = found.and_then(|_| self.region.pos(0)) else {
                self.done = true;
                return None;
            };

            let start = self.view.byte_to_char(byte_start);
            let end = self.view.byte_to_char(byte_end);

            if !self.bounds.contains(start, end) {
                if start >= self.bounds.end {
                    self.done = true;
                    return None;
                }
                // Crosses the range end; a later start may still fit.
                self.cursor = start + 1;
                continue;
            }

            self.cursor = if end > start { end } else { end + 1 };
            let found = self.to_buffer(start, end);
            tracing::trace!(
                start = found.start,
                len = found.length,
                landing = found.landing_offset,
                "match"
            );
            return Some(found);
        }

        self.done = true;
        None
    }

    fn to_buffer(&self, start: usize, end: usize) -> Match {
        let mapper = self.view.mapper();
        let span = mapper.range_to_buffer(TextRange::new(start, end));

        let groups = (1..self.region.len())
            .filter_map(|i| self.region.pos(i))
            .map(|(s, e)| TextRange::new(self.view.byte_to_char(s), self.view.byte_to_char(e)))
            .reduce(|a, b| a.include(&b));
        let selection = match groups {
            Some(groups) => mapper.range_to_buffer(groups),
            None => span,
        };

        let landing_offset = match (self.landing, self.direction) {
            (Landing::MatchEdge, Direction::Forward) => span.start,
            (Landing::MatchEdge, Direction::Backward) => span.end,
            (Landing::SelectionBoundary, Direction::Forward) => selection.end,
            (Landing::SelectionBoundary, Direction::Backward) => selection.start,
        };

        Match {
            landing_offset,
            start: span.start,
            length: span.len(),
            selection_start: selection.start,
            selection_end: selection.end,
        }
    }
}

impl Iterator for DirectionalMatcher<'_> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        self.next_match()
    }
}
