//! Per-invocation search policy.

use serde::{Deserialize, Serialize};

use crate::host::CaretHost;
use crate::pattern::Direction;

/// What happens to each caret's matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Move each caret to its first match; never create carets.
    #[default]
    SingleMatch,
    /// The first match moves the caret, every further match spawns a new caret.
    SpawnAll,
}

/// Flags describing one engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPolicy {
    /// Scan direction.
    pub direction: Direction,
    /// Move or spawn.
    pub mode: MatchMode,
    /// Carets without selection search their whole line.
    pub line_mode: bool,
    /// Carets without selection stop at the end (start) of their line.
    pub single_line: bool,
    /// Land carets on the selection edge away from the scan origin.
    pub caret_to_selection_boundary: bool,
    /// Keep carets whose search range ends up empty in the scan.
    pub want_empty_ranges: bool,
    /// When nothing matches, drop all secondary carets instead of doing nothing.
    pub collapse_on_no_match: bool,
}

impl SearchPolicy {
    /// A policy with every flag off.
    pub fn new(direction: Direction, mode: MatchMode) -> Self {
        Self {
            direction,
            mode,
            ..Self::default()
        }
    }

    /// Derive the range flags from the current caret layout.
    ///
    /// Line mode holds when no two carets share a line; single-line mode holds when no
    /// selection spans more than one line.
    pub fn analyze<H: CaretHost + ?Sized>(host: &H, direction: Direction, mode: MatchMode) -> Self {
        let mut previous_line = None;
        let mut carets_share_line = false;
        let mut multi_line_selection = false;

        for (_, caret) in host.carets() {
            let line = host.line_of(caret.offset);
            if previous_line == Some(line) {
                carets_share_line = true;
            }
            previous_line = Some(line);

            if let Some(selection) = caret.selection.filter(|s| !s.is_empty())
                && host.line_of(selection.start) != host.line_of(selection.end)
            {
                multi_line_selection = true;
            }
        }

        Self {
            line_mode: !carets_share_line,
            single_line: !multi_line_selection,
            ..Self::new(direction, mode)
        }
    }

    /// Builder: set line mode.
    pub fn with_line_mode(mut self, line_mode: bool) -> Self {
        self.line_mode = line_mode;
        self
    }

    /// Builder: set single-line mode.
    pub fn with_single_line(mut self, single_line: bool) -> Self {
        self.single_line = single_line;
        self
    }

    /// Builder: land carets on selection boundaries.
    pub fn with_caret_to_selection_boundary(mut self, enabled: bool) -> Self {
        self.caret_to_selection_boundary = enabled;
        self
    }

    /// Builder: keep empty search ranges.
    pub fn with_empty_ranges(mut self, enabled: bool) -> Self {
        self.want_empty_ranges = enabled;
        self
    }

    /// Builder: collapse to the primary caret when nothing matches.
    pub fn with_collapse_on_no_match(mut self, enabled: bool) -> Self {
        self.collapse_on_no_match = enabled;
        self
    }
}
