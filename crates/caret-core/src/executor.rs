//! Per-caret match execution.

use crate::caret::CaretState;
use crate::matcher::DirectionalMatcher;
use crate::policy::MatchMode;

/// What matching did for one source caret.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaretOutcome {
    /// New state of the source caret, or `None` if it had no match and should go.
    pub kept: Option<CaretState>,
    /// Carets to create for the second and later matches.
    pub spawns: Vec<CaretState>,
}

impl CaretOutcome {
    /// Returns `true` if the source caret stays.
    pub fn is_kept(&self) -> bool {
        self.kept.is_some()
    }
}

/// Drive `matcher` to completion for one caret.
///
/// In single-match mode only the first match is consumed. In spawn-all mode every successive
/// match is consumed; the first one becomes the source caret's new state.
pub fn perform(matcher: &mut DirectionalMatcher<'_>, mode: MatchMode) -> CaretOutcome {
    let Some(first) = matcher.next_match() else {
        return CaretOutcome::default();
    };

    let spawns = match mode {
        MatchMode::SingleMatch => Vec::new(),
        MatchMode::SpawnAll => matcher.map(|m| m.caret_state()).collect(),
    };

    CaretOutcome {
        kept: Some(first.caret_state()),
        spawns,
    }
}
