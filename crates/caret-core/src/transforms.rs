//! Caret-set transforms that do not search.
//!
//! Each transform runs under the engine's [`CaretGuard`] and as one [`CaretHost::run_atomic`]
//! transaction. They return `Ok(false)` when suppressed or when there was nothing to do.

use std::collections::HashSet;

use caret_core_lang::{CommentConfig, LineKind};

use crate::caret::CaretId;
use crate::error::CaretError;
use crate::guard::CaretGuard;
use crate::host::CaretHost;
use crate::range::TextRange;

/// Which carets [`filter_line_carets`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCaretFilter {
    /// Keep only carets on lines of this kind.
    Keep(LineKind),
    /// Remove carets on lines of this kind.
    Remove(LineKind),
    /// Keep carets on the most significant kind present (code, then comment, then blank).
    KeepSmart,
    /// Remove carets on the most significant kind present (code, then comment, then blank).
    RemoveSmart,
}

impl LineCaretFilter {
    /// Line kinds whose carets go, given the kinds present.
    fn removed_kinds(self, present: &HashSet<LineKind>) -> HashSet<LineKind> {
        const ALL: [LineKind; 3] = [LineKind::Blank, LineKind::Comment, LineKind::Code];
        let significant = || {
            [LineKind::Code, LineKind::Comment, LineKind::Blank]
                .into_iter()
                .find(|kind| present.contains(kind))
        };

        match self {
            Self::Remove(kind) => HashSet::from([kind]),
            Self::Keep(kind) => ALL.into_iter().filter(|k| *k != kind).collect(),
            Self::RemoveSmart => significant().into_iter().collect(),
            Self::KeepSmart => match significant() {
                Some(kind) => ALL.into_iter().filter(|k| *k != kind).collect(),
                None => HashSet::new(),
            },
        }
    }
}

/// Move every caret to the primary caret's column on its own line.
///
/// Columns are clamped to the line length, selections are dropped and carets that end up on the
/// same spot are merged, the primary winning.
pub fn straighten_carets<H: CaretHost>(host: &mut H, guard: &CaretGuard) -> Result<bool, CaretError> {
    let Some(_scope) = guard.enter() else {
        return Ok(false);
    };

    let (primary_id, primary) = host.primary_caret();
    let column = primary.offset - host.line_start(host.line_of(primary.offset));

    let mut order = host.carets();
    order.sort_by_key(|(id, _)| *id != primary_id);

    let targets: Vec<(CaretId, usize)> = order
        .iter()
        .map(|(id, caret)| {
            let line = host.line_of(caret.offset);
            let target = (host.line_start(line) + column).min(host.line_end(line));
            (*id, target)
        })
        .collect();

    tracing::debug!(column, carets = targets.len(), "straightening carets");
    host.run_atomic(|host| {
        let mut taken = HashSet::new();
        for (id, target) in targets {
            if taken.insert(target) {
                host.move_caret(id, target)?;
            } else {
                host.remove_caret(id)?;
            }
        }
        Ok(true)
    })
}

/// Move each caret with a selection to the other end of it, keeping the selection.
pub fn toggle_selection_anchor<H: CaretHost>(
    host: &mut H,
    guard: &CaretGuard,
) -> Result<bool, CaretError> {
    let Some(_scope) = guard.enter() else {
        return Ok(false);
    };

    let flips: Vec<(CaretId, usize, TextRange)> = host
        .carets()
        .into_iter()
        .filter_map(|(id, caret)| {
            let selection = caret.selection.filter(|s| !s.is_empty())?;
            let target = if caret.offset == selection.end {
                selection.start
            } else {
                selection.end
            };
            Some((id, target, selection))
        })
        .collect();
    if flips.is_empty() {
        return Ok(false);
    }

    host.run_atomic(|host| {
        for (id, target, selection) in flips {
            host.move_caret(id, target)?;
            host.set_selection(id, Some(selection))?;
        }
        Ok(true)
    })
}

/// Keep or remove carets by the kind of line they sit on.
///
/// Nothing happens when the filter would remove every caret or none.
pub fn filter_line_carets<H: CaretHost>(
    host: &mut H,
    guard: &CaretGuard,
    comments: &CommentConfig,
    filter: LineCaretFilter,
) -> Result<bool, CaretError> {
    let Some(_scope) = guard.enter() else {
        return Ok(false);
    };

    let classified: Vec<(CaretId, LineKind)> = host
        .carets()
        .into_iter()
        .map(|(id, caret)| {
            let line = host.line_of(caret.offset);
            let text = host.chars_in_range(TextRange::new(
                host.line_start(line),
                host.line_end(line),
            ));
            (id, comments.classify_line(&text))
        })
        .collect();

    let present: HashSet<LineKind> = classified.iter().map(|(_, kind)| *kind).collect();
    let removed = filter.removed_kinds(&present);
    let doomed: Vec<CaretId> = classified
        .iter()
        .filter(|(_, kind)| removed.contains(kind))
        .map(|(id, _)| *id)
        .collect();

    if doomed.is_empty() || doomed.len() == classified.len() {
        tracing::debug!(?filter, "line filter left carets unchanged");
        return Ok(false);
    }

    tracing::debug!(?filter, removed = doomed.len(), "filtering line carets");
    host.run_atomic(|host| {
        for id in doomed {
            host.remove_caret(id)?;
        }
        Ok(true)
    })
}

/// Make the caret `delta` places after the primary (offset order, wrapping) primary.
pub fn cycle_primary<H: CaretHost>(
    host: &mut H,
    guard: &CaretGuard,
    delta: isize,
) -> Result<bool, CaretError> {
    let Some(_scope) = guard.enter() else {
        return Ok(false);
    };

    let carets = host.carets();
    if carets.len() < 2 {
        return Ok(false);
    }
    let (primary_id, _) = host.primary_caret();
    let current = carets
        .iter()
        .position(|(id, _)| *id == primary_id)
        .unwrap_or(0);

    let len = carets.len() as isize;
    let next = (current as isize + delta).rem_euclid(len) as usize;
    if next == current {
        return Ok(false);
    }

    let (next_id, _) = carets[next];
    host.run_atomic(|host| {
        host.set_primary(next_id)?;
        Ok(true)
    })
}
