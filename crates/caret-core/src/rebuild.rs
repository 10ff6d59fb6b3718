//! Caret-set rebuilding.
//!
//! A rebuild moves through three phases:
//!
//! 1. **Scanning**: per-caret [`CaretOutcome`]s are recorded. Kept carets are keyed by their
//!    [`CoordinateKey`], so two carets landing on the same spot collapse into one.
//! 2. **Reconciling**: spawn requests are merged into the kept set (a spawn landing on a kept
//!    caret reuses it), the primary caret is chosen, and a [`RebuildPlan`] is produced. The
//!    plan is pure data; nothing has touched the host yet.
//! 3. **Committed**: the plan is written to the host inside one [`CaretHost::run_atomic`]
//!    transaction. Handles are only used inside that transaction; the primary is re-resolved
//!    by key once all carets are in place.

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::caret::{CaretId, CaretState, CoordinateKey};
use crate::error::CaretError;
use crate::executor::CaretOutcome;
use crate::host::CaretHost;

/// Rebuild phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildPhase {
    /// Recording per-caret outcomes.
    Scanning,
    /// A plan has been produced.
    Reconciling,
    /// The plan has been written to the host.
    Committed,
}

/// A caret entering a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceCaret {
    /// Live handle, or `None` for a caret restored from a snapshot.
    pub id: Option<CaretId>,
    /// Pre-operation state.
    pub state: CaretState,
    /// Whether this was the primary caret.
    pub is_primary: bool,
}

/// One caret of the final set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedCaret {
    /// Value identity of the final caret.
    pub key: CoordinateKey,
    /// Final position and selection.
    pub state: CaretState,
    /// The live caret that moves here, or `None` for a spawn.
    pub source: Option<CaretId>,
    /// Matching order, used to break ties.
    pub rank: usize,
}

/// The final caret set, in key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildPlan {
    /// Final carets.
    pub carets: Vec<PlannedCaret>,
    /// Key of the caret that becomes primary.
    pub primary: CoordinateKey,
}

impl RebuildPlan {
    /// Number of carets that did not come from a live source caret.
    pub fn spawned(&self) -> usize {
        self.carets.iter().filter(|c| c.source.is_none()).count()
    }

    /// Plan that puts back `sources` as they were.
    pub fn restore<H: CaretHost + ?Sized>(host: &H, sources: &[SourceCaret]) -> Option<Self> {
        let mut carets: BTreeMap<CoordinateKey, PlannedCaret> = BTreeMap::new();
        let mut primary = None;
        for (rank, source) in sources.iter().enumerate() {
            let key = CoordinateKey::of(host, source.state.position);
            carets.entry(key).or_insert(PlannedCaret {
                key,
                state: source.state,
                source: source.id,
                rank,
            });
            if source.is_primary {
                primary = Some(key);
            }
        }
        let primary = primary.or_else(|| carets.keys().next().copied())?;
        Some(Self {
            carets: carets.into_values().collect(),
            primary,
        })
    }
}

/// Drives one caret-set rebuild.
#[derive(Debug)]
pub struct Rebuilder {
    phase: RebuildPhase,
    sources: Vec<SourceCaret>,
    kept: BTreeMap<CoordinateKey, PlannedCaret>,
    spawns: Vec<(usize, CaretState)>,
    next_rank: usize,
}

impl Rebuilder {
    /// Start scanning `sources` (offset order).
    pub fn new(sources: Vec<SourceCaret>) -> Self {
        Self {
            phase: RebuildPhase::Scanning,
            sources,
            kept: BTreeMap::new(),
            spawns: Vec::new(),
            next_rank: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> RebuildPhase {
        self.phase
    }

    /// The carets being rebuilt.
    pub fn sources(&self) -> &[SourceCaret] {
        &self.sources
    }

    /// Record the outcome for `sources[index]`.
    pub fn record<H: CaretHost + ?Sized>(&mut self, host: &H, index: usize, outcome: CaretOutcome) {
        debug_assert_eq!(self.phase, RebuildPhase::Scanning);
        let source_id = self.sources.get(index).and_then(|s| s.id);

        if let Some(state) = outcome.kept {
            let key = CoordinateKey::of(host, state.position);
            let rank = self.bump_rank();
            self.kept.entry(key).or_insert(PlannedCaret {
                key,
                state,
                source: source_id,
                rank,
            });
        }
        for state in outcome.spawns {
            let rank = self.bump_rank();
            self.spawns.push((rank, state));
        }
    }

    /// Returns `true` if no caret matched anything.
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty() && self.spawns.is_empty()
    }

    /// Produce the final caret set.
    ///
    /// Returns `None` when the caret set must stay as it is: nothing matched and
    /// `collapse_on_no_match` is off, or there is nothing left to collapse.
    pub fn reconcile<H: CaretHost + ?Sized>(
        &mut self,
        host: &H,
        collapse_on_no_match: bool,
    ) -> Option<RebuildPlan> {
        self.phase = RebuildPhase::Reconciling;

        if self.is_empty() {
            if !collapse_on_no_match || self.sources.len() <= 1 {
                return None;
            }
            let primary = self
                .sources
                .iter()
                .find(|s| s.is_primary)
                .or(self.sources.first())
                .copied()?;
            return RebuildPlan::restore(host, &[primary]);
        }

        for (rank, state) in std::mem::take(&mut self.spawns) {
            let key = CoordinateKey::of(host, state.position);
            self.kept.entry(key).or_insert(PlannedCaret {
                key,
                state,
                source: None,
                rank,
            });
        }

        let carets: Vec<PlannedCaret> = std::mem::take(&mut self.kept).into_values().collect();
        let primary = self.choose_primary(&carets)?;
        Some(RebuildPlan { carets, primary })
    }

    /// Write `plan` to the host as one transaction.
    pub fn commit<H: CaretHost>(&mut self, host: &mut H, plan: &RebuildPlan) -> Result<(), CaretError> {
        host.run_atomic(|host| apply_plan(host, plan))?;
        self.phase = RebuildPhase::Committed;
        Ok(())
    }

    fn bump_rank(&mut self) -> usize {
        let rank = self.next_rank;
        self.next_rank += 1;
        rank
    }

    /// The old primary's own caret if it survived, else the caret nearest the old primary.
    fn choose_primary(&self, carets: &[PlannedCaret]) -> Option<CoordinateKey> {
        let old = self.sources.iter().find(|s| s.is_primary);

        if let Some(id) = old.and_then(|s| s.id)
            && let Some(own) = carets.iter().find(|c| c.source == Some(id))
        {
            return Some(own.key);
        }

        let origin = old.map(|s| s.state.position).unwrap_or(0);
        carets
            .iter()
            .min_by_key(|c| (c.state.position.abs_diff(origin), c.rank))
            .map(|c| c.key)
    }
}

/// Make the host's caret set equal to `plan`.
///
/// Live carets named as sources move first, then unclaimed live carets are recycled onto
/// spawn targets, then any remaining spawns are added and leftover carets removed.
pub(crate) fn apply_plan<H: CaretHost>(host: &mut H, plan: &RebuildPlan) -> Result<(), CaretError> {
    let live = host.carets();
    let old_primary = host.primary_caret().0;
    let claimed: HashSet<CaretId> = plan.carets.iter().filter_map(|c| c.source).collect();

    let mut recycled: VecDeque<CaretId> = live
        .iter()
        .map(|(id, _)| *id)
        .filter(|id| !claimed.contains(id))
        .collect();
    if let Some(pos) = recycled.iter().position(|id| *id == old_primary) {
        recycled.remove(pos);
        recycled.push_front(old_primary);
    }

    for planned in &plan.carets {
        if let Some(id) = planned.source {
            apply_state(host, id, &planned.state)?;
        }
    }

    let mut fresh = Vec::new();
    for planned in plan.carets.iter().filter(|c| c.source.is_none()) {
        match recycled.pop_front() {
            Some(id) => apply_state(host, id, &planned.state)?,
            None => fresh.push(planned),
        }
    }
    for planned in fresh {
        if host
            .add_caret(planned.state.position, planned.state.selection())?
            .is_none()
        {
            tracing::trace!(offset = planned.state.position, "spawn reused existing caret");
        }
    }
    for id in recycled {
        host.remove_caret(id)?;
    }

    let primary = host
        .carets()
        .into_iter()
        .find(|(_, caret)| CoordinateKey::of(&*host, caret.offset) == plan.primary)
        .map(|(id, _)| id);
    if let Some(id) = primary {
        host.set_primary(id)?;
    }
    Ok(())
}

fn apply_state<H: CaretHost>(host: &mut H, id: CaretId, state: &CaretState) -> Result<(), CaretError> {
    host.move_caret(id, state.position)?;
    host.set_selection(id, state.selection())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::CaretEditor;

    fn sources(editor: &CaretEditor) -> Vec<SourceCaret> {
        editor
            .carets()
            .into_iter()
            .map(|(id, caret)| SourceCaret {
                id: Some(id),
                state: CaretState::from_caret(&caret),
                is_primary: caret.is_primary,
            })
            .collect()
    }

    fn kept(position: usize) -> CaretOutcome {
        CaretOutcome {
            kept: Some(CaretState::at(position)),
            spawns: Vec::new(),
        }
    }

    #[test]
    fn test_phases() {
        let mut editor = CaretEditor::new("abc abc");
        let mut rebuilder = Rebuilder::new(sources(&editor));
        assert_eq!(rebuilder.phase(), RebuildPhase::Scanning);

        rebuilder.record(&editor, 0, kept(4));
        let plan = rebuilder.reconcile(&editor, false).unwrap();
        assert_eq!(rebuilder.phase(), RebuildPhase::Reconciling);

        rebuilder.commit(&mut editor, &plan).unwrap();
        assert_eq!(rebuilder.phase(), RebuildPhase::Committed);
        assert_eq!(editor.caret_states(), vec![CaretState::at(4)]);
    }

    #[test]
    fn test_spawn_on_kept_caret_is_reused() {
        let editor =
            CaretEditor::with_carets("aaaaaaaa", &[CaretState::at(0), CaretState::at(4)]).unwrap();
        let mut rebuilder = Rebuilder::new(sources(&editor));

        rebuilder.record(
            &editor,
            0,
            CaretOutcome {
                kept: Some(CaretState::at(1)),
                spawns: vec![CaretState::at(6)],
            },
        );
        rebuilder.record(&editor, 1, kept(6));

        let plan = rebuilder.reconcile(&editor, false).unwrap();
        assert_eq!(plan.carets.len(), 2);
        assert_eq!(plan.spawned(), 0);
        assert_eq!(plan.carets[1].source, sources(&editor)[1].id);
    }

    #[test]
    fn test_no_match_is_noop_unless_collapsing() {
        let editor =
            CaretEditor::with_carets("abc", &[CaretState::at(0), CaretState::at(2)]).unwrap();

        let mut rebuilder = Rebuilder::new(sources(&editor));
        rebuilder.record(&editor, 0, CaretOutcome::default());
        rebuilder.record(&editor, 1, CaretOutcome::default());
        assert_eq!(rebuilder.reconcile(&editor, false), None);

        let mut rebuilder = Rebuilder::new(sources(&editor));
        let plan = rebuilder.reconcile(&editor, true).unwrap();
        assert_eq!(plan.carets.len(), 1);
        assert_eq!(plan.carets[0].state, CaretState::at(0));
    }

    #[test]
    fn test_primary_falls_back_to_nearest() {
        let editor = CaretEditor::with_carets(
            "0123456789",
            &[CaretState::at(5), CaretState::at(0), CaretState::at(9)],
        )
        .unwrap();
        let all = sources(&editor);
        let mut rebuilder = Rebuilder::new(all.clone());

        // Primary (offset 5) finds nothing; the others land at 3 and 7.
        rebuilder.record(&editor, 0, kept(3));
        rebuilder.record(&editor, 1, CaretOutcome::default());
        rebuilder.record(&editor, 2, kept(7));

        let plan = rebuilder.reconcile(&editor, false).unwrap();
        assert_eq!(plan.primary, CoordinateKey { line: 0, column: 3 });
    }
}
