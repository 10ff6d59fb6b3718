//! The caret search engine.
//!
//! [`CaretSearchEngine`] ties the pieces together:
//!
//! ```text
//! infer ──► compile ──► partition ──► match per caret ──► reconcile ──► commit
//!  (4.1)                 (ranges)      (executor)          (plan)        (run_atomic)
//! ```
//!
//! Every invocation runs under the engine's [`CaretGuard`]; a call made while another one is
//! in flight returns [`SearchStatus::Suppressed`] without touching the host. Invalid patterns
//! are reported before any caret moves, and a failure while committing rolls the whole caret
//! set back.
//!
//! # Interactive sessions
//!
//! [`CaretSearchEngine::execute`] and [`CaretSearchEngine::spawn`] remember the caret set they
//! started from. While that session is open, [`CaretSearchEngine::set_pattern`] followed by
//! [`CaretSearchEngine::rerun`] replays the search from the same starting carets with a new
//! pattern, [`CaretSearchEngine::cancel`] puts the starting carets back,
//! [`CaretSearchEngine::accept_not_found`] puts back only the starting carets that found nothing
//! and [`CaretSearchEngine::accept`] keeps the current ones.
//!
//! # Example
//!
//! ```rust
//! use caret_core::{
//!     CaretEditor, CaretSearchEngine, Direction, MatchMode, Pattern, SearchPolicy, SearchStatus,
//! };
//!
//! let mut editor = CaretEditor::new("foo bar foo baz foo");
//! let mut engine = CaretSearchEngine::default();
//!
//! let policy = SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll);
//! let pattern = Pattern::literal("foo", Direction::Forward);
//! let outcome = engine.execute(&mut editor, &pattern, &policy).unwrap();
//!
//! assert_eq!(outcome.status, SearchStatus::Committed);
//! let offsets: Vec<usize> = outcome.carets.iter().map(|c| c.offset).collect();
//! assert_eq!(offsets, vec![0, 8, 16]);
//! ```

use std::collections::HashSet;

use crate::caret::{Caret, CaretState, CoordinateKey};
use crate::error::CaretError;
use crate::executor::{CaretOutcome, perform};
use crate::guard::CaretGuard;
use crate::host::CaretHost;
use crate::inference;
use crate::matcher::DirectionalMatcher;
use crate::partition::{partition, scan_range};
use crate::pattern::{CompiledPattern, Direction, Landing, Pattern};
use crate::policy::{MatchMode, SearchPolicy};
use crate::range::TextRange;
use crate::rebuild::{RebuildPlan, Rebuilder, SourceCaret, apply_plan};
use crate::settings::SpawnSettings;
use crate::text_view::Haystack;

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// At least one caret matched and the new caret set was committed.
    Committed,
    /// Nothing matched.
    NoMatch,
    /// No pattern could be inferred.
    NoPattern,
    /// Another invocation was already running.
    Suppressed,
}

/// Result of one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// How the invocation ended.
    pub status: SearchStatus,
    /// Source carets that stayed (moved onto their first match).
    pub kept: usize,
    /// Carets created for further matches.
    pub spawned: usize,
    /// Source carets that were removed.
    pub removed: usize,
    /// The host's carets after the invocation, in offset order.
    pub carets: Vec<Caret>,
}

impl SearchOutcome {
    fn untouched<H: CaretHost + ?Sized>(status: SearchStatus, host: &H) -> Self {
        Self {
            status,
            kept: 0,
            spawned: 0,
            removed: 0,
            carets: current_carets(host),
        }
    }
}

#[derive(Debug, Clone)]
struct SearchSession {
    start: Vec<SourceCaret>,
    policy: SearchPolicy,
    /// Keys of starting carets that matched, and of every caret the last run produced.
    matched: HashSet<CoordinateKey>,
}

/// Pattern-driven caret search engine.
#[derive(Debug, Default)]
pub struct CaretSearchEngine {
    settings: SpawnSettings,
    guard: CaretGuard,
    pattern: Option<Pattern>,
    session: Option<SearchSession>,
}

impl CaretSearchEngine {
    /// Create an engine with the given settings.
    pub fn new(settings: SpawnSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Current settings.
    pub fn settings(&self) -> &SpawnSettings {
        &self.settings
    }

    /// Mutable settings.
    pub fn settings_mut(&mut self) -> &mut SpawnSettings {
        &mut self.settings
    }

    /// The re-entrancy guard; clone it into host listeners.
    pub fn guard(&self) -> &CaretGuard {
        &self.guard
    }

    /// Infer a pattern from the text next to `caret`.
    pub fn infer<H: CaretHost + ?Sized>(
        &self,
        host: &H,
        caret: &Caret,
        direction: Direction,
        mode: MatchMode,
    ) -> Option<Pattern> {
        inference::infer(host, caret, direction, mode, &self.settings)
    }

    /// Infer a pattern from the primary caret and execute it.
    pub fn spawn<H: CaretHost>(
        &mut self,
        host: &mut H,
        policy: &SearchPolicy,
    ) -> Result<SearchOutcome, CaretError> {
        if self.guard.is_guarded() {
            return Ok(SearchOutcome::untouched(SearchStatus::Suppressed, &*host));
        }

        let (_, primary) = host.primary_caret();
        match self.infer(&*host, &primary, policy.direction, policy.mode) {
            Some(pattern) => self.execute(host, &pattern, policy),
            None => Ok(SearchOutcome::untouched(SearchStatus::NoPattern, &*host)),
        }
    }

    /// Search every caret's range with `pattern` and rebuild the caret set.
    ///
    /// The policy's direction overrides the pattern's. Starts a new session.
    pub fn execute<H: CaretHost>(
        &mut self,
        host: &mut H,
        pattern: &Pattern,
        policy: &SearchPolicy,
    ) -> Result<SearchOutcome, CaretError> {
        let Some(_scope) = self.guard.enter() else {
            tracing::debug!("caret search suppressed: already running");
            return Ok(SearchOutcome::untouched(SearchStatus::Suppressed, &*host));
        };

        let compiled = effective_pattern(pattern, policy).compile()?;
        let sources = current_sources(host);
        tracing::debug!(
            pattern = pattern.source(),
            direction = ?policy.direction,
            mode = ?policy.mode,
            carets = sources.len(),
            "caret search"
        );

        self.pattern = Some(pattern.clone().with_direction(policy.direction));
        self.session = Some(SearchSession {
            start: sources.clone(),
            policy: *policy,
            matched: HashSet::new(),
        });

        let (mut outcome, matched) =
            host.run_atomic(|host| search(host, &compiled, policy, sources))?;
        if let Some(session) = self.session.as_mut() {
            session.matched = matched;
        }
        outcome.carets = current_carets(host);
        Ok(outcome)
    }

    /// The current session pattern text.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Pattern::source)
    }

    /// Replace the session pattern after validating it.
    ///
    /// Nothing changes if `text` does not compile.
    pub fn set_pattern(&mut self, text: &str) -> Result<(), CaretError> {
        let (direction, case_sensitive, landing) = match &self.pattern {
            Some(p) => (p.direction(), p.is_case_sensitive(), p.landing()),
            None => (
                self.session
                    .as_ref()
                    .map(|s| s.policy.direction)
                    .unwrap_or_default(),
                self.settings.case_sensitive,
                Landing::MatchEdge,
            ),
        };
        let pattern = Pattern::new(text, direction)
            .with_case_sensitive(case_sensitive)
            .with_landing(landing);
        pattern.compile()?;
        self.pattern = Some(pattern);
        Ok(())
    }

    /// Returns `true` while a session is open.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Re-run the session pattern from the session's starting carets.
    ///
    /// Restoring and searching happen in one transaction. If the pattern now matches nothing
    /// the starting carets are left in place.
    pub fn rerun<H: CaretHost>(&mut self, host: &mut H) -> Result<SearchOutcome, CaretError> {
        let session = self.session.clone().ok_or(CaretError::NoSession)?;
        let pattern = self.pattern.clone().ok_or(CaretError::NoSession)?;

        let Some(_scope) = self.guard.enter() else {
            return Ok(SearchOutcome::untouched(SearchStatus::Suppressed, &*host));
        };
        let compiled = effective_pattern(&pattern, &session.policy).compile()?;
        tracing::debug!(pattern = pattern.source(), "re-running caret search");

        let (mut outcome, matched) = host.run_atomic(|host| {
            restore_sources(host, &session.start)?;
            let sources = current_sources(host);
            search(host, &compiled, &session.policy, sources)
        })?;
        if let Some(session) = self.session.as_mut() {
            session.matched = matched;
        }
        outcome.carets = current_carets(host);
        Ok(outcome)
    }

    /// Put the session's starting carets back and close the session.
    pub fn cancel<H: CaretHost>(&mut self, host: &mut H) -> Result<(), CaretError> {
        let session = self.session.take().ok_or(CaretError::NoSession)?;
        let _scope = self.guard.scope();
        host.run_atomic(|host| restore_sources(host, &session.start))
    }

    /// Replace the carets with the starting carets that found no match, and close the session.
    ///
    /// Returns how many carets were put back. When every starting caret matched, the current
    /// carets stay and `0` is returned.
    pub fn accept_not_found<H: CaretHost>(&mut self, host: &mut H) -> Result<usize, CaretError> {
        let session = self.session.take().ok_or(CaretError::NoSession)?;
        let unmatched: Vec<SourceCaret> = session
            .start
            .iter()
            .filter(|s| !session.matched.contains(&CoordinateKey::of(&*host, s.state.position)))
            .copied()
            .collect();
        if unmatched.is_empty() {
            tracing::debug!("every starting caret matched; carets unchanged");
            return Ok(0);
        }

        let _scope = self.guard.scope();
        tracing::debug!(carets = unmatched.len(), "restoring carets without a match");
        host.run_atomic(|host| restore_sources(host, &unmatched))?;
        Ok(unmatched.len())
    }

    /// Keep the current carets and close the session.
    pub fn accept(&mut self) {
        self.session = None;
    }
}

fn effective_pattern(pattern: &Pattern, policy: &SearchPolicy) -> Pattern {
    let pattern = pattern.clone().with_direction(policy.direction);
    if policy.caret_to_selection_boundary {
        pattern.with_landing(Landing::SelectionBoundary)
    } else {
        pattern
    }
}

fn current_sources<H: CaretHost + ?Sized>(host: &H) -> Vec<SourceCaret> {
    host.carets()
        .into_iter()
        .map(|(id, caret)| SourceCaret {
            id: Some(id),
            state: CaretState::from_caret(&caret),
            is_primary: caret.is_primary,
        })
        .collect()
}

fn current_carets<H: CaretHost + ?Sized>(host: &H) -> Vec<Caret> {
    host.carets().into_iter().map(|(_, caret)| caret).collect()
}

fn restore_sources<H: CaretHost>(host: &mut H, start: &[SourceCaret]) -> Result<(), CaretError> {
    let detached: Vec<SourceCaret> = start
        .iter()
        .map(|s| SourceCaret { id: None, ..*s })
        .collect();
    match RebuildPlan::restore(&*host, &detached) {
        Some(plan) => apply_plan(host, &plan),
        None => Ok(()),
    }
}

/// Scan, reconcile and apply; runs inside the caller's transaction.
///
/// Also returns the keys of the source carets that matched and of every resulting caret.
fn search<H: CaretHost>(
    host: &mut H,
    compiled: &CompiledPattern,
    policy: &SearchPolicy,
    sources: Vec<SourceCaret>,
) -> Result<(SearchOutcome, HashSet<CoordinateKey>), CaretError> {
    let carets: Vec<Caret> = sources
        .iter()
        .map(|s| Caret {
            offset: s.state.position,
            selection: s.state.selection(),
            is_primary: s.is_primary,
        })
        .collect();
    let ranges = partition(&*host, &carets, policy);
    let haystack = Haystack::new(host.chars_in_range(TextRange::new(0, host.len_chars())));

    let source_count = sources.len();
    let mut matched_keys = HashSet::new();
    let mut rebuilder = Rebuilder::new(sources);
    for (index, (range, caret)) in ranges.into_iter().zip(&carets).enumerate() {
        let outcome = match range {
            Some(range) => {
                let range = scan_range(caret, range, policy.direction);
                let mut matcher = DirectionalMatcher::new(compiled, &haystack, range);
                perform(&mut matcher, policy.mode)
            }
            None => CaretOutcome::default(),
        };
        if outcome.is_kept() {
            matched_keys.insert(CoordinateKey::of(&*host, caret.offset));
        }
        rebuilder.record(&*host, index, outcome);
    }

    let matched = !rebuilder.is_empty();
    let Some(plan) = rebuilder.reconcile(&*host, policy.collapse_on_no_match) else {
        tracing::debug!("no caret matched; caret set unchanged");
        return Ok((
            SearchOutcome::untouched(SearchStatus::NoMatch, &*host),
            matched_keys,
        ));
    };
    if matched {
        matched_keys.extend(plan.carets.iter().map(|c| c.key));
    }

    let spawned = plan.spawned();
    let kept = plan.carets.len() - spawned;
    rebuilder.commit(host, &plan)?;
    tracing::debug!(kept, spawned, "caret set rebuilt");

    let outcome = SearchOutcome {
        status: if matched {
            SearchStatus::Committed
        } else {
            SearchStatus::NoMatch
        },
        kept,
        spawned,
        removed: source_count.saturating_sub(kept),
        carets: Vec::new(),
    };
    Ok((outcome, matched_keys))
}
