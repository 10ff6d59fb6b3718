//! Re-entrancy guard for caret-set rebuilds.
//!
//! A rebuild mutates the host's caret set, which fires the host's change listeners. Listeners
//! that would react by invoking the engine again hold a clone of the same [`CaretGuard`] and
//! use [`CaretGuard::if_unguarded`], so they never observe a half-built caret set.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared "rebuild in flight" counter.
#[derive(Debug, Clone, Default)]
pub struct CaretGuard {
    depth: Arc<AtomicUsize>,
}

/// RAII scope returned by [`CaretGuard::enter`] and [`CaretGuard::scope`].
///
/// The guard stays raised until every scope is dropped, including on early return or panic.
#[derive(Debug)]
pub struct GuardScope {
    depth: Arc<AtomicUsize>,
}

impl Drop for GuardScope {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::AcqRel);
    }
}

impl CaretGuard {
    /// Create a lowered guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while any scope is alive.
    pub fn is_guarded(&self) -> bool {
        self.depth.load(Ordering::Acquire) > 0
    }

    /// Raise the guard unless it is already raised.
    ///
    /// Returns `None` for a re-entrant call.
    pub fn enter(&self) -> Option<GuardScope> {
        self.depth
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GuardScope {
                depth: Arc::clone(&self.depth),
            })
    }

    /// Raise the guard, nesting inside any scope already alive.
    pub fn scope(&self) -> GuardScope {
        self.depth.fetch_add(1, Ordering::AcqRel);
        GuardScope {
            depth: Arc::clone(&self.depth),
        }
    }

    /// Run `f` with the guard raised.
    pub fn guard<R>(&self, f: impl FnOnce() -> R) -> R {
        let _scope = self.scope();
        f()
    }

    /// Run `f` only if the guard is lowered.
    pub fn if_unguarded<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        if self.is_guarded() {
            None
        } else {
            Some(f())
        }
    }
}
