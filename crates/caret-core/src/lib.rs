#![warn(missing_docs)]
//! Caret Core - Pattern-Driven Multi-Caret Search Engine
//!
//! # Overview
//!
//! `caret-core` places, moves and spawns carets by searching the text around them. Given a
//! set of carets, a pattern and a search policy, it finds matches forward or backward from
//! every caret and rebuilds the caret set so each match gets a caret, all in one atomic
//! transaction against the host editor.
//!
//! The engine is headless: it talks to the editor only through the [`CaretHost`] trait.
//! [`CaretEditor`] is the in-memory reference host used by tests, benches and examples.
//!
//! # Core Features
//!
//! - **Pattern Inference**: whitespace gaps, identifiers (with numeric and smart-prefix
//!   variants) and punctuation runs from the character next to the caret
//! - **Bidirectional Search**: backward search runs a reversed pattern over reversed text
//! - **Range Partitioning**: every caret searches its own non-overlapping slice of the text
//! - **Atomic Rebuild**: the new caret set is planned as pure data and committed in one
//!   transaction that rolls back on failure
//! - **Re-entrancy Guard**: listeners reacting to caret changes never see a half-built set
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  CaretSearchEngine / transforms             │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Rebuilder (scan → reconcile → commit)      │  ← Caret-Set Plan
//! ├─────────────────────────────────────────────┤
//! │  Executor + DirectionalMatcher              │  ← Per-Caret Matching
//! ├─────────────────────────────────────────────┤
//! │  Partition + SearchPolicy                   │  ← Search Ranges
//! ├─────────────────────────────────────────────┤
//! │  Pattern / reverse / TextView               │  ← Compiled Search
//! ├─────────────────────────────────────────────┤
//! │  CaretHost (CaretEditor, TextBuffer)        │  ← Editor Boundary
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use caret_core::{
//!     CaretEditor, CaretSearchEngine, CaretState, Direction, MatchMode, SearchPolicy,
//! };
//!
//! let mut editor = CaretEditor::with_carets("let total = total + 1;", &[CaretState::at(4)]).unwrap();
//! let mut engine = CaretSearchEngine::default();
//!
//! // Spawn a caret on every other occurrence of the identifier at the caret.
//! let policy = SearchPolicy::new(Direction::Forward, MatchMode::SpawnAll);
//! let outcome = engine.spawn(&mut editor, &policy).unwrap();
//!
//! assert_eq!(outcome.carets.len(), 2);
//! assert_eq!(editor.primary_state().position, 4);
//! ```
//!
//! # Module Description
//!
//! - [`engine`] - Engine facade and interactive search sessions
//! - [`inference`] - Pattern inference from the caret's neighbourhood
//! - [`pattern`] - Patterns, direction and compilation
//! - [`reverse`] - Pattern reversal for backward search
//! - [`matcher`] - Directional match iteration over a search range
//! - [`partition`] - Non-overlapping per-caret search ranges
//! - [`rebuild`] - Caret-set reconciliation and commit
//! - [`transforms`] - Caret transforms that do not search
//! - [`editor`] - In-memory reference host

pub mod buffer;
pub mod caret;
pub mod classify;
pub mod editor;
pub mod engine;
pub mod error;
pub mod executor;
pub mod guard;
pub mod host;
pub mod inference;
pub mod matcher;
pub mod partition;
pub mod pattern;
pub mod policy;
pub mod range;
pub mod rebuild;
pub mod reverse;
pub mod settings;
pub mod text_view;
pub mod transforms;

pub use buffer::TextBuffer;
pub use caret::{Caret, CaretId, CaretState, CoordinateKey, Position};
pub use caret_core_lang::{CommentConfig, LineKind};
pub use classify::{CharClass, NumberKind};
pub use editor::{CaretChange, CaretChangeCallback, CaretChangeKind, CaretEditor, CaretSnapshot};
pub use engine::{CaretSearchEngine, SearchOutcome, SearchStatus};
pub use error::CaretError;
pub use executor::{CaretOutcome, perform};
pub use guard::{CaretGuard, GuardScope};
pub use host::CaretHost;
pub use inference::{infer, try_infer};
pub use matcher::{DirectionalMatcher, Match};
pub use partition::{partition, scan_range};
pub use pattern::{CompiledPattern, Direction, Landing, Pattern};
pub use policy::{MatchMode, SearchPolicy};
pub use range::TextRange;
pub use rebuild::{PlannedCaret, RebuildPhase, RebuildPlan, Rebuilder, SourceCaret};
pub use reverse::reverse_pattern;
pub use settings::{DEFAULT_PREFIX_PATTERN, SpawnSettings};
pub use text_view::{Haystack, IndexMapper, TextView};
pub use transforms::{
    LineCaretFilter, cycle_primary, filter_line_carets, straighten_carets,
    toggle_selection_anchor,
};
