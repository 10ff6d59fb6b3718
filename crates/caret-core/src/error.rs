//! Error type shared by the engine and its hosts.

use thiserror::Error;

use crate::caret::CaretId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by the caret engine and its hosts.
pub enum CaretError {
    #[error("invalid pattern '{pattern}': {message}")]
    /// A search pattern failed validation or compilation.
    InvalidPattern {
        /// The pattern source as supplied by the caller.
        pattern: String,
        /// The compiler (or reverser) error message.
        message: String,
    },

    #[error("cannot infer a search pattern from {0:?}")]
    /// The character next to the pattern caret did not yield a pattern.
    DegenerateClassification(char),

    #[error("caret {0} no longer exists")]
    /// A caret handle was used after its caret was removed.
    StaleCaret(CaretId),

    #[error("offset {offset} is out of bounds (len {len})")]
    /// An offset past the end of the text was supplied.
    OffsetOutOfBounds {
        /// The offending offset.
        offset: usize,
        /// The text length in characters.
        len: usize,
    },

    #[error("the last caret cannot be removed")]
    /// The host refused to remove its only caret.
    LastCaret,

    #[error("no search session is active")]
    /// A session operation was invoked without a prior search.
    NoSession,
}

impl CaretError {
    pub(crate) fn invalid_pattern(pattern: &str, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            message: message.into(),
        }
    }
}
