//! Directional search patterns.
//!
//! A [`Pattern`] is always written in reading order. Backward patterns are rewritten with
//! [`crate::reverse::reverse_pattern`] at compile time and run over the reversed text.

use onig::{Regex, RegexOptions, Syntax};
use serde::{Deserialize, Serialize};

use crate::error::CaretError;
use crate::reverse::reverse_pattern;

/// Scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward the end of the buffer.
    #[default]
    Forward,
    /// Toward the start of the buffer.
    Backward,
}

impl Direction {
    /// The other direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Where a caret lands on a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Landing {
    /// Match start when scanning forward, match end when scanning backward.
    #[default]
    MatchEdge,
    /// The selection edge away from the scan origin: selection end forward, start backward.
    SelectionBoundary,
}

/// A search pattern bound to a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    source: String,
    direction: Direction,
    case_sensitive: bool,
    landing: Landing,
}

impl Pattern {
    /// A regex pattern, case-sensitive, landing on the match edge.
    pub fn new(source: impl Into<String>, direction: Direction) -> Self {
        Self {
            source: source.into(),
            direction,
            case_sensitive: true,
            landing: Landing::MatchEdge,
        }
    }

    /// A pattern matching `text` literally.
    pub fn literal(text: &str, direction: Direction) -> Self {
        Self::new(regex::escape(text), direction)
    }

    /// Set case sensitivity.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Set the landing rule.
    pub fn with_landing(mut self, landing: Landing) -> Self {
        self.landing = landing;
        self
    }

    /// Same pattern in another direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Pattern text as written (reading order).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Scan direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Case sensitivity.
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Landing rule.
    pub fn landing(&self) -> Landing {
        self.landing
    }

    /// Compile for matching in this pattern's direction.
    pub fn compile(&self) -> Result<CompiledPattern, CaretError> {
        if self.source.is_empty() {
            return Err(CaretError::invalid_pattern(&self.source, "empty pattern"));
        }

        let source = match self.direction {
            Direction::Forward => self.source.clone(),
            Direction::Backward => reverse_pattern(&self.source)?,
        };
        let options = if self.case_sensitive {
            RegexOptions::REGEX_OPTION_NONE
        } else {
            RegexOptions::REGEX_OPTION_IGNORECASE
        };

        let regex = Regex::with_options(&source, options, Syntax::default()).map_err(|e| {
            CaretError::InvalidPattern {
                pattern: self.source.clone(),
                message: e.to_string(),
            }
        })?;

        tracing::trace!(pattern = %self.source, compiled = %source, "compiled pattern");
        Ok(CompiledPattern {
            regex,
            pattern: self.clone(),
        })
    }
}

/// A pattern ready to run.
pub struct CompiledPattern {
    regex: Regex,
    pattern: Pattern,
}

impl std::fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl CompiledPattern {
    /// The pattern this was compiled from.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Number of capture groups.
    pub fn group_count(&self) -> usize {
        self.regex.captures_len()
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }
}
