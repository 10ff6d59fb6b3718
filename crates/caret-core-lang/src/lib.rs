#![warn(missing_docs)]
//! `caret-core-lang` - data-driven language helpers for `caret-core`.
//!
//! This crate stays lightweight and does **not** depend on any parser. It describes how a
//! language spells its comments, which is all the caret engine needs to tell code lines from
//! comment lines when filtering carets by line kind.

/// Comment tokens for a given language.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentConfig {
    /// Line comment token (e.g. `//`, `#`).
    pub line: Option<String>,
    /// Block comment start token (e.g. `/*`).
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`).
    pub block_end: Option<String>,
}

/// What a single line of text holds, as far as caret filtering is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Empty or whitespace only.
    Blank,
    /// A line comment, or a block comment that opens and closes on the line.
    Comment,
    /// Anything else.
    Code,
}

impl CommentConfig {
    /// Create a config that supports only line comments.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line: Some(token.into()),
            block_start: None,
            block_end: None,
        }
    }

    /// Create a config that supports only block comments.
    pub fn block(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            line: None,
            block_start: Some(start.into()),
            block_end: Some(end.into()),
        }
    }

    /// Create a config that supports both line and block comments.
    pub fn line_and_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: Some(line.into()),
            block_start: Some(block_start.into()),
            block_end: Some(block_end.into()),
        }
    }

    /// Returns `true` if a line comment token is configured.
    pub fn has_line(&self) -> bool {
        self.line.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` if both block comment tokens are configured.
    pub fn has_block(&self) -> bool {
        self.block_start.as_deref().is_some_and(|s| !s.is_empty())
            && self.block_end.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` if `line` (without its terminator) is a comment line.
    ///
    /// Leading and trailing whitespace is ignored. A block comment only counts when it both
    /// opens and closes on the same line.
    pub fn is_comment_line(&self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return false;
        }

        if self.has_line() && self.line.as_deref().is_some_and(|t| trimmed.starts_with(t)) {
            return true;
        }

        match (self.block_start.as_deref(), self.block_end.as_deref()) {
            (Some(start), Some(end)) if self.has_block() => {
                trimmed.len() >= start.len() + end.len()
                    && trimmed.starts_with(start)
                    && trimmed.ends_with(end)
            }
            _ => false,
        }
    }

    /// Classify one line of text.
    pub fn classify_line(&self, line: &str) -> LineKind {
        if line.trim().is_empty() {
            LineKind::Blank
        } else if self.is_comment_line(line) {
            LineKind::Comment
        } else {
            LineKind::Code
        }
    }
}
