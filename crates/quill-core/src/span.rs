//! Source positions.
//!
//! Every token, AST node and error carries a [`Span`]. Only the starting
//! line is part of the user-facing contract; column and length are kept so
//! that a caret can be drawn under the offending text.

use std::fmt;

/// Where a piece of source text starts, and how many bytes of that line it
/// covers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// 1-based line.
    pub line: u32,
    /// 1-based byte column.
    pub col: u32,
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Zero-width span, used for end of input.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, 0)
    }

    #[inline]
    fn start(&self) -> (u32, u32) {
        (self.line, self.col)
    }

    /// The smallest span starting at the earlier of the two positions.
    ///
    /// A span never crosses a line, so when `other` is on a different line
    /// the result is the earlier span widened by the later one's length.
    pub fn merge(self, other: Span) -> Span {
        let (first, second) = if other.start() < self.start() {
            (other, self)
        } else {
            (self, other)
        };
        let len = if first.line == second.line {
            (second.col + second.len).max(first.col + first.len) - first.col
        } else {
            first.len + second.len
        };
        Span { len, ..first }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}+{}", self.line, self.col, self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}:{}", self.line, self.col)
    }
}
