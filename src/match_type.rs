use serde::{Deserialize, Serialize};

use crate::{Position, Span};

/// The accept value of the terminating segment of a `split` run, and of
/// negative-pattern accepts in all-matches mode.
///
/// Ordinary accepts are the 1-based rule number; 0 means no match.
pub const EMPTY: usize = 0xFFFF;

/// An accepted match, as observed through [`crate::Matcher`].
///
/// The matcher itself exposes the same data piecewise (`accept()`, `text()`,
/// `lineno()`, ...); this value bundles it for callers that want to collect
/// matches.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// The 1-based rule number that matched, 0 for no match, or [`EMPTY`].
    accept: usize,
    /// The span of the accepted text in the logical input stream.
    span: Span,
    /// The position (line and column, 1-based) of the start of the match.
    position: Position,
}

impl Match {
    /// Create a new match.
    pub fn new(accept: usize, span: Span, position: Position) -> Self {
        Self {
            accept,
            span,
            position,
        }
    }

    /// Get the accept index of the match.
    #[inline]
    pub fn accept(&self) -> usize {
        self.accept
    }

    /// Get the start offset of the match in the logical input stream.
    #[inline]
    pub fn start(&self) -> usize {
        self.span.start
    }

    /// Get the end offset of the match in the logical input stream.
    #[inline]
    pub fn end(&self) -> usize {
        self.span.end
    }

    /// Get the span of the match.
    #[inline]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Get the length of the match.
    #[inline]
    pub fn len(&self) -> usize {
        self.span.len()
    }

    /// Check if the match is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// Get the position of the start of the match.
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_round_trip() {
        let matched = Match::new(1, Span::new(3, 7), Position::new(2, 4));
        let json = serde_json::to_string(&matched).unwrap();
        let back: Match = serde_json::from_str(&json).unwrap();
        assert_eq!(matched, back);
        assert_eq!(back.len(), 4);
        assert_eq!(back.position().line(), 2);
    }
}
