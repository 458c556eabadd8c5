//! Source positions.

use std::fmt;

use crate::LineId;

/// Position of a token: the source line and a 0-based column range on it.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Span {
    pub line: LineId,
    pub column: u32,
    pub len: u32,
}

impl Span {
    /// Placeholder for nodes that have no source text.
    pub const DUMMY: Span = Span {
        line: LineId::new(0),
        column: 0,
        len: 0,
    };

    #[inline]
    pub const fn new(line: LineId, column: u32, len: u32) -> Self {
        Span { line, column, len }
    }

    /// Zero-width span at a position.
    #[inline]
    pub const fn point(line: LineId, column: u32) -> Self {
        Span {
            line,
            column,
            len: 0,
        }
    }

    #[inline]
    pub const fn end_column(self) -> u32 {
        self.column + self.len
    }

    /// Cover both spans. Spans on different lines keep the earlier one.
    pub fn merge(self, other: Span) -> Span {
        if self.line != other.line {
            return if self.line < other.line { self } else { other };
        }
        let start = self.column.min(other.column);
        let end = self.end_column().max(other.end_column());
        Span::new(self.line, start, end - start)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}+{}", self.line.index(), self.column, self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_same_line() {
        let line = LineId::new(3);
        let a = Span::new(line, 4, 2);
        let b = Span::new(line, 10, 3);
        assert_eq!(a.merge(b), Span::new(line, 4, 9));
        assert_eq!(b.merge(a), Span::new(line, 4, 9));
    }

    #[test]
    fn test_merge_across_lines_keeps_earlier() {
        let a = Span::new(LineId::new(1), 4, 2);
        let b = Span::new(LineId::new(2), 0, 3);
        assert_eq!(a.merge(b), a);
        assert_eq!(b.merge(a), a);
    }
}
