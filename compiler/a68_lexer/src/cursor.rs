//! Character cursor over the source lines.
//!
//! The end of every line reads as a virtual `'\n'`, so tokens that may span
//! lines (comments, pragmats, format texts) see line breaks as whitespace.

use a68_ir::{SourceMap, Span};

use crate::reader::line_id;

#[derive(Clone, Debug)]
pub(crate) struct Cursor {
    lines: Vec<Vec<char>>,
    line: usize,
    column: usize,
}

/// A saved cursor position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Mark {
    pub line: usize,
    pub column: usize,
}

impl Cursor {
    pub fn new(map: &SourceMap) -> Self {
        Cursor {
            lines: map.iter().map(|(_, l)| l.text.chars().collect()).collect(),
            line: 0,
            column: 0,
        }
    }

    pub fn mark(&self) -> Mark {
        Mark {
            line: self.line,
            column: self.column,
        }
    }

    pub fn reset(&mut self, mark: Mark) {
        self.line = mark.line;
        self.column = mark.column;
    }

    pub fn is_eof(&self) -> bool {
        self.line >= self.lines.len()
    }

    /// Character `n` places ahead on the current line, `'\n'` at its end.
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        let line = self.lines.get(self.line)?;
        let i = self.column + n;
        match i.cmp(&line.len()) {
            std::cmp::Ordering::Less => Some(line[i]),
            std::cmp::Ordering::Equal => Some('\n'),
            std::cmp::Ordering::Greater => None,
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.peek_nth(0)
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        if c == '\n' && self.column >= self.lines[self.line].len() {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume `c` if it is next.
    pub fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume characters while `f` holds, on the current line only.
    pub fn eat_while(&mut self, mut f: impl FnMut(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' || !f(c) {
                break;
            }
            out.push(c);
            self.column += 1;
        }
        out
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    /// Span from `start` to the cursor, clipped to the start line.
    pub fn span_from(&self, start: Mark) -> Span {
        let len = if self.line == start.line {
            self.column.saturating_sub(start.column)
        } else {
            self.lines
                .get(start.line)
                .map_or(1, |l| l.len().saturating_sub(start.column).max(1))
        };
        Span::new(line_id(start.line), start.column as u32, len as u32)
    }
}
