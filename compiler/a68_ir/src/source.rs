//! Source lines.
//!
//! The lines of the main file and of every included file form one ordered
//! list. Included files are spliced in at the directive, each line keeping
//! its own file name and number for diagnostics.

use crate::Name;

/// Index of a line in a [`SourceMap`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[repr(transparent)]
pub struct LineId(u32);

impl LineId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        LineId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One physical source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLine {
    pub filename: Name,
    /// 1-based line number within `filename`.
    pub number: u32,
    pub text: String,
    /// Line has been echoed in a listing.
    pub printed: bool,
    /// Line takes part in a listing.
    pub list: bool,
}

impl SourceLine {
    pub fn new(filename: Name, number: u32, text: impl Into<String>) -> Self {
        SourceLine {
            filename,
            number,
            text: text.into(),
            printed: false,
            list: true,
        }
    }
}

/// Ordered list of source lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceMap {
    lines: Vec<SourceLine>,
}

impl SourceMap {
    pub fn new() -> Self {
        SourceMap { lines: Vec::new() }
    }

    pub fn push(&mut self, line: SourceLine) -> LineId {
        let id = LineId::new(self.lines.len() as u32);
        self.lines.push(line);
        id
    }

    /// Insert `lines` after position `at`, shifting later lines down.
    ///
    /// Only valid before any span refers to a line.
    pub fn splice_after(&mut self, at: LineId, lines: Vec<SourceLine>) {
        let index = (at.index() + 1).min(self.lines.len());
        self.lines.splice(index..index, lines);
    }

    #[inline]
    pub fn get(&self, id: LineId) -> Option<&SourceLine> {
        self.lines.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: LineId) -> Option<&mut SourceLine> {
        self.lines.get_mut(id.index())
    }

    pub fn previous(&self, id: LineId) -> Option<LineId> {
        id.index().checked_sub(1).map(|i| LineId::new(i as u32))
    }

    pub fn next(&self, id: LineId) -> Option<LineId> {
        let i = id.index() + 1;
        (i < self.lines.len()).then(|| LineId::new(i as u32))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LineId, &SourceLine)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| (LineId::new(i as u32), line))
    }
}
