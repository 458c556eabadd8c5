//! Compilation options.

/// How bold words are written.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stropping {
    /// Bold words are upper-case runs: `BEGIN`, `INT`.
    #[default]
    Upper,
    /// Bold words are quoted: `'BEGIN'`, `'INT'`.
    Quote,
}

/// Highest optimisation level of the C generator.
pub const MAX_OPTIMISE: u8 = 4;

/// Options that steer the front end and the code generator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Options {
    pub stropping: Stropping,
    /// Warn about constructs that are not portable Algol 68.
    pub portcheck: bool,
    /// Log every reduction the parser makes.
    pub reductions: bool,
    /// Accept `{ }` as an alias for `( )`.
    pub brackets: bool,
    /// C generator level, 0 (off) through 4.
    pub optimise: u8,
}

impl Options {
    /// Set the optimisation level, clamped to `0..=MAX_OPTIMISE`.
    #[must_use]
    pub fn with_optimise(mut self, level: u8) -> Self {
        self.optimise = level.min(MAX_OPTIMISE);
        self
    }

    #[must_use]
    pub fn with_stropping(mut self, stropping: Stropping) -> Self {
        self.stropping = stropping;
        self
    }
}
