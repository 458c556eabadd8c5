//! Sorts, deflexing regimes and soids.

use std::fmt;

use a68_ir::{Attribute, MoidId};

/// Strength of a syntactic position: which coercions it admits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sort {
    NoSort,
    Soft,
    Weak,
    Meek,
    Firm,
    Strong,
}

impl Sort {
    pub fn as_str(self) -> &'static str {
        match self {
            Sort::NoSort => "no",
            Sort::Soft => "soft",
            Sort::Weak => "weak",
            Sort::Meek => "meek",
            Sort::Firm => "firm",
            Sort::Strong => "strong",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When FLEX may be ignored while comparing modes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Deflexing {
    /// FLEX is significant everywhere.
    NoDeflexing,
    /// Values may ignore FLEX, names may not.
    #[default]
    SafeDeflexing,
    /// A non-FLEX row accepts a FLEX row value, not the reverse.
    AliasDeflexing,
    /// FLEX is ignored everywhere.
    ForceDeflexing,
}

/// Sort-oriented id: the sort of a position and the mode expected there.
///
/// An expected mode of UNDEFINED means the position takes whatever the
/// phrase yields; the caller decides the coercion afterwards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Soid {
    pub sort: Sort,
    pub moid: MoidId,
    pub attribute: Option<Attribute>,
    pub cast: bool,
}

impl Soid {
    pub fn new(sort: Sort, moid: MoidId) -> Self {
        Soid {
            sort,
            moid,
            attribute: None,
            cast: false,
        }
    }

    pub fn strong(moid: MoidId) -> Self {
        Soid::new(Sort::Strong, moid)
    }

    pub fn meek(moid: MoidId) -> Self {
        Soid::new(Sort::Meek, moid)
    }

    /// A position of `sort` whose mode is settled by the phrase.
    pub fn unknown(sort: Sort) -> Self {
        Soid::new(sort, MoidId::UNDEFINED)
    }

    pub fn is_known(&self) -> bool {
        self.moid != MoidId::UNDEFINED
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attribute = Some(attribute);
        self
    }

    #[must_use]
    pub fn as_cast(mut self) -> Self {
        self.cast = true;
        self
    }
}
