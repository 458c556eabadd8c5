//! The compilation context shared by every phase.

use crate::{KeywordTable, MoidArena, MoidId, NodeId, Options, SourceMap, StringInterner, Tables, Tree};

/// Everything the phases read and annotate.
///
/// One `Program` per compilation. Phases run in order and each one only
/// adds to what the earlier phases produced.
#[derive(Debug)]
pub struct Program {
    pub interner: StringInterner,
    pub keywords: KeywordTable,
    pub lines: SourceMap,
    pub tree: Tree,
    pub tables: Tables,
    pub moids: MoidArena,
    pub options: Options,
}

impl Program {
    pub fn new(options: Options) -> Self {
        let interner = StringInterner::new();
        let moids = MoidArena::new(&interner);
        Program {
            interner,
            keywords: KeywordTable::standard(),
            lines: SourceMap::new(),
            tree: Tree::new(),
            tables: Tables::new(),
            moids,
            options,
        }
    }

    /// Text of a node's symbol.
    pub fn text(&self, p: NodeId) -> &'static str {
        self.interner.lookup(self.tree.symbol(p))
    }

    pub fn moid_text(&self, m: MoidId) -> String {
        crate::moid_to_string(&self.moids, &self.interner, m)
    }

    /// Canonical moid of a node, if it has one.
    pub fn moid_of(&self, p: NodeId) -> Option<MoidId> {
        self.tree[p].moid.map(|m| self.moids.canonical(m))
    }
}
