//! Symbol tables and tags.
//!
//! Each lexical range owns a [`SymbolTable`]; tables form a tree through
//! `previous`, rooted at the standard environ. Tags are the named entities
//! bound in a table.

use crate::{Attribute, MoidId, Name, NodeId};

/// Index of a symbol table.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct TableId(u32);

impl TableId {
    /// The standard environ.
    pub const STANDENV: TableId = TableId(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a tag.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct TagId(u32);

impl TagId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Table category a tag is bound in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TagKind {
    Identifier,
    Indicant,
    Label,
    Operator,
    Priority,
    Anonymous,
}

/// Where a name generated by a declaration lives.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum HeapQualifier {
    #[default]
    Loc,
    Heap,
}

/// Lexical level of the standard environ.
pub const PRIMAL_SCOPE: u32 = 0;

/// A named entity bound in a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub kind: TagKind,
    pub name: Name,
    pub table: TableId,
    pub priority: u8,
    pub moid: Option<MoidId>,
    /// Defining occurrence.
    pub node: Option<NodeId>,
    pub heap: HeapQualifier,
    pub scope: u32,
    pub scope_assigned: bool,
    /// Declared inside a routine text.
    pub in_proc: bool,
    pub used: bool,
    /// Routine text or declarer the tag stands for.
    pub body: Option<NodeId>,
    /// Identity declaration whose source is a routine text.
    pub is_routine: bool,
    /// Runtime routine implementing a standard-environ tag.
    pub runtime: Option<&'static str>,
    /// Frame offset and size, set by the mode phase.
    pub offset: usize,
    pub size: usize,
    pub portable: bool,
}

impl Tag {
    pub fn new(kind: TagKind, name: Name, table: TableId) -> Self {
        Tag {
            kind,
            name,
            table,
            priority: 0,
            moid: None,
            node: None,
            heap: HeapQualifier::Loc,
            scope: PRIMAL_SCOPE,
            scope_assigned: false,
            in_proc: false,
            used: false,
            body: None,
            is_routine: false,
            runtime: None,
            offset: 0,
            size: 0,
            portable: true,
        }
    }
}

/// One lexical range.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolTable {
    pub level: u32,
    pub nest: u32,
    pub previous: Option<TableId>,
    /// Table of the construct that opened this range, when it differs
    /// from `previous` (parts of a choice clause).
    pub outer: Option<TableId>,
    pub identifiers: Vec<TagId>,
    pub indicants: Vec<TagId>,
    pub labels: Vec<TagId>,
    pub operators: Vec<TagId>,
    pub priorities: Vec<TagId>,
    pub anonymous: Vec<TagId>,
    pub moids: Vec<MoidId>,
    /// Frame size of the range.
    pub ap_increment: usize,
    /// Range declares routine or format texts that need frame setup.
    pub initialise_frame: bool,
    /// Construct that opened the range.
    pub attribute: Option<Attribute>,
}

impl SymbolTable {
    pub fn list(&self, kind: TagKind) -> &[TagId] {
        match kind {
            TagKind::Identifier => &self.identifiers,
            TagKind::Indicant => &self.indicants,
            TagKind::Label => &self.labels,
            TagKind::Operator => &self.operators,
            TagKind::Priority => &self.priorities,
            TagKind::Anonymous => &self.anonymous,
        }
    }

    pub fn list_mut(&mut self, kind: TagKind) -> &mut Vec<TagId> {
        match kind {
            TagKind::Identifier => &mut self.identifiers,
            TagKind::Indicant => &mut self.indicants,
            TagKind::Label => &mut self.labels,
            TagKind::Operator => &mut self.operators,
            TagKind::Priority => &mut self.priorities,
            TagKind::Anonymous => &mut self.anonymous,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
            && self.indicants.is_empty()
            && self.labels.is_empty()
            && self.operators.is_empty()
            && self.priorities.is_empty()
            && self.anonymous.is_empty()
    }
}

/// All tables and tags of a compilation.
#[derive(Clone, Debug)]
pub struct Tables {
    tables: Vec<SymbolTable>,
    tags: Vec<Tag>,
}

impl Default for Tables {
    fn default() -> Self {
        Self::new()
    }
}

impl Tables {
    /// Tables holding only the (empty) standard environ.
    pub fn new() -> Self {
        Tables {
            tables: vec![SymbolTable {
                level: PRIMAL_SCOPE,
                ..SymbolTable::default()
            }],
            tags: Vec::new(),
        }
    }

    /// Open a range nested in `previous`.
    pub fn new_table(&mut self, previous: TableId) -> TableId {
        let id = TableId(self.tables.len() as u32);
        let level = self.table(previous).level + 1;
        self.tables.push(SymbolTable {
            level,
            nest: id.0,
            previous: Some(previous),
            ..SymbolTable::default()
        });
        id
    }

    #[inline]
    pub fn table(&self, id: TableId) -> &SymbolTable {
        &self.tables[id.index()]
    }

    #[inline]
    pub fn table_mut(&mut self, id: TableId) -> &mut SymbolTable {
        &mut self.tables[id.index()]
    }

    #[inline]
    pub fn tag(&self, id: TagId) -> &Tag {
        &self.tags[id.index()]
    }

    #[inline]
    pub fn tag_mut(&mut self, id: TagId) -> &mut Tag {
        &mut self.tags[id.index()]
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table_ids(&self) -> impl Iterator<Item = TableId> {
        (0..self.tables.len() as u32).map(TableId)
    }

    pub fn tag_ids(&self) -> impl Iterator<Item = TagId> {
        (0..self.tags.len() as u32).map(TagId)
    }

    /// Bind a new tag in `table`.
    pub fn add_tag(&mut self, table: TableId, kind: TagKind, name: Name) -> TagId {
        let id = TagId(self.tags.len() as u32);
        let mut tag = Tag::new(kind, name, table);
        tag.scope = self.table(table).level;
        self.tags.push(tag);
        self.table_mut(table).list_mut(kind).push(id);
        id
    }

    /// Move a tag to another table, keeping its identity.
    pub fn move_tag(&mut self, tag: TagId, to: TableId) {
        let kind = self.tag(tag).kind;
        let from = self.tag(tag).table;
        self.table_mut(from).list_mut(kind).retain(|&t| t != tag);
        self.table_mut(to).list_mut(kind).push(tag);
        let level = self.table(to).level;
        let moved = self.tag_mut(tag);
        moved.table = to;
        moved.scope = level;
    }

    /// Tag named `name` bound in `table` itself.
    pub fn find_local(&self, table: TableId, kind: TagKind, name: Name) -> Option<TagId> {
        self.table(table)
            .list(kind)
            .iter()
            .copied()
            .find(|&t| self.tag(t).name == name)
    }

    /// Tag named `name` visible from `table`, searching outwards.
    pub fn find_global(&self, table: TableId, kind: TagKind, name: Name) -> Option<TagId> {
        self.chain(table)
            .find_map(|t| self.find_local(t, kind, name))
    }

    /// `table` and every enclosing table up to the standard environ.
    pub fn chain(&self, table: TableId) -> impl Iterator<Item = TableId> + '_ {
        std::iter::successors(Some(table), move |&t| self.table(t).previous)
    }

    /// Whether `ancestor` is `table` or encloses it.
    pub fn encloses(&self, ancestor: TableId, table: TableId) -> bool {
        self.chain(table).any(|t| t == ancestor)
    }

    /// Priority of a dyadic operator visible from `table`.
    pub fn priority_of(&self, table: TableId, name: Name) -> Option<u8> {
        self.find_global(table, TagKind::Priority, name)
            .map(|t| self.tag(t).priority)
    }

    /// Operators named `name` in `table` only.
    pub fn operators_named(&self, table: TableId, name: Name) -> impl Iterator<Item = TagId> + '_ {
        self.table(table)
            .operators
            .iter()
            .copied()
            .filter(move |&t| self.tag(t).name == name)
    }
}
