//! Syntax tree.
//!
//! Nodes live in one arena and are linked by index: `sub` reaches the first
//! child, `next`/`previous` walk siblings. Tokens, phrases and inserted
//! coercions are all nodes.

use std::ops::{Index, IndexMut};

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::{Attribute, MoidId, Name, Span, TableId, TagId};

/// Index of a node in a [`Tree`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }
}

bitflags! {
    /// Per-node flags set by the later phases.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Status: u32 {
        /// A diagnostic was reported here; suppress follow-on errors.
        const ERROR = 1 << 0;
        /// Unit yields a transient name.
        const TRANSIENT = 1 << 1;
        /// Static scope was checked.
        const SCOPE_CHECKED = 1 << 2;
        /// Unit has generated C code.
        const COMPILED = 1 << 3;
        /// Unit folds to a constant.
        const CONSTANT = 1 << 4;
        /// Identifier is used in its own declaration.
        const UNINITIALISED = 1 << 5;
        /// Brief construct written with `{ }` brackets.
        const ALIAS_BRACKETS = 1 << 6;
    }
}

/// Information the code generator hangs on a node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenieInfo {
    /// Name of the C function compiled for this unit.
    pub compile_name: Option<String>,
}

/// One tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub attribute: Attribute,
    pub symbol: Name,
    pub span: Span,
    pub sub: Option<NodeId>,
    pub next: Option<NodeId>,
    pub previous: Option<NodeId>,
    pub table: Option<TableId>,
    pub moid: Option<MoidId>,
    pub tag: Option<TagId>,
    /// Operator priority, 1..=9 for dyadic and 10 for monadic operators.
    pub priority: u8,
    pub status: Status,
    /// Enclosing routine or format text.
    pub nest: Option<NodeId>,
    /// Deepest lexical level referenced from a routine or format text.
    pub youngest_environ: Option<u32>,
    pub genie: GenieInfo,
}

impl Node {
    fn new(attribute: Attribute, symbol: Name, span: Span) -> Self {
        Node {
            attribute,
            symbol,
            span,
            sub: None,
            next: None,
            previous: None,
            table: None,
            moid: None,
            tag: None,
            priority: 0,
            status: Status::empty(),
            nest: None,
            youngest_environ: None,
            genie: GenieInfo::default(),
        }
    }
}

/// Arena of nodes.
#[derive(Clone, Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    /// First node of the program.
    pub top: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            nodes: Vec::new(),
            top: None,
        }
    }

    pub fn new_node(&mut self, attribute: Attribute, symbol: Name, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(attribute, symbol, span));
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn attribute(&self, p: NodeId) -> Attribute {
        self[p].attribute
    }

    #[inline]
    pub fn is(&self, p: NodeId, attr: Attribute) -> bool {
        self[p].attribute == attr
    }

    /// Whether `p` exists and has attribute `attr`.
    #[inline]
    pub fn is_opt(&self, p: Option<NodeId>, attr: Attribute) -> bool {
        p.is_some_and(|p| self.is(p, attr))
    }

    #[inline]
    pub fn sub(&self, p: NodeId) -> Option<NodeId> {
        self[p].sub
    }

    #[inline]
    pub fn next(&self, p: NodeId) -> Option<NodeId> {
        self[p].next
    }

    #[inline]
    pub fn previous(&self, p: NodeId) -> Option<NodeId> {
        self[p].previous
    }

    #[inline]
    pub fn symbol(&self, p: NodeId) -> Name {
        self[p].symbol
    }

    /// Link `b` after `a`.
    pub fn link(&mut self, a: NodeId, b: NodeId) {
        self[a].next = Some(b);
        self[b].previous = Some(a);
    }

    /// `p` and the siblings that follow it.
    pub fn siblings(&self, p: Option<NodeId>) -> Siblings<'_> {
        Siblings { tree: self, next: p }
    }

    /// Children of `p`, in order.
    pub fn children(&self, p: NodeId) -> Siblings<'_> {
        self.siblings(self.sub(p))
    }

    /// Children collected, for callers that mutate while walking.
    pub fn child_ids(&self, p: NodeId) -> SmallVec<[NodeId; 8]> {
        self.children(p).collect()
    }

    pub fn last_sibling(&self, p: NodeId) -> NodeId {
        let mut q = p;
        while let Some(n) = self.next(q) {
            q = n;
        }
        q
    }

    /// First child of `p` with attribute `attr`.
    pub fn find_child(&self, p: NodeId, attr: Attribute) -> Option<NodeId> {
        self.children(p).find(|&q| self.is(q, attr))
    }

    /// Follow first children while they have one of `attrs`.
    pub fn descend(&self, mut p: NodeId, attrs: &[Attribute]) -> NodeId {
        while attrs.contains(&self.attribute(p)) {
            match self.sub(p) {
                Some(s) => p = s,
                None => break,
            }
        }
        p
    }

    /// Make nodes `p..=q` (siblings) the children of a new phrase with
    /// attribute `attr`.
    ///
    /// The phrase takes over the identity of `p`, so references to `p` held
    /// by callers now denote the phrase. The old contents of `p` move to a
    /// fresh node that becomes the first child.
    pub fn make_sub(&mut self, p: NodeId, q: NodeId, attr: Attribute) -> NodeId {
        let after = self.next(q);
        let copy = NodeId(self.nodes.len() as u32);
        let mut moved = self[p].clone();
        moved.previous = None;
        if p == q {
            moved.next = None;
        } else if let Some(second) = self[p].next {
            self[second].previous = Some(copy);
        }
        self.nodes.push(moved);
        if p != q {
            self[q].next = None;
        }

        let span = self.siblings(Some(copy)).fold(self[copy].span, |acc, n| acc.merge(self[n].span));
        let head = &mut self[p];
        head.attribute = attr;
        head.sub = Some(copy);
        head.next = after;
        head.span = span;
        head.moid = None;
        head.tag = None;
        head.priority = 0;
        head.status = Status::empty();
        head.genie = GenieInfo::default();
        if let Some(after) = after {
            self[after].previous = Some(p);
        }
        p
    }

    /// Remove `first..=last` from its sibling chain.
    ///
    /// The caller fixes up any `sub` or `top` that pointed at `first`.
    pub fn unlink(&mut self, first: NodeId, last: NodeId) {
        let before = self.previous(first);
        let after = self.next(last);
        if let Some(b) = before {
            self[b].next = after;
        }
        if let Some(a) = after {
            self[a].previous = before;
        }
        self[first].previous = None;
        self[last].next = None;
    }

    /// Put the chain `first..=last` where `target` was.
    pub fn replace_with(&mut self, target: NodeId, first: NodeId, last: NodeId) {
        let before = self.previous(target);
        let after = self.next(target);
        self[first].previous = before;
        self[last].next = after;
        if let Some(b) = before {
            self[b].next = Some(first);
        }
        if let Some(a) = after {
            self[a].previous = Some(last);
        }
        if self.top == Some(target) {
            self.top = Some(first);
        }
        self[target].previous = None;
        self[target].next = None;
    }

    /// Every node reachable from `p` through `sub` and `next`, in pre-order.
    pub fn preorder(&self, p: Option<NodeId>) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        if let Some(p) = p {
            stack.push(p);
        }
        while let Some(n) = stack.pop() {
            out.push(n);
            if let Some(next) = self.next(n) {
                stack.push(next);
            }
            if let Some(sub) = self.sub(n) {
                stack.push(sub);
            }
        }
        out
    }

    /// Nodes below `p` (excluding `p` and its siblings), in pre-order.
    pub fn descendants(&self, p: NodeId) -> Vec<NodeId> {
        self.preorder(self.sub(p))
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    #[inline]
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl IndexMut<NodeId> for Tree {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }
}

/// Iterator over a sibling chain.
pub struct Siblings<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.next(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests;
