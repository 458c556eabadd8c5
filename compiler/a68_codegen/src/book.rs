//! The common-subexpression book.
//!
//! Every fetch the generator emits into a function is signed in here, per
//! pass. A later phrase fetching the same object finds the entry and uses
//! its C variable instead of fetching again. Two row elements are the
//! same object when their rows are and their indexers are the same tree.
//!
//! Execute entries made inside a branch are released when the branch
//! ends: the statement that set the variable does not run on every path
//! to a later use. Declarations sit at the head of the function and stay.

use a68_ir::{NodeId, TagId, Tree};
use a68_stack::ensure_sufficient_stack;

use crate::Pass;

/// What a booked variable holds.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Action {
    /// Pointer to the frame object of a tag.
    Frame,
    /// Pointer to the object the name held by a tag refers to.
    Deref,
    /// Array and tuple pointers of a row.
    Descriptor,
    /// Pointer to a row element; `node` is the indexer.
    Element,
    /// Pointer to a field; `node` is the field selector.
    Field,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub action: Action,
    pub pass: Pass,
    pub tag: TagId,
    pub node: NodeId,
    /// C variable holding the fetched value.
    pub name: String,
}

#[derive(Default, Debug)]
pub struct Book {
    entries: Vec<Entry>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&mut self, action: Action, pass: Pass, tag: TagId, node: NodeId, name: impl Into<String>) {
        self.entries.push(Entry {
            action,
            pass,
            tag,
            node,
            name: name.into(),
        });
    }

    /// Latest entry for `tag` whose node satisfies `same`.
    pub fn signed_in_where(
        &self,
        action: Action,
        pass: Pass,
        tag: TagId,
        same: impl Fn(NodeId) -> bool,
    ) -> Option<&Entry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.action == action && e.pass == pass && e.tag == tag && same(e.node))
    }

    pub fn signed_in(&self, action: Action, pass: Pass, tag: TagId) -> Option<&Entry> {
        self.signed_in_where(action, pass, tag, |_| true)
    }

    pub fn mark(&self) -> usize {
        self.entries.len()
    }

    /// Forget the execute entries made since `mark`.
    pub fn release(&mut self, mark: usize) {
        let mut i = 0;
        self.entries.retain(|e| {
            let keep = i < mark || e.pass != Pass::Execute;
            i += 1;
            keep
        });
    }

    /// Forget the execute entries of one action.
    pub fn forget(&mut self, action: Action) {
        self.entries.retain(|e| e.action != action || e.pass != Pass::Execute);
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether the sibling chains from `p` and `q` have the same shape,
/// symbols and tags.
pub fn same_tree(tree: &Tree, p: Option<NodeId>, q: Option<NodeId>) -> bool {
    match (p, q) {
        (None, None) => true,
        (Some(p), Some(q)) => {
            let (a, b) = (&tree[p], &tree[q]);
            a.attribute == b.attribute
                && a.symbol == b.symbol
                && a.tag == b.tag
                && ensure_sufficient_stack(|| same_tree(tree, a.sub, b.sub))
                && same_tree(tree, a.next, b.next)
        }
        _ => false,
    }
}
