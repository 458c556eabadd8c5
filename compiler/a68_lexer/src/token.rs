//! Tokens and their conversion into the initial node chain.

use a68_ir::{Attribute, NodeId, Program, Span, Status};

/// A scanned token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub attribute: Attribute,
    /// Symbol text: keyword spelling, tag name without spaces, or the
    /// content of a string denotation with `""` collapsed.
    pub text: String,
    pub span: Span,
    pub status: Status,
}

impl Token {
    pub fn new(attribute: Attribute, text: impl Into<String>, span: Span) -> Self {
        Token {
            attribute,
            text: text.into(),
            span,
            status: Status::empty(),
        }
    }

    pub fn is(&self, attribute: Attribute) -> bool {
        self.attribute == attribute
    }
}

/// Turn `tokens` into a sibling chain in `program.tree`; sets `tree.top`.
pub fn into_tree(program: &mut Program, tokens: &[Token]) -> Option<NodeId> {
    let mut previous: Option<NodeId> = None;
    let mut first = None;
    for token in tokens {
        let symbol = program.interner.intern(&token.text);
        let p = program.tree.new_node(token.attribute, symbol, token.span);
        program.tree[p].status = token.status;
        match previous {
            Some(q) => program.tree.link(q, p),
            None => first = Some(p),
        }
        previous = Some(p);
    }
    program.tree.top = first;
    first
}
