//! Helpers shared by the parser's unit tests.

use a68_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use a68_ir::{Attribute, NodeId, Options, Program};
use a68_lexer::{lex, MemoryLoader};

pub(crate) struct Parsed {
    pub program: Program,
    pub diags: DiagnosticQueue,
    pub top: Option<NodeId>,
}

impl Parsed {
    /// Every node with `attr`, in pre-order.
    pub fn all(&self, attr: Attribute) -> Vec<NodeId> {
        self.program
            .tree
            .preorder(self.program.tree.top)
            .into_iter()
            .filter(|&p| self.program.tree.is(p, attr))
            .collect()
    }

    pub fn first(&self, attr: Attribute) -> NodeId {
        self.all(attr)[0]
    }

    /// Attributes of the children of `p`.
    pub fn children(&self, p: NodeId) -> Vec<Attribute> {
        self.program.tree.children(p).map(|c| self.program.tree.attribute(c)).collect()
    }

    /// Source text of the leaves below `p`, space separated.
    pub fn text(&self, p: NodeId) -> String {
        let tree = &self.program.tree;
        let mut leaves = Vec::new();
        for q in std::iter::once(p).chain(tree.descendants(p)) {
            if tree.sub(q).is_none() {
                leaves.push(self.program.text(q));
            }
        }
        leaves.join(" ")
    }

    pub fn codes(&mut self) -> Vec<ErrorCode> {
        self.diags.flush().iter().map(|d| d.code).collect()
    }

    pub fn messages(&mut self) -> Vec<Diagnostic> {
        self.diags.flush()
    }
}

/// Lex `src` without parsing.
pub(crate) fn lexed_with(options: Options, src: &str) -> Parsed {
    let mut program = Program::new(options);
    let mut diags = DiagnosticQueue::new();
    let top = lex(&mut program, "test.a68", src, &MemoryLoader::new(), &mut diags).unwrap();
    Parsed { program, diags, top }
}

pub(crate) fn lexed(src: &str) -> Parsed {
    lexed_with(Options::default(), src)
}

/// Lex and parse `src`.
pub(crate) fn parsed_with(options: Options, src: &str) -> Parsed {
    let mut parsed = lexed_with(options, src);
    parsed.top = crate::parse(&mut parsed.program, &mut parsed.diags).unwrap();
    parsed
}

pub(crate) fn parsed(src: &str) -> Parsed {
    parsed_with(Options::default(), src)
}
