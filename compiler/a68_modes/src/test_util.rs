//! Helpers shared by the mode checker's unit tests.

use a68_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use a68_ir::{Attribute, MoidId, NodeId, Options, Program};
use a68_lexer::{lex, MemoryLoader};

pub(crate) struct Analysed {
    pub program: Program,
    pub diags: DiagnosticQueue,
    pub top: Option<NodeId>,
}

impl Analysed {
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

    /// Nodes with `attr` whose symbol is `text`.
    pub fn named(&self, attr: Attribute, text: &str) -> Vec<NodeId> {
        self.all(attr)
            .into_iter()
            .filter(|&p| self.program.text(p) == text)
            .collect()
    }

    /// Mode of the tag declared as `text`, rendered.
    pub fn tag_mode(&self, text: &str) -> String {
        let defining = self.named(Attribute::DefiningIdentifier, text)[0];
        let tag = self.program.tree[defining].tag.unwrap();
        let moid = self.program.tables.tag(tag).moid.unwrap();
        self.program.moid_text(self.program.moids.canonical(moid))
    }

    pub fn mode(&self, p: NodeId) -> MoidId {
        self.program.moid_of(p).unwrap()
    }

    pub fn mode_text(&self, p: NodeId) -> String {
        self.program.moid_text(self.mode(p))
    }

    /// Attributes of the chain from `p` down through first children.
    pub fn spine(&self, p: NodeId) -> Vec<Attribute> {
        let tree = &self.program.tree;
        std::iter::successors(Some(p), |&q| tree.sub(q))
            .map(|q| tree.attribute(q))
            .collect()
    }

    pub fn codes(&mut self) -> Vec<ErrorCode> {
        self.diags.flush().iter().map(|d| d.code).collect()
    }

    pub fn messages(&mut self) -> Vec<Diagnostic> {
        self.diags.flush()
    }
}

/// Lex and parse `src`.
pub(crate) fn parsed_with(options: Options, src: &str) -> Analysed {
    let mut program = Program::new(options);
    let mut diags = DiagnosticQueue::new();
    lex(&mut program, "test.a68", src, &MemoryLoader::new(), &mut diags).unwrap();
    let top = a68_parse::parse(&mut program, &mut diags).unwrap();
    Analysed { program, diags, top }
}

/// Lex, parse and run every mode phase on `src`.
pub(crate) fn analysed_with(options: Options, src: &str) -> Analysed {
    let mut analysed = parsed_with(options, src);
    if let Some(top) = analysed.top {
        crate::analyse(&mut analysed.program, top, &mut analysed.diags).unwrap();
    }
    analysed
}

pub(crate) fn analysed(src: &str) -> Analysed {
    analysed_with(Options::default(), src)
}

pub(crate) fn parsed(src: &str) -> Analysed {
    parsed_with(Options::default(), src)
}
