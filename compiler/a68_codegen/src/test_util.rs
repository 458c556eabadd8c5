//! Helpers shared by the generator's unit tests.

use a68_diagnostic::{DiagnosticQueue, ErrorCode};
use a68_ir::{Attribute, NodeId, Options, Program};
use a68_lexer::{lex, MemoryLoader};

use crate::CodegenResult;

pub(crate) struct Compiled {
    pub program: Program,
    pub diags: DiagnosticQueue,
    pub result: CodegenResult,
}

impl Compiled {
    /// Every node with `attr`, in pre-order.
    pub fn all(&self, attr: Attribute) -> Vec<NodeId> {
        let tree = &self.program.tree;
        tree.preorder(tree.top).into_iter().filter(|&p| tree.is(p, attr)).collect()
    }

    /// Names of the compiled functions, in order.
    pub fn names(&self) -> Vec<&str> {
        self.result.units.iter().map(|u| u.name.as_str()).collect()
    }

    pub fn codes(&mut self) -> Vec<ErrorCode> {
        self.diags.flush().iter().map(|d| d.code).collect()
    }
}

/// Lex, parse, analyse and generate `src` at optimise `level`.
pub(crate) fn compiled(level: u8, src: &str) -> Compiled {
    let mut program = Program::new(Options::default().with_optimise(level));
    let mut diags = DiagnosticQueue::new();
    lex(&mut program, "test.a68", src, &MemoryLoader::new(), &mut diags).unwrap();
    let top = a68_parse::parse(&mut program, &mut diags).unwrap().unwrap();
    a68_modes::analyse(&mut program, top, &mut diags).unwrap();
    assert!(!diags.has_errors(), "{:?}", diags.flush());
    let result = crate::generate(&mut program, top, &mut diags).unwrap();
    Compiled { program, diags, result }
}
