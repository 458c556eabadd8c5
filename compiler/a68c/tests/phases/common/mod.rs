//! Shared helpers for the phase tests.
//!
//! Every helper drives the real [`Compiler`] on an in-memory source, so
//! the phases run exactly as the command line runs them.

use a68_diagnostic::emitter::ColorMode;
use a68_diagnostic::ErrorCode;
use a68_ir::{Attribute, MoidId, NodeId, Options, Program};
use a68_lexer::MemoryLoader;
use a68c::{Compiler, Config, Outcome};

pub fn config(options: Options) -> Config {
    Config {
        options,
        color: ColorMode::Never,
        ..Config::default()
    }
}

/// Run the front end on `src` with `options`.
pub fn check_with(options: Options, src: &str) -> (Compiler, Outcome) {
    check_loading(options, src, &MemoryLoader::new())
}

pub fn check_loading(options: Options, src: &str, loader: &MemoryLoader) -> (Compiler, Outcome) {
    let mut compiler = Compiler::new(config(options));
    let outcome = compiler.check("test.a68", src, loader);
    (compiler, outcome)
}

/// Run the front end and insist that it reports nothing at all.
pub fn check_ok(src: &str) -> Compiler {
    let (mut compiler, outcome) = check_with(Options::default(), src);
    let diagnostics = compiler.diags.flush();
    assert!(outcome.is_ok() && diagnostics.is_empty(), "{src}\n{diagnostics:#?}");
    compiler
}

/// Error codes the front end reports for `src`, in source order.
pub fn codes(src: &str) -> Vec<ErrorCode> {
    codes_with(Options::default(), src)
}

pub fn codes_with(options: Options, src: &str) -> Vec<ErrorCode> {
    let (mut compiler, _) = check_with(options, src);
    compiler.diags.flush().into_iter().map(|d| d.code).collect()
}

/// Check and generate C at `level`, insisting on a clean front end.
pub fn compile_at(level: u8, src: &str) -> (Compiler, Outcome) {
    let mut compiler = Compiler::new(config(Options::default().with_optimise(level)));
    let outcome = compiler.compile("test.a68", src, &MemoryLoader::new());
    assert!(outcome.is_ok(), "{src}\n{:#?}", compiler.diags.flush());
    (compiler, outcome)
}

/// Nodes with `attr`, in pre-order.
pub fn all(program: &Program, attr: Attribute) -> Vec<NodeId> {
    program
        .tree
        .preorder(program.tree.top)
        .into_iter()
        .filter(|&p| program.tree.is(p, attr))
        .collect()
}

/// Nodes with `attr` spelt `text`.
pub fn named(program: &Program, attr: Attribute, text: &str) -> Vec<NodeId> {
    all(program, attr)
        .into_iter()
        .filter(|&p| program.text(p) == text)
        .collect()
}

/// Rendered mode of the node at `p`.
pub fn mode_of(program: &Program, p: NodeId) -> String {
    program
        .moid_of(p)
        .map(|m| program.moid_text(program.moids.canonical(m)))
        .unwrap_or_default()
}

/// Canonical mode of the tag declared as `text`.
pub fn tag_moid(program: &Program, text: &str) -> MoidId {
    let defining = named(program, Attribute::DefiningIdentifier, text)[0];
    let tag = program.tree[defining].tag.expect("declared tag");
    let moid = program.tables.tag(tag).moid.expect("tag mode");
    program.moids.canonical(moid)
}

pub fn tag_mode(program: &Program, text: &str) -> String {
    program.moid_text(tag_moid(program, text))
}

/// Attributes from `p` down through first children.
pub fn spine(program: &Program, p: NodeId) -> Vec<Attribute> {
    std::iter::successors(Some(p), |&q| program.tree.sub(q))
        .map(|q| program.tree.attribute(q))
        .collect()
}
