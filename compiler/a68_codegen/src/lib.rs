//! Optimising C code generator for checked Algol 68 programs.
//!
//! The interpreter executes a program by walking its tree. A unit whose
//! modes map onto C values can instead run as a compiled C function with
//! the run time's propagator signature, `PROPAGATOR_T f (NODE_T *p)`.
//! The run time calls the function in place of interpreting the node.
//!
//! # Architecture
//!
//! ```text
//! checked Program
//!        ↓
//!   classify      (which construct a unit is, and whether it is basic)
//!        ↓
//!   fold          (a unit with a value known now becomes a literal)
//!        ↓
//!   declare / execute / yield   (three passes over each basic unit,
//!        ↓                        sharing fetches through the book)
//!   CodegenResult (C source, compiled unit names)
//! ```
//!
//! The optimise level is cumulative:
//! 1. denotations
//! 2. basic units: identifiers, slices, selections, formulae, casts,
//!    identity relations, assignations, calls of standard routines
//! 3. fetches shared through the book, frame objects of the current range
//!    addressed directly, calls of user procedures
//! 4. enclosed clauses: closed, collateral, conditional, case and loop
//!
//! A unit the generator cannot finish is abandoned with a warning and
//! left to the interpreter.

mod basic;
pub mod book;
mod clauses;
mod context;
pub mod fold;
mod inline;
pub mod modes;
pub mod prelude;
mod units;

#[cfg(test)]
mod test_util;

use a68_diagnostic::{warning_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{Attribute, NodeId, Program, Status, TableId, Tree};
use a68_stack::ensure_sufficient_stack;
use tracing::debug;

pub use book::{same_tree, Action, Book};
pub use context::CodegenContext;
pub use fold::{fold, Value};
pub use modes::CMode;
pub use units::Construct;

/// Wrappers that pass their only child's value through.
pub(crate) const WRAPPERS: &[Attribute] = &[
    Attribute::Unit,
    Attribute::Tertiary,
    Attribute::Secondary,
    Attribute::Primary,
    Attribute::EnclosedClause,
];

/// A unit, or a coercion inserted around one.
pub(crate) fn is_unit(tree: &Tree, p: NodeId) -> bool {
    let attr = tree.attribute(p);
    attr == Attribute::Unit || attr.is_coercion()
}

/// Pass over a basic unit.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Pass {
    /// Declare the C variables the unit needs.
    Declare,
    /// Fetch operands into the declared variables.
    Execute,
    /// The C expression that is the unit's value.
    Yield,
}

/// One unit compiled to a C function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledUnit {
    pub node: NodeId,
    pub name: String,
    pub construct: Construct,
    /// The unit folded to a constant.
    pub constant: bool,
}

/// Result of code generation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodegenResult {
    /// Generated C source, empty when nothing was compiled.
    pub code: String,
    pub units: Vec<CompiledUnit>,
}

impl CodegenResult {
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn unit(&self, node: NodeId) -> Option<&CompiledUnit> {
        self.units.iter().find(|u| u.node == node)
    }
}

/// Why a unit was given up half way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Abandon {
    pub node: NodeId,
    pub reason: &'static str,
}

pub(crate) type Emit<T = ()> = Result<T, Abandon>;

pub(crate) fn abandon<T>(node: NodeId, reason: &'static str) -> Emit<T> {
    Err(Abandon { node, reason })
}

/// Compile the basic units of the program at `top` to C.
///
/// Does nothing at optimise level 0. Compiled nodes get their function
/// name and the `COMPILED` status; folded ones also `CONSTANT`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn generate(program: &mut Program, top: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult<CodegenResult> {
    let level = program.options.optimise;
    if level == 0 {
        return Ok(CodegenResult::default());
    }
    let mut generator = Generator::new(program, level);
    generator.walk(Some(top), diags)?;
    let result = generator.finish();
    for unit in &result.units {
        let node = &mut program.tree[unit.node];
        node.genie.compile_name = Some(unit.name.clone());
        node.status |= Status::COMPILED;
        if unit.constant {
            node.status |= Status::CONSTANT;
        }
    }
    debug!(units = result.units.len(), level, "code generation complete");
    Ok(result)
}

pub(crate) struct Generator<'a> {
    pub program: &'a Program,
    pub level: u8,
    pub ctx: CodegenContext,
    pub book: Book,
    /// Ranges whose frames are open, innermost last. The first is the
    /// range the compiled unit runs in.
    pub frames: Vec<Option<TableId>>,
    /// LONG values may be fetched; not inside a WHILE enquiry.
    pub long_mode_allowed: bool,
    /// `pop_sp` is declared in the current function.
    pub has_pop_sp: bool,
    code: String,
    units: Vec<CompiledUnit>,
}

impl<'a> Generator<'a> {
    fn new(program: &'a Program, level: u8) -> Self {
        Generator {
            program,
            level,
            ctx: CodegenContext::new(),
            book: Book::new(),
            frames: Vec::new(),
            long_mode_allowed: true,
            has_pop_sp: false,
            code: String::new(),
            units: Vec::new(),
        }
    }

    fn finish(self) -> CodegenResult {
        if self.units.is_empty() {
            return CodegenResult::default();
        }
        let mut code = prelude::prelude(self.level);
        code.push_str(&self.code);
        CodegenResult { code, units: self.units }
    }

    /// Compile what can be compiled along the sibling chain from `first`,
    /// descending into what cannot.
    fn walk(&mut self, first: Option<NodeId>, diags: &mut DiagnosticQueue) -> PhaseResult {
        let mut p = first;
        while let Some(q) = p {
            if !self.compile_unit(q, diags)? {
                let sub = self.program.tree.sub(q);
                ensure_sufficient_stack(|| self.walk(sub, diags))?;
            }
            p = self.program.tree.next(q);
        }
        Ok(())
    }

    fn compile_unit(&mut self, p: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult<bool> {
        if !is_unit(&self.program.tree, p) {
            return Ok(false);
        }
        let Some(construct) = self.classify(p) else {
            return Ok(false);
        };
        self.start_function(p);
        match self.emit(p, construct) {
            Ok(constant) => {
                let name = format!("{}_{}_{}", self.base_name(p, construct), construct.as_str(), p.raw());
                tracing::trace!(node = p.raw(), %name, "compiled");
                let text = self.ctx.finish(&name, p);
                self.code.push('\n');
                self.code.push_str(&text);
                self.units.push(CompiledUnit {
                    node: p,
                    name,
                    construct,
                    constant,
                });
                Ok(true)
            }
            Err(Abandon { node, reason }) => {
                self.ctx.discard();
                let span = self.program.tree[node].span;
                let construct = construct.as_str();
                diags.report(warning_at(
                    ErrorCode::E6001,
                    span,
                    format!("{construct} not compiled: {reason}"),
                ))?;
                Ok(false)
            }
        }
    }

    fn start_function(&mut self, p: NodeId) {
        self.ctx.discard();
        self.book.reset();
        self.frames.clear();
        self.frames.push(self.program.tree[p].table);
        self.long_mode_allowed = true;
        self.has_pop_sp = false;
    }

    /// Declare `pop_sp` once per function.
    pub(crate) fn pop_sp(&mut self) {
        if !self.has_pop_sp {
            self.ctx.declare("ADDR_T pop_sp;");
            self.has_pop_sp = true;
        }
    }

    /// Book sharing and direct frame addressing start at level 3.
    pub(crate) fn shares_fetches(&self) -> bool {
        self.level >= 3
    }

    /// The phrase below the wrappers of `p`.
    pub(crate) fn phrase(&self, p: NodeId) -> NodeId {
        self.program.tree.descend(p, WRAPPERS)
    }
}

#[cfg(test)]
mod tests;
