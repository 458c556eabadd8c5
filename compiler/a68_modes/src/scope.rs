//! Static scope checking.
//!
//! Every routine and format text gets its youngest environ: the deepest
//! level of a tag it uses from outside itself. A value may not be kept
//! in a name that outlives the ranges the value depends on. What can be
//! decided statically is warned about; the run time checks the rest.
//!
//! A name into a flexible row may stop referring to anything once the row
//! is assigned a new size, so it may not be kept at all.

use a68_diagnostic::{error_at, warning_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{Attribute, HeapQualifier, MoidKind, NodeId, Program, Status, TagId, PRIMAL_SCOPE};
use rustc_hash::FxHashMap;

use crate::checker::WRAPPERS;

#[tracing::instrument(level = "debug", skip_all)]
pub fn check(program: &mut Program, top: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult {
    let nodes = program.tree.preorder(Some(top));
    let mut texts = 0usize;
    for &p in &nodes {
        if matches!(program.tree.attribute(p), Attribute::RoutineText | Attribute::FormatText) {
            let environ = youngest_environ(program, p);
            let node = &mut program.tree[p];
            node.youngest_environ = Some(environ);
            node.status |= Status::SCOPE_CHECKED;
            texts += 1;
        }
    }
    let scopes = Scopes::new(program, &nodes);
    for &p in &nodes {
        match program.tree.attribute(p) {
            Attribute::Assignation => scopes.assignation(p, diags)?,
            Attribute::RoutineText => scopes.routine_body(p, diags)?,
            Attribute::IdentityDeclaration
            | Attribute::VariableDeclaration
            | Attribute::ProcedureDeclaration
            | Attribute::ProcedureVariableDeclaration => {
                for source in sources(program, p) {
                    transient(program, source, diags)?;
                }
            }
            Attribute::Argument => {
                for u in program.tree.child_ids(p) {
                    if program.tree.is(u, Attribute::Unit) {
                        transient(program, u, diags)?;
                    }
                }
            }
            _ => {}
        }
    }
    tracing::debug!(texts, "scope check complete");
    Ok(())
}

/// Level of the range a routine or format text opens.
fn own_level(program: &Program, text: NodeId) -> u32 {
    let tree = &program.tree;
    let outer = tree[text].table.map_or(PRIMAL_SCOPE, |t| program.tables.table(t).level);
    if tree.is(text, Attribute::FormatText) {
        return outer + 1;
    }
    tree.children(text)
        .filter(|&c| !tree.is(c, Attribute::ParameterPack))
        .find_map(|c| tree[c].table)
        .map_or(outer + 1, |t| program.tables.table(t).level)
}

fn youngest_environ(program: &Program, text: NodeId) -> u32 {
    let own = own_level(program, text);
    program
        .tree
        .descendants(text)
        .into_iter()
        .filter(|&q| matches!(program.tree.attribute(q), Attribute::Identifier | Attribute::Operator))
        .filter_map(|q| program.tree[q].tag)
        .map(|tag| program.tables.tag(tag).scope)
        .filter(|&scope| scope < own)
        .max()
        .unwrap_or(PRIMAL_SCOPE)
}

/// Scopes of names declared by tag: those a variable declaration
/// generates, and those an identity declaration takes from a generator.
struct Scopes<'a> {
    program: &'a Program,
    names: FxHashMap<TagId, u32>,
}

impl<'a> Scopes<'a> {
    fn new(program: &'a Program, nodes: &[NodeId]) -> Self {
        let tree = &program.tree;
        let mut names = FxHashMap::default();
        for &p in nodes {
            match tree.attribute(p) {
                Attribute::VariableDeclaration | Attribute::ProcedureVariableDeclaration => {
                    for d in tree.children(p).filter(|&d| tree.is(d, Attribute::DefiningIdentifier)) {
                        let Some(id) = tree[d].tag else {
                            continue;
                        };
                        let tag = program.tables.tag(id);
                        let scope = if tag.heap == HeapQualifier::Heap { PRIMAL_SCOPE } else { tag.scope };
                        names.insert(id, scope);
                    }
                }
                Attribute::IdentityDeclaration => {
                    for d in tree.children(p).filter(|&d| tree.is(d, Attribute::DefiningIdentifier)) {
                        let source = tree.next(d).and_then(|joiner| tree.next(joiner));
                        let generated = source
                            .and_then(|u| value_phrase(program, u))
                            .filter(|&g| tree.is(g, Attribute::Generator));
                        if let (Some(id), Some(g)) = (tree[d].tag, generated) {
                            names.insert(id, generator_scope(program, g));
                        }
                    }
                }
                _ => {}
            }
        }
        Scopes { program, names }
    }

    /// Scope of the value unit `p` yields, when it is a name or a routine
    /// whose scope can be told statically.
    fn scope_of(&self, p: NodeId) -> Option<u32> {
        let program = self.program;
        let tree = &program.tree;
        let q = value_phrase(program, p)?;
        match tree.attribute(q) {
            Attribute::Identifier => {
                let id = tree[q].tag?;
                let tag = program.tables.tag(id);
                if tag.is_routine {
                    return tag.body.and_then(|b| tree[b].youngest_environ);
                }
                self.names.get(&id).copied()
            }
            Attribute::Generator => Some(generator_scope(program, q)),
            Attribute::RoutineText | Attribute::FormatText => tree[q].youngest_environ,
            Attribute::Slice => tree.sub(q).and_then(|primary| self.scope_of(primary)),
            Attribute::Selection => tree
                .sub(q)
                .map(|field| tree.last_sibling(field))
                .and_then(|secondary| self.scope_of(secondary)),
            _ => None,
        }
    }

    fn assignation(&self, p: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult {
        let program = self.program;
        let children = program.tree.child_ids(p);
        let [destination, _, source] = children.as_slice() else {
            return Ok(());
        };
        transient(program, *source, diags)?;
        if let (Some(d), Some(s)) = (self.scope_of(*destination), self.scope_of(*source)) {
            if s > d {
                escape(program, *source, diags)?;
            }
        }
        Ok(())
    }

    /// A routine may not yield a name or routine local to itself.
    fn routine_body(&self, routine: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult {
        let program = self.program;
        let Some(body) = program.tree.sub(routine).map(|first| program.tree.last_sibling(first)) else {
            return Ok(());
        };
        transient(program, body, diags)?;
        let own = own_level(program, routine);
        if self.scope_of(body).is_some_and(|s| s >= own) {
            escape(program, body, diags)?;
        }
        Ok(())
    }
}

/// A HEAP generator yields a global name; a LOC one, a name of its range.
fn generator_scope(program: &Program, g: NodeId) -> u32 {
    let tree = &program.tree;
    let local = tree.sub(g).is_some_and(|s| tree.is(s, Attribute::LocSymbol));
    if !local {
        return PRIMAL_SCOPE;
    }
    tree[g].table.map_or(PRIMAL_SCOPE, |t| program.tables.table(t).level)
}

/// The phrase whose value unit `p` passes on unchanged, or `None` where
/// a coercion makes a new value.
fn value_phrase(program: &Program, p: NodeId) -> Option<NodeId> {
    let tree = &program.tree;
    let mut q = p;
    loop {
        let attr = tree.attribute(q);
        q = if WRAPPERS.contains(&attr) || matches!(attr, Attribute::Rowing | Attribute::Uniting) {
            tree.sub(q)?
        } else if attr == Attribute::ClosedClause {
            let serial = tree.find_child(q, Attribute::SerialClause)?;
            tree.sub(serial).map(|first| tree.last_sibling(first))?
        } else if matches!(attr, Attribute::Dereferencing | Attribute::Deproceduring | Attribute::Voiding) {
            return None;
        } else {
            return Some(q);
        };
    }
}

/// Whether the value of `p` is a routine rather than a name.
fn is_routine_value(program: &Program, p: NodeId) -> bool {
    program
        .moid_of(p)
        .is_some_and(|m| program.moids.is(m, MoidKind::Proc))
}

fn escape(program: &Program, p: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult {
    let span = program.tree[p].span;
    let diag = if is_routine_value(program, p) {
        warning_at(ErrorCode::E4001, span, "routine may be used outside the ranges it depends on")
    } else {
        warning_at(ErrorCode::E4002, span, "name may outlive the range it was generated in")
    };
    diags.report(diag)
}

/// Source units of the declarations in `p`.
fn sources(program: &Program, p: NodeId) -> Vec<NodeId> {
    let tree = &program.tree;
    tree.children(p)
        .filter(|&d| tree.is(d, Attribute::DefiningIdentifier))
        .filter_map(|d| tree.next(d).and_then(|joiner| tree.next(joiner)))
        .filter(|&u| tree.is(u, Attribute::Unit))
        .collect()
}

/// Report a transient name that unit `p` would keep.
fn transient(program: &Program, p: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult {
    let tree = &program.tree;
    let mut q = Some(p);
    while let Some(n) = q {
        if tree[n].status.contains(Status::TRANSIENT) {
            let message = "a name into a flexible row may not be kept";
            return diags.report(error_at(ErrorCode::E4003, tree[p].span, message));
        }
        let attr = tree.attribute(n);
        q = if WRAPPERS.contains(&attr) || matches!(attr, Attribute::Rowing | Attribute::Uniting) {
            tree.sub(n)
        } else if attr == Attribute::ClosedClause {
            tree.find_child(n, Attribute::SerialClause)
                .and_then(|serial| tree.sub(serial))
                .map(|first| tree.last_sibling(first))
        } else {
            None
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests;
