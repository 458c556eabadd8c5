//! Coercion insertion.
//!
//! Each coercion the checker recorded becomes a node wrapped around its
//! unit. The unit keeps its node id and turns into the outermost coercion,
//! so references to it taken during checking stay valid.

use a68_diagnostic::{warning_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{Attribute, MoidId, MoidKind, NodeId, Program};
use rustc_hash::FxHashMap;

use crate::checker::{Coercion, WRAPPERS};
use crate::coercion::is_lengthening;

/// Phrases whose value nobody would compute only to throw it away.
const POINTLESS: &[Attribute] = &[
    Attribute::Denotation,
    Attribute::Identifier,
    Attribute::Slice,
    Attribute::Selection,
    Attribute::IdentityRelation,
];

#[tracing::instrument(level = "debug", skip_all)]
pub fn insert(program: &mut Program, coercions: &[Coercion], diags: &mut DiagnosticQueue) -> PhaseResult {
    // A unit settled twice keeps its last path.
    let mut last: FxHashMap<NodeId, usize> = FxHashMap::default();
    for (i, c) in coercions.iter().enumerate() {
        last.insert(c.node, i);
    }
    let mut inserted = 0usize;
    for (i, c) in coercions.iter().enumerate() {
        if last.get(&c.node) != Some(&i) {
            continue;
        }
        let Some(from) = program.moid_of(c.node) else {
            continue;
        };
        check_portability(program, c, from, diags)?;
        check_voiding(program, c, diags)?;
        for step in &c.path {
            program.tree.make_sub(c.node, c.node, step.attribute);
            program.tree[c.node].moid = Some(step.to);
            inserted += 1;
        }
    }
    tracing::debug!(inserted, "coercion insertion complete");
    Ok(())
}

/// Widenings that change the length of a mode are an extension.
fn check_portability(program: &Program, c: &Coercion, from: MoidId, diags: &mut DiagnosticQueue) -> PhaseResult {
    if !program.options.portcheck {
        return Ok(());
    }
    let mut prev = from;
    for step in &c.path {
        if step.attribute == Attribute::Widening && is_lengthening(&program.moids, prev, step.to) {
            let message = format!(
                "widening {} to {} is not portable",
                program.moid_text(prev),
                program.moid_text(step.to)
            );
            diags.report(warning_at(ErrorCode::E5003, program.tree[c.node].span, message))?;
        }
        prev = step.to;
    }
    Ok(())
}

/// A value computed only to be voided is worth a warning, unless a cast
/// or a call asked for it.
fn check_voiding(program: &Program, c: &Coercion, diags: &mut DiagnosticQueue) -> PhaseResult {
    let voided = c.path.last().is_some_and(|s| s.attribute == Attribute::Voiding);
    if !voided || c.cast || c.path.iter().any(|s| s.attribute == Attribute::Deproceduring) {
        return Ok(());
    }
    let inner = program.tree.descend(c.node, WRAPPERS);
    let pointless = match program.tree.attribute(inner) {
        Attribute::Formula | Attribute::MonadicFormula => program
            .moid_of(inner)
            .is_some_and(|m| !program.moids.is(m, MoidKind::Ref)),
        attr => POINTLESS.contains(&attr),
    };
    if pointless {
        let from = program.moid_of(c.node).map(|m| program.moid_text(m)).unwrap_or_default();
        let message = format!("value of mode {from} is voided");
        diags.report(warning_at(ErrorCode::E3016, program.tree[c.node].span, message))?;
    }
    Ok(())
}
