//! Relations that make a program ambiguous.
//!
//! The members of a union must not be firmly related, or a firm position
//! could not tell which member a value unites to. Two operators with the
//! same symbol in one range must not have firmly related operands, or a
//! formula could not tell which one it applies.

use a68_diagnostic::{error_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{MoidId, MoidKind, Program, Span, TableId, TagId};
use smallvec::SmallVec;

use crate::coercion::is_firmly_related;

/// Report firmly related union members and operators.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check(program: &Program, diags: &mut DiagnosticQueue) -> PhaseResult {
    unions(program, diags)?;
    for table in program.tables.table_ids().filter(|&t| t != TableId::STANDENV) {
        operators(program, table, diags)?;
    }
    Ok(())
}

fn unions(program: &Program, diags: &mut DiagnosticQueue) -> PhaseResult {
    let moids = &program.moids;
    for u in moids.ids() {
        let moid = &moids[u];
        if moid.kind != MoidKind::Union || moid.equivalent.is_some() || moid.derivate || !moid.well_formed {
            continue;
        }
        let Some(node) = moid.node else {
            continue;
        };
        let members: SmallVec<[MoidId; 8]> = moid.pack.iter().map(|e| moids.canonical(e.moid)).collect();
        'pairs: for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                if a == MoidId::ERROR || b == MoidId::ERROR {
                    continue;
                }
                if is_firmly_related(moids, a, b) {
                    diags.report(error_at(
                        ErrorCode::E2007,
                        program.tree[node].span,
                        format!(
                            "{} has firmly related components {} and {}",
                            program.moid_text(u),
                            program.moid_text(a),
                            program.moid_text(b)
                        ),
                    ))?;
                    break 'pairs;
                }
            }
        }
    }
    Ok(())
}

fn operands(program: &Program, tag: TagId) -> Option<SmallVec<[MoidId; 2]>> {
    let m = program.moids.canonical(program.tables.tag(tag).moid?);
    if !program.moids.is(m, MoidKind::Proc) {
        return None;
    }
    Some(program.moids[m].pack.iter().map(|e| program.moids.canonical(e.moid)).collect())
}

fn operators(program: &Program, table: TableId, diags: &mut DiagnosticQueue) -> PhaseResult {
    let ops = &program.tables.table(table).operators;
    for (i, &a) in ops.iter().enumerate() {
        let Some(pa) = operands(program, a) else {
            continue;
        };
        for &b in &ops[i + 1..] {
            if program.tables.tag(a).name != program.tables.tag(b).name {
                continue;
            }
            let Some(pb) = operands(program, b) else {
                continue;
            };
            let related = pa.len() == pb.len()
                && pa.iter().zip(&pb).all(|(&x, &y)| is_firmly_related(&program.moids, x, y));
            if related {
                let span = program.tables.tag(b).node.map_or(Span::DUMMY, |p| program.tree[p].span);
                let text = program.interner.lookup(program.tables.tag(b).name);
                diags.report(error_at(
                    ErrorCode::E2008,
                    span,
                    format!("operator \"{text}\" is declared twice with firmly related operands"),
                ))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
