//! The equivalencing fixpoint.
//!
//! ```text
//! resolve indicants -> well-formedness
//!   loop {
//!     absorb unions -> derive forms -> find equivalences
//!       -> repoint -> contract unions
//!   } until nothing changes
//! repoint tree, tags and tables
//! ```
//!
//! On return every mode reachable from the program is its class's
//! representative: the lowest-numbered member, so standard modes always
//! represent their class.

use a68_diagnostic::{error_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{MoidArena, MoidId, MoidKind, PackEntry, Program, Span};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::collect::indicant_body;
use crate::derive;
use crate::equivalence::Equivalencer;
use crate::well_formed;

/// Rounds after which the fixpoint gives up.
const MAX_ROUNDS: usize = 64;

/// Resolve indicants and reduce the mode list to one mode per class.
#[tracing::instrument(level = "debug", skip_all)]
pub fn expand_contract(program: &mut Program, diags: &mut DiagnosticQueue) -> PhaseResult {
    resolve_indicants(program);
    well_formed::check(program, diags)?;
    let mut rounds = 0;
    loop {
        let before = program.moids.len();
        let mut changed = absorb_unions(program, diags)?;
        for m in representatives(&program.moids) {
            derive::derive(&mut program.moids, m);
        }
        changed |= find_equivalences(&mut program.moids);
        repoint(&mut program.moids);
        changed |= contract_unions(program, diags)?;
        changed |= program.moids.len() != before;
        rounds += 1;
        if !changed || rounds >= MAX_ROUNDS {
            break;
        }
    }
    repoint_program(program);
    tracing::debug!(rounds, moids = program.moids.len(), "mode equivalencing complete");
    Ok(())
}

/// Point every indicant placeholder at its definition.
pub fn resolve_indicants(program: &mut Program) {
    let indicants: Vec<MoidId> = program
        .moids
        .ids()
        .filter(|&m| program.moids.is(m, MoidKind::Indicant) && program.moids[m].equivalent.is_none())
        .collect();
    for m in indicants {
        let body = indicant_body(program, m).unwrap_or(MoidId::ERROR);
        program.moids[m].equivalent = Some(body);
    }
}

/// Modes that represent their class, indicants excluded.
fn representatives(moids: &MoidArena) -> Vec<MoidId> {
    moids
        .ids()
        .filter(|&m| moids[m].equivalent.is_none() && !moids.is(m, MoidKind::Indicant))
        .collect()
}

fn span_of(program: &Program, m: MoidId) -> Option<Span> {
    let moid = &program.moids[m];
    if moid.derivate {
        return None;
    }
    moid.node.map(|p| program.tree[p].span)
}

/// `UNION (A, UNION (B, C))` becomes `UNION (A, B, C)`.
fn absorb_unions(program: &mut Program, diags: &mut DiagnosticQueue) -> PhaseResult<bool> {
    let mut changed = false;
    for u in representatives(&program.moids) {
        if !program.moids.is(u, MoidKind::Union) {
            continue;
        }
        let members: SmallVec<[MoidId; 8]> = program.moids[u]
            .pack
            .iter()
            .map(|e| program.moids.canonical(e.moid))
            .collect();
        if !members.iter().any(|&m| m != u && program.moids.is(m, MoidKind::Union)) {
            continue;
        }
        let mut flat: SmallVec<[MoidId; 8]> = members
            .iter()
            .copied()
            .filter(|&m| !program.moids.is(m, MoidKind::Union))
            .collect();
        for &nested in members.iter().filter(|&&m| m != u && program.moids.is(m, MoidKind::Union)) {
            let inner: SmallVec<[MoidId; 8]> = program.moids[nested]
                .pack
                .iter()
                .map(|e| program.moids.canonical(e.moid))
                .collect();
            let overlap = inner.iter().filter(|m| flat.contains(m)).count();
            if overlap > 0 {
                if let Some(span) = span_of(program, u) {
                    let (code, what) = if overlap == inner.len() {
                        (ErrorCode::E2006, "is a subset of the other components")
                    } else {
                        (ErrorCode::E2005, "shares components with the others")
                    };
                    let text = program.moid_text(nested);
                    diags.report(error_at(code, span, format!("united component {text} {what}")))?;
                }
            }
            for m in inner {
                if !flat.contains(&m) {
                    flat.push(m);
                }
            }
        }
        set_pack(&mut program.moids, u, &flat);
        changed = true;
    }
    Ok(changed)
}

fn set_pack(moids: &mut MoidArena, u: MoidId, members: &[MoidId]) {
    let moid = &mut moids[u];
    moid.pack = members.iter().map(|&m| PackEntry::new(m)).collect();
    moid.dim = members.len() as i32;
}

/// Merge every class of equivalent modes into its lowest member.
fn find_equivalences(moids: &mut MoidArena) -> bool {
    let mut buckets: FxHashMap<(MoidKind, i32), Vec<MoidId>> = FxHashMap::default();
    for m in representatives(moids) {
        let moid = &moids[m];
        let dim = if moid.kind == MoidKind::Union { 0 } else { moid.dim };
        buckets.entry((moid.kind, dim)).or_default().push(m);
    }
    let mut merges = Vec::new();
    {
        let mut eq = Equivalencer::new(moids);
        for bucket in buckets.values() {
            let mut merged = vec![false; bucket.len()];
            for i in 0..bucket.len() {
                if merged[i] {
                    continue;
                }
                for j in i + 1..bucket.len() {
                    if !merged[j] && eq.equivalent(bucket[i], bucket[j]) {
                        merged[j] = true;
                        merges.push((bucket[j], bucket[i]));
                    }
                }
            }
        }
    }
    for &(from, to) in &merges {
        moids[from].equivalent = Some(to);
    }
    !merges.is_empty()
}

/// Rewrite the components and derived forms of representatives to
/// representatives.
fn repoint(moids: &mut MoidArena) {
    for m in representatives(moids) {
        let canon = |x: Option<MoidId>| x.map(|x| moids.canonical(x));
        let moid = &moids[m];
        let sub = canon(moid.sub);
        let pack: Vec<MoidId> = moid.pack.iter().map(|e| moids.canonical(e.moid)).collect();
        let derived = [
            canon(moid.slice),
            canon(moid.deflexed),
            canon(moid.name),
            canon(moid.multiple),
            canon(moid.trim),
            canon(moid.rowed),
        ];
        let moid = &mut moids[m];
        moid.sub = sub;
        for (entry, to) in moid.pack.iter_mut().zip(pack) {
            entry.moid = to;
        }
        [moid.slice, moid.deflexed, moid.name, moid.multiple, moid.trim, moid.rowed] = derived;
    }
}

/// Drop union members that became equivalent.
fn contract_unions(program: &mut Program, diags: &mut DiagnosticQueue) -> PhaseResult<bool> {
    let mut changed = false;
    for u in representatives(&program.moids) {
        if !program.moids.is(u, MoidKind::Union) {
            continue;
        }
        let members: SmallVec<[MoidId; 8]> = program.moids[u].pack.iter().map(|e| e.moid).collect();
        let mut kept: SmallVec<[MoidId; 8]> = SmallVec::new();
        for &m in &members {
            if !kept.contains(&m) {
                kept.push(m);
            }
        }
        if kept.len() == members.len() {
            continue;
        }
        if let Some(span) = span_of(program, u) {
            let text = program.moid_text(u);
            diags.report(error_at(
                ErrorCode::E2005,
                span,
                format!("components of {text} are related"),
            ))?;
        }
        set_pack(&mut program.moids, u, &kept);
        changed = true;
    }
    Ok(changed)
}

/// Point nodes, tags and tables at representatives.
fn repoint_program(program: &mut Program) {
    for p in program.tree.preorder(program.tree.top) {
        if let Some(m) = program.tree[p].moid {
            program.tree[p].moid = Some(program.moids.canonical(m));
        }
    }
    let tags: Vec<_> = program.tables.tag_ids().collect();
    for t in tags {
        if let Some(m) = program.tables.tag(t).moid {
            program.tables.tag_mut(t).moid = Some(program.moids.canonical(m));
        }
    }
    let tables: Vec<_> = program.tables.table_ids().collect();
    for t in tables {
        let mut seen = Vec::new();
        for &m in &program.tables.table(t).moids {
            let c = program.moids.canonical(m);
            if !seen.contains(&c) {
                seen.push(c);
            }
        }
        program.tables.table_mut(t).moids = seen;
    }
}

#[cfg(test)]
mod tests;
