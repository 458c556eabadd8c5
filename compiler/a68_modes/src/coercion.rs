//! Coercibility.
//!
//! A coercion path is the sequence of coercions that takes a value of one
//! mode to another in a position of a given sort. The checker asks whether
//! a path exists; the inserter wraps the unit in one node per step.
//!
//! Steps are ordered the way they apply: dereferencing and deproceduring
//! first, then one of uniting, widening or rowing, and voiding last.

use a68_ir::{Attribute, MoidArena, MoidId, MoidKind};
use a68_stack::ensure_sufficient_stack;
use smallvec::{smallvec, SmallVec};

use crate::soid::{Deflexing, Sort};

/// One coercion and the mode it yields.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub attribute: Attribute,
    pub to: MoidId,
}

impl Step {
    fn new(attribute: Attribute, to: MoidId) -> Self {
        Step { attribute, to }
    }
}

pub type Path = SmallVec<[Step; 4]>;

/// Widenings by source mode, lengthening to the longer mode of the same
/// kind first. A change of length is not portable.
const WIDENINGS: &[(MoidId, &[MoidId])] = &[
    (MoidId::INT, &[MoidId::LONG_INT, MoidId::REAL]),
    (MoidId::LONG_INT, &[MoidId::LONG_LONG_INT, MoidId::LONG_REAL]),
    (MoidId::LONG_LONG_INT, &[MoidId::LONG_LONG_REAL]),
    (MoidId::REAL, &[MoidId::LONG_REAL, MoidId::COMPLEX]),
    (MoidId::LONG_REAL, &[MoidId::LONG_LONG_REAL, MoidId::LONG_COMPLEX]),
    (MoidId::LONG_LONG_REAL, &[MoidId::LONG_LONG_COMPLEX]),
    (MoidId::COMPLEX, &[MoidId::LONG_COMPLEX]),
    (MoidId::LONG_COMPLEX, &[MoidId::LONG_LONG_COMPLEX]),
    (MoidId::BITS, &[MoidId::LONG_BITS, MoidId::ROW_BOOL]),
    (MoidId::LONG_BITS, &[MoidId::LONG_LONG_BITS, MoidId::ROW_BOOL]),
    (MoidId::BYTES, &[MoidId::ROW_CHAR]),
    (MoidId::LONG_BYTES, &[MoidId::ROW_CHAR]),
];

fn widenings(m: MoidId) -> &'static [MoidId] {
    WIDENINGS.iter().find(|(from, _)| *from == m).map_or(&[], |(_, to)| *to)
}

/// Whether widening `from` to `to` changes the length of a mode.
pub fn is_lengthening(moids: &MoidArena, from: MoidId, to: MoidId) -> bool {
    let (a, b) = (&moids[from], &moids[to]);
    a.kind == MoidKind::Standard && b.kind == MoidKind::Standard && a.dim != b.dim
}

/// Shortest chain of widenings from `from` to `to`, excluding `from`.
pub fn widening_path(from: MoidId, to: MoidId) -> Option<SmallVec<[MoidId; 4]>> {
    if from == to {
        return Some(SmallVec::new());
    }
    let mut frontier: Vec<SmallVec<[MoidId; 4]>> = vec![smallvec![from]];
    for _ in 0..WIDENINGS.len() {
        let mut next = Vec::new();
        for chain in frontier {
            let last = chain[chain.len() - 1];
            for &w in widenings(last) {
                let mut longer = chain.clone();
                longer.push(w);
                if w == to {
                    longer.remove(0);
                    return Some(longer);
                }
                next.push(longer);
            }
        }
        if next.is_empty() {
            return None;
        }
        frontier = next;
    }
    None
}

/// STRUCT, ROW or FLEX.
pub fn is_stowed(moids: &MoidArena, m: MoidId) -> bool {
    matches!(moids.kind(moids.canonical(m)), MoidKind::Struct | MoidKind::Row | MoidKind::Flex)
}

/// Modes that are the same under `deflex`.
pub fn is_same(moids: &MoidArena, from: MoidId, to: MoidId, deflex: Deflexing) -> bool {
    let (from, to) = (moids.canonical(from), moids.canonical(to));
    if from == to {
        return true;
    }
    let flat = |m: MoidId| moids.canonical(moids.deflex(m));
    match deflex {
        Deflexing::NoDeflexing => false,
        Deflexing::SafeDeflexing => !moids.is(from, MoidKind::Ref) && flat(from) == flat(to),
        Deflexing::AliasDeflexing => !moids.is(to, MoidKind::Flex) && flat(from) == to,
        Deflexing::ForceDeflexing => {
            if moids.is(from, MoidKind::Ref) && moids.is(to, MoidKind::Ref) {
                flat(moids.sub(from)) == flat(moids.sub(to))
            } else {
                flat(from) == flat(to)
            }
        }
    }
}

/// Whether `m` can be united to union `u`: it is a member, or a union all
/// of whose members are members.
pub fn is_unitable(moids: &MoidArena, m: MoidId, u: MoidId, deflex: Deflexing) -> bool {
    let (m, u) = (moids.canonical(m), moids.canonical(u));
    if !moids.is(u, MoidKind::Union) || m == u {
        return false;
    }
    let member = |x: MoidId| moids[u].pack.iter().any(|e| is_same(moids, x, e.moid, deflex));
    if moids.is(m, MoidKind::Union) {
        moids[m].pack.iter().all(|e| member(e.moid))
    } else {
        member(m)
    }
}

/// Mode one rowing step starts from to reach `to`.
fn row_element(moids: &MoidArena, to: MoidId) -> Option<MoidId> {
    let row = moids.canonical(moids.deflex(to));
    let row = if moids.is(row, MoidKind::Flex) { moids.canonical(moids.sub(row)) } else { row };
    if !moids.is(row, MoidKind::Row) {
        return None;
    }
    match moids[row].slice {
        Some(s) => Some(moids.canonical(s)),
        None if moids[row].dim <= 1 => Some(moids.canonical(moids.sub(row))),
        None => None,
    }
}

/// Coercions taking `from` to `to` in a position of `sort`.
pub fn coercion_path(moids: &MoidArena, from: MoidId, to: MoidId, sort: Sort, deflex: Deflexing) -> Option<Path> {
    let (from, to) = (moids.canonical(from), moids.canonical(to));
    if is_same(moids, from, to, deflex) {
        return Some(Path::new());
    }
    if from == MoidId::ERROR || to == MoidId::ERROR || to == MoidId::UNDEFINED || from == MoidId::HIP {
        return Some(Path::new());
    }
    if to == MoidId::VOID {
        return (sort == Sort::Strong).then(|| voiding(moids, from));
    }
    if let Some(path) = direct(moids, from, to, sort, deflex) {
        return Some(path);
    }
    let next = if moids.is_proc_void_args(from) && sort >= Sort::Soft {
        Some(Step::new(Attribute::Deproceduring, moids.sub(from)))
    } else if moids.is(from, MoidKind::Ref) && dereferencable(moids, from, sort) {
        Some(Step::new(Attribute::Dereferencing, moids.sub(from)))
    } else {
        None
    };
    let step = next?;
    let rest = ensure_sufficient_stack(|| coercion_path(moids, step.to, to, sort, deflex))?;
    let mut path = Path::new();
    path.push(Step::new(step.attribute, moids.canonical(step.to)));
    path.extend(rest);
    Some(path)
}

fn dereferencable(moids: &MoidArena, from: MoidId, sort: Sort) -> bool {
    match sort {
        Sort::Meek | Sort::Firm | Sort::Strong => true,
        Sort::Weak => {
            let sub = moids.canonical(moids.sub(from));
            moids.is(sub, MoidKind::Ref) || !is_stowed(moids, sub)
        }
        Sort::NoSort | Sort::Soft => false,
    }
}

/// A unit in a void position is deprocedured if it is a parameterless
/// procedure, then voided.
fn voiding(moids: &MoidArena, from: MoidId) -> Path {
    let mut path = Path::new();
    if moids.is_proc_void_args(from) {
        let result = moids.canonical(moids.sub(from));
        path.push(Step::new(Attribute::Deproceduring, result));
        if result == MoidId::VOID {
            return path;
        }
    }
    path.push(Step::new(Attribute::Voiding, MoidId::VOID));
    path
}

/// Uniting, widening or rowing without dereferencing first.
fn direct(moids: &MoidArena, from: MoidId, to: MoidId, sort: Sort, deflex: Deflexing) -> Option<Path> {
    if sort >= Sort::Firm {
        if to == MoidId::ROWS && (moids.is_row_like(from) || moids.is(from, MoidKind::Flex)) {
            return Some(smallvec![Step::new(Attribute::Uniting, to)]);
        }
        if is_unitable(moids, from, to, deflex) {
            return Some(smallvec![Step::new(Attribute::Uniting, to)]);
        }
    }
    if sort < Sort::Strong {
        return None;
    }
    if let Some(chain) = widening_path(from, to) {
        return Some(chain.into_iter().map(|w| Step::new(Attribute::Widening, w)).collect());
    }
    // Rowing a name: REF T to REF [] T.
    if moids.is(from, MoidKind::Ref) && moids.is(to, MoidKind::Ref) {
        let elem = row_element(moids, moids.sub(to))?;
        return is_same(moids, moids.sub(from), elem, Deflexing::NoDeflexing)
            .then(|| smallvec![Step::new(Attribute::Rowing, to)]);
    }
    let elem = row_element(moids, to)?;
    let mut path = ensure_sufficient_stack(|| coercion_path(moids, from, elem, Sort::Strong, deflex))?;
    if path.last().is_some_and(|s| s.attribute == Attribute::Voiding) {
        return None;
    }
    path.push(Step::new(Attribute::Rowing, to));
    Some(path)
}

/// Whether `from` can be coerced to `to` in a position of `sort`.
pub fn is_coercible(moids: &MoidArena, from: MoidId, to: MoidId, sort: Sort, deflex: Deflexing) -> bool {
    coercion_path(moids, from, to, sort, deflex).is_some()
}

/// Whether either mode coerces to the other in a firm position.
pub fn is_firmly_related(moids: &MoidArena, a: MoidId, b: MoidId) -> bool {
    is_coercible(moids, a, b, Sort::Firm, Deflexing::SafeDeflexing)
        || is_coercible(moids, b, a, Sort::Firm, Deflexing::SafeDeflexing)
}

/// Mode every one of `modes` can be coerced to in a strong position, and
/// that itself stands in a position of `sort`.
///
/// Modes of constructs that yield no value (SKIP, jumps) are ignored. Of
/// the modes every branch reaches, the one with the most REF layers wins,
/// so branches yielding names of different depth balance to a name.
pub fn balance(moids: &MoidArena, modes: &[MoidId], sort: Sort) -> Option<MoidId> {
    let modes: SmallVec<[MoidId; 8]> = modes
        .iter()
        .map(|&m| moids.canonical(m))
        .filter(|&m| m != MoidId::HIP && m != MoidId::ERROR)
        .collect();
    let Some(&first) = modes.first() else {
        return Some(MoidId::HIP);
    };
    if modes.iter().all(|&m| m == first) {
        return Some(first);
    }
    let accepts = |target: MoidId| {
        modes
            .iter()
            .all(|&m| is_coercible(moids, m, target, Sort::Strong, Deflexing::SafeDeflexing))
    };
    let mut candidates: SmallVec<[MoidId; 8]> = SmallVec::new();
    for &m in &modes {
        let mut current = m;
        loop {
            if !candidates.contains(&current) {
                candidates.push(current);
            }
            if moids.is_deprefable(current) && sort >= Sort::Soft {
                current = moids.canonical(moids.sub(current));
            } else {
                break;
            }
        }
    }
    let mut target: Option<(usize, MoidId)> = None;
    for &c in candidates.iter().filter(|&&c| accepts(c)) {
        let depth = ref_depth(moids, c);
        if !target.is_some_and(|(deepest, _)| depth <= deepest) {
            target = Some((depth, c));
        }
    }
    target.map(|(_, m)| m)
}

/// Number of REF layers around `m`.
fn ref_depth(moids: &MoidArena, m: MoidId) -> usize {
    let mut depth = 0;
    let mut x = moids.canonical(m);
    while moids.is(x, MoidKind::Ref) && depth < moids.len() {
        depth += 1;
        x = moids.canonical(moids.sub(x));
    }
    depth
}

#[cfg(test)]
mod tests;
