//! Derived forms of a mode: slice, deflexed, trim, name and multiple.
//!
//! Each form is computed once and cached on the mode. Forms are built
//! structurally and never pass through REF or PROC, so they terminate on
//! cyclic modes that are well formed.

use a68_ir::{MoidArena, MoidId, MoidKind, Name};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Compute every cached form and flag of `m`.
pub fn derive(moids: &mut MoidArena, m: MoidId) {
    flags(moids, m);
    if !moids[m].well_formed {
        return;
    }
    slice(moids, m);
    deflexed(moids, m);
    trim(moids, m);
    name(moids, m);
    multiple(moids, m);
}

/// Set `has_ref`, `has_flex` and `has_rows` of `m`.
pub fn flags(moids: &mut MoidArena, m: MoidId) {
    let mut seen = FxHashSet::default();
    let mut stack = vec![(m, true)];
    let (mut has_ref, mut has_flex, mut has_rows) = (false, false, false);
    while let Some((n, direct)) = stack.pop() {
        let n = moids.canonical(n);
        if !seen.insert((n, direct)) {
            continue;
        }
        let moid = &moids[n];
        match moid.kind {
            MoidKind::Ref => {
                has_ref = true;
                if let Some(sub) = moid.sub {
                    stack.push((sub, false));
                }
            }
            MoidKind::Proc => {
                stack.extend(moid.pack.iter().map(|e| (e.moid, false)));
                if let Some(sub) = moid.sub {
                    stack.push((sub, false));
                }
            }
            MoidKind::Flex | MoidKind::Row => {
                if direct {
                    has_rows = true;
                    has_flex |= moid.kind == MoidKind::Flex;
                }
                if let Some(sub) = moid.sub {
                    stack.push((sub, direct));
                }
            }
            MoidKind::Struct | MoidKind::Union | MoidKind::Series | MoidKind::Stowed => {
                stack.extend(moid.pack.iter().map(|e| (e.moid, direct)));
            }
            _ => {}
        }
    }
    let moid = &mut moids[m];
    moid.has_ref = has_ref;
    moid.has_flex = has_flex;
    moid.has_rows = has_rows;
}

/// What one subscript of a row yields: the element for one dimension,
/// a row of one dimension less otherwise.
pub fn slice(moids: &mut MoidArena, m: MoidId) -> Option<MoidId> {
    if let Some(s) = moids[m].slice {
        return Some(s);
    }
    let before = moids.len();
    let s = match moids.kind(m) {
        MoidKind::Row => {
            let sub = moids.canonical(moids.sub(m));
            let dim = moids[m].dim;
            if dim <= 1 {
                sub
            } else {
                moids.row_of(sub, dim - 1)
            }
        }
        MoidKind::Flex => {
            let row = moids.canonical(moids.sub(m));
            if !moids.is(row, MoidKind::Row) {
                return None;
            }
            slice(moids, row)?
        }
        _ => return None,
    };
    moids[m].slice = Some(s);
    mark_derived(moids, before);
    Some(s)
}

/// `m` with FLEX stripped from its value structure.
pub fn deflexed(moids: &mut MoidArena, m: MoidId) -> MoidId {
    let before = moids.len();
    let mut visiting = FxHashSet::default();
    let d = deflex_inner(moids, m, &mut visiting);
    mark_derived(moids, before);
    d
}

fn deflex_inner(moids: &mut MoidArena, m: MoidId, visiting: &mut FxHashSet<MoidId>) -> MoidId {
    let m = moids.canonical(m);
    if let Some(d) = moids[m].deflexed {
        return d;
    }
    if !visiting.insert(m) {
        return m;
    }
    let d = match moids.kind(m) {
        MoidKind::Flex => deflex_inner(moids, moids.sub(m), visiting),
        MoidKind::Row => {
            let sub = deflex_inner(moids, moids.sub(m), visiting);
            let dim = moids[m].dim;
            if sub == moids.canonical(moids.sub(m)) {
                m
            } else {
                moids.row_of(sub, dim)
            }
        }
        MoidKind::Struct => {
            let fields: SmallVec<[(MoidId, Name); 8]> = moids[m]
                .pack
                .iter()
                .map(|e| (e.moid, e.text.unwrap_or(Name::EMPTY)))
                .collect();
            let deflexed: SmallVec<[(MoidId, Name); 8]> =
                fields.iter().map(|&(f, t)| (deflex_inner(moids, f, visiting), t)).collect();
            if deflexed.iter().zip(&fields).all(|(a, b)| a.0 == moids.canonical(b.0)) {
                m
            } else {
                moids.struct_of(&deflexed)
            }
        }
        MoidKind::Union => {
            let members: SmallVec<[MoidId; 8]> = moids[m].pack.iter().map(|e| e.moid).collect();
            let deflexed: SmallVec<[MoidId; 8]> =
                members.iter().map(|&u| deflex_inner(moids, u, visiting)).collect();
            if deflexed.iter().zip(&members).all(|(&a, &b)| a == moids.canonical(b)) {
                m
            } else {
                moids.union_of(&deflexed)
            }
        }
        _ => m,
    };
    visiting.remove(&m);
    moids[m].deflexed = Some(d);
    d
}

/// Light deflexing: the FLEX directly under a name or at the top goes.
///
/// Trimming a `REF FLEX [] T` yields a `REF [] T`.
pub fn trim(moids: &mut MoidArena, m: MoidId) -> MoidId {
    if let Some(t) = moids[m].trim {
        return t;
    }
    let before = moids.len();
    let t = match moids.kind(m) {
        MoidKind::Flex => moids.canonical(moids.sub(m)),
        MoidKind::Ref => {
            let sub = moids.canonical(moids.sub(m));
            if moids.is(sub, MoidKind::Flex) {
                let row = moids.canonical(moids.sub(sub));
                moids.ref_of(row)
            } else {
                m
            }
        }
        _ => m,
    };
    moids[m].trim = Some(t);
    mark_derived(moids, before);
    t
}

/// Name of one element: `REF [] T` gives `REF T`, `REF STRUCT (..)`
/// gives a structure of names of the fields.
pub fn name(moids: &mut MoidArena, m: MoidId) -> Option<MoidId> {
    if let Some(n) = moids[m].name {
        return Some(n);
    }
    if !moids.is(m, MoidKind::Ref) {
        return None;
    }
    let before = moids.len();
    let sub = moids.canonical(moids.sub(m));
    let n = match moids.kind(sub) {
        MoidKind::Row | MoidKind::Flex => {
            let s = slice(moids, sub)?;
            moids.ref_of(s)
        }
        MoidKind::Struct => {
            let fields: SmallVec<[(MoidId, Name); 8]> = moids[sub]
                .pack
                .iter()
                .map(|e| (e.moid, e.text.unwrap_or(Name::EMPTY)))
                .collect();
            let names: SmallVec<[(MoidId, Name); 8]> = fields.iter().map(|&(f, t)| (moids.ref_of(f), t)).collect();
            moids.struct_of(&names)
        }
        _ => return None,
    };
    moids[m].name = Some(n);
    mark_derived(moids, before);
    Some(n)
}

/// A row of structures seen as a structure of rows.
pub fn multiple(moids: &mut MoidArena, m: MoidId) -> Option<MoidId> {
    if let Some(n) = moids[m].multiple {
        return Some(n);
    }
    let (row, is_name) = match moids.kind(m) {
        MoidKind::Ref => (moids.canonical(moids.sub(m)), true),
        _ => (m, false),
    };
    let row = match moids.kind(row) {
        MoidKind::Flex => moids.canonical(moids.sub(row)),
        _ => row,
    };
    if !moids.is(row, MoidKind::Row) {
        return None;
    }
    let elem = moids.canonical(moids.sub(row));
    if !moids.is(elem, MoidKind::Struct) {
        return None;
    }
    let dim = moids[row].dim;
    let before = moids.len();
    let fields: SmallVec<[(MoidId, Name); 8]> = moids[elem]
        .pack
        .iter()
        .map(|e| (e.moid, e.text.unwrap_or(Name::EMPTY)))
        .collect();
    let rows: SmallVec<[(MoidId, Name); 8]> = fields
        .iter()
        .map(|&(f, t)| {
            let r = moids.row_of(f, dim);
            if is_name {
                (moids.ref_of(r), t)
            } else {
                (r, t)
            }
        })
        .collect();
    let n = moids.struct_of(&rows);
    moids[m].multiple = Some(n);
    mark_derived(moids, before);
    Some(n)
}

/// `m` rowed once: the mode rowing coerces `m` to.
pub fn rowed(moids: &mut MoidArena, m: MoidId) -> MoidId {
    if let Some(r) = moids[m].rowed {
        return r;
    }
    let before = moids.len();
    let r = if moids.is(m, MoidKind::Ref) {
        let sub = moids.canonical(moids.sub(m));
        let row = moids.row_of(sub, 1);
        moids.ref_of(row)
    } else {
        moids.row_of(m, 1)
    };
    moids[m].rowed = Some(r);
    mark_derived(moids, before);
    r
}

/// Flag the modes made since the arena had `before` entries.
fn mark_derived(moids: &mut MoidArena, before: usize) {
    let fresh: SmallVec<[MoidId; 4]> = moids.ids().skip(before).collect();
    for m in fresh {
        moids[m].derivate = true;
    }
}

#[cfg(test)]
mod tests;
