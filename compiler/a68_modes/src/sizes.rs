//! Storage sizes of modes and frame layout of ranges.

use a68_ir::{MoidArena, MoidId, MoidKind, Program, TagKind};
use a68_stack::ensure_sufficient_stack;
use rustc_hash::FxHashSet;

/// Bytes of a pointer-sized handle: names, rows, routines, files.
pub const HANDLE_SIZE: usize = 8;

/// Bytes of the tag a united value carries.
pub const UNION_TAG_SIZE: usize = 8;

fn standard_size(m: MoidId) -> usize {
    match m {
        MoidId::INT | MoidId::REAL | MoidId::BITS => 8,
        MoidId::LONG_INT | MoidId::LONG_REAL | MoidId::LONG_BITS => 16,
        MoidId::LONG_LONG_INT | MoidId::LONG_LONG_REAL | MoidId::LONG_LONG_BITS => 32,
        MoidId::COMPLEX => 16,
        MoidId::LONG_COMPLEX => 32,
        MoidId::LONG_LONG_COMPLEX => 64,
        MoidId::BOOL | MoidId::CHAR => 4,
        MoidId::BYTES => 32,
        MoidId::LONG_BYTES => 256,
        _ => HANDLE_SIZE,
    }
}

/// Size every mode, lay out structure fields and frames.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compute(program: &mut Program) {
    let ids: Vec<MoidId> = program.moids.ids().collect();
    let mut visiting = FxHashSet::default();
    for m in ids {
        size_of(&mut program.moids, m, &mut visiting);
    }
    frames(program);
    tracing::debug!("mode sizes complete");
}

/// Size of `m`, computed on first use.
pub fn size_of(moids: &mut MoidArena, m: MoidId, visiting: &mut FxHashSet<MoidId>) -> usize {
    let m = moids.canonical(m);
    if moids[m].size > 0 || !moids[m].well_formed || !visiting.insert(m) {
        return moids[m].size;
    }
    let size = match moids.kind(m) {
        MoidKind::Standard => standard_size(m),
        MoidKind::Ref | MoidKind::Proc | MoidKind::Row | MoidKind::Flex => HANDLE_SIZE,
        MoidKind::Struct => {
            let fields: Vec<MoidId> = moids[m].pack.iter().map(|e| e.moid).collect();
            let mut offset = 0;
            for (i, f) in fields.into_iter().enumerate() {
                moids[m].pack[i].offset = offset;
                offset += ensure_sufficient_stack(|| size_of(moids, f, visiting));
            }
            offset
        }
        MoidKind::Union => {
            let members: Vec<MoidId> = moids[m].pack.iter().map(|e| e.moid).collect();
            let widest = members
                .into_iter()
                .map(|u| ensure_sufficient_stack(|| size_of(moids, u, visiting)))
                .max()
                .unwrap_or(0);
            UNION_TAG_SIZE + widest
        }
        MoidKind::Series | MoidKind::Stowed => {
            let members: Vec<MoidId> = moids[m].pack.iter().map(|e| e.moid).collect();
            members
                .into_iter()
                .map(|u| ensure_sufficient_stack(|| size_of(moids, u, visiting)))
                .sum()
        }
        MoidKind::Indicant
        | MoidKind::Void
        | MoidKind::Hip
        | MoidKind::Undefined
        | MoidKind::Error
        | MoidKind::Vacuum => 0,
    };
    visiting.remove(&m);
    moids[m].size = size;
    size
}

/// Offsets of identifiers in their range's frame.
fn frames(program: &mut Program) {
    let tables: Vec<_> = program.tables.table_ids().collect();
    for t in tables {
        let mut offset = 0;
        let tags = program.tables.table(t).list(TagKind::Identifier).to_vec();
        for tag in tags {
            let size = program
                .tables
                .tag(tag)
                .moid
                .map_or(0, |m| program.moids[program.moids.canonical(m)].size);
            let tag = program.tables.tag_mut(tag);
            tag.offset = offset;
            tag.size = size;
            offset += size;
        }
        program.tables.table_mut(t).ap_increment = offset;
    }
}

#[cfg(test)]
mod tests;
