//! Algol 68 text for a mode.

use rustc_hash::FxHashSet;

use super::{MoidArena, MoidId, MoidKind};
use crate::StringInterner;

/// Render `m` the way a declarer would spell it. Cycles print as `...`.
pub fn moid_to_string(moids: &MoidArena, interner: &StringInterner, m: MoidId) -> String {
    let mut out = String::new();
    let mut path = FxHashSet::default();
    write_moid(moids, interner, m, &mut path, &mut out);
    out
}

fn write_moid(
    moids: &MoidArena,
    interner: &StringInterner,
    m: MoidId,
    path: &mut FxHashSet<MoidId>,
    out: &mut String,
) {
    let moid = &moids[m];
    if moid.kind != MoidKind::Indicant && moid.kind != MoidKind::Standard && !moid.symbol.is_empty() {
        out.push_str(interner.lookup(moid.symbol));
        return;
    }
    match moid.kind {
        MoidKind::Void => out.push_str("VOID"),
        MoidKind::Hip => out.push_str("HIP"),
        MoidKind::Undefined => out.push_str("UNDEFINED"),
        MoidKind::Error => out.push_str("ERROR"),
        MoidKind::Vacuum => out.push_str("VACUUM"),
        MoidKind::Standard => {
            let prefix = if moid.dim < 0 { "SHORT " } else { "LONG " };
            for _ in 0..moid.dim.unsigned_abs() {
                out.push_str(prefix);
            }
            out.push_str(interner.lookup(moid.symbol));
        }
        MoidKind::Indicant => out.push_str(interner.lookup(moid.symbol)),
        _ => {
            if !path.insert(m) {
                out.push_str("...");
                return;
            }
            write_compound(moids, interner, m, path, out);
            path.remove(&m);
        }
    }
}

fn write_compound(
    moids: &MoidArena,
    interner: &StringInterner,
    m: MoidId,
    path: &mut FxHashSet<MoidId>,
    out: &mut String,
) {
    let moid = &moids[m];
    let sub = moid.sub.unwrap_or(MoidId::ERROR);
    match moid.kind {
        MoidKind::Ref => {
            out.push_str("REF ");
            write_moid(moids, interner, sub, path, out);
        }
        MoidKind::Flex => {
            out.push_str("FLEX ");
            write_moid(moids, interner, sub, path, out);
        }
        MoidKind::Row => {
            out.push('[');
            for _ in 1..moid.dim {
                out.push(',');
            }
            out.push_str("] ");
            write_moid(moids, interner, sub, path, out);
        }
        MoidKind::Struct | MoidKind::Union | MoidKind::Series | MoidKind::Stowed => {
            match moid.kind {
                MoidKind::Struct => out.push_str("STRUCT "),
                MoidKind::Union => out.push_str("UNION "),
                _ => {}
            }
            out.push('(');
            for (i, entry) in moid.pack.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_moid(moids, interner, entry.moid, path, out);
                if let Some(text) = entry.text {
                    out.push(' ');
                    out.push_str(interner.lookup(text));
                }
            }
            out.push(')');
        }
        MoidKind::Proc => {
            out.push_str("PROC ");
            if !moid.pack.is_empty() {
                out.push('(');
                for (i, entry) in moid.pack.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_moid(moids, interner, entry.moid, path, out);
                }
                out.push_str(") ");
            }
            write_moid(moids, interner, sub, path, out);
        }
        _ => out.push_str("ERROR"),
    }
}
