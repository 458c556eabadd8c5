use super::*;
use a68_ir::{Attribute, Options};
use pretty_assertions::assert_eq;

use crate::test_util::analysed;

fn size(moids: &mut MoidArena, m: MoidId) -> usize {
    size_of(moids, m, &mut FxHashSet::default())
}

#[test]
fn test_standard_sizes() {
    let mut program = Program::new(Options::default());
    let moids = &mut program.moids;
    assert_eq!(size(moids, MoidId::INT), 8);
    assert_eq!(size(moids, MoidId::LONG_INT), 16);
    assert_eq!(size(moids, MoidId::LONG_LONG_COMPLEX), 64);
    assert_eq!(size(moids, MoidId::BOOL), 4);
    assert_eq!(size(moids, MoidId::LONG_BYTES), 256);
    assert_eq!(size(moids, MoidId::REF_INT), HANDLE_SIZE);
    assert_eq!(size(moids, MoidId::STRING), HANDLE_SIZE);
    assert_eq!(size(moids, MoidId::VOID), 0);
}

#[test]
fn test_structure_fields_are_laid_out_in_order() {
    let mut a = analysed("MODE R = STRUCT (INT a, REAL b, BOOL c); R r; SKIP");
    let r = a.program.moids.sub(a.mode(a.named(Attribute::DefiningIdentifier, "r")[0]));
    let moid = &a.program.moids[r];
    assert_eq!(moid.size, 20);
    let offsets: Vec<usize> = moid.pack.iter().map(|e| e.offset).collect();
    assert_eq!(offsets, vec![0, 8, 16]);
    assert!(a.codes().is_empty());
}

#[test]
fn test_union_carries_a_tag() {
    let a = analysed("MODE U = UNION (INT, COMPLEX); U u; SKIP");
    let u = a.program.moids.sub(a.mode(a.named(Attribute::DefiningIdentifier, "u")[0]));
    assert_eq!(a.program.moids[u].size, UNION_TAG_SIZE + 16);
}

#[test]
fn test_recursive_structure_through_ref() {
    let a = analysed("MODE L = STRUCT (INT v, REF L next); L l; SKIP");
    let l = a.program.moids.sub(a.mode(a.named(Attribute::DefiningIdentifier, "l")[0]));
    assert_eq!(a.program.moids[l].size, 8 + HANDLE_SIZE);
}

#[test]
fn test_frame_offsets() {
    let a = analysed("INT i = 1; REAL x; BOOL b = TRUE; SKIP");
    let tag = |text| {
        let id = a.named(Attribute::DefiningIdentifier, text)[0];
        a.program.tables.tag(a.program.tree[id].tag.unwrap()).clone()
    };
    let (i, x, b) = (tag("i"), tag("x"), tag("b"));
    assert_eq!((i.offset, i.size), (0, 8));
    assert_eq!((x.offset, x.size), (8, HANDLE_SIZE));
    assert_eq!((b.offset, b.size), (16, 4));
    assert_eq!(a.program.tables.table(i.table).ap_increment, 20);
}
