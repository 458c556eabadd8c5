use super::*;
use pretty_assertions::assert_eq;

fn setup() -> (StringInterner, MoidArena) {
    let interner = StringInterner::new();
    let moids = MoidArena::new(&interner);
    (interner, moids)
}

#[test]
fn test_standard_modes_installed_in_order() {
    let (interner, moids) = setup();
    assert_eq!(moids.len(), STANDARD_MOID_COUNT);
    assert_eq!(moids.kind(MoidId::INT), MoidKind::Standard);
    assert_eq!(moids[MoidId::LONG_REAL].dim, 1);
    assert_eq!(moids.sub(MoidId::REF_STRING), MoidId::STRING);
    assert_eq!(moid_to_string(&moids, &interner, MoidId::LONG_LONG_INT), "LONG LONG INT");
}

#[test]
fn test_find_or_add_reuses_same_shape() {
    let (_, mut moids) = setup();
    let a = moids.ref_of(MoidId::INT);
    assert_eq!(a, MoidId::REF_INT);
    let p = moids.proc_of(&[MoidId::INT, MoidId::INT], MoidId::INT);
    let q = moids.proc_of(&[MoidId::INT, MoidId::INT], MoidId::INT);
    assert_eq!(p, q);
    assert_eq!(moids[p].dim, 2);
}

#[test]
fn test_render_compound_modes() {
    let (interner, mut moids) = setup();
    let a = interner.intern("a");
    let s = moids.struct_of(&[(MoidId::INT, a), (MoidId::REF_REAL, interner.intern("b"))]);
    assert_eq!(moid_to_string(&moids, &interner, s), "STRUCT (INT a, REF REAL b)");

    let row2 = moids.row_of(MoidId::REAL, 2);
    assert_eq!(row2, MoidId::ROW_ROW_REAL);
    assert_eq!(moid_to_string(&moids, &interner, row2), "[,] REAL");

    let p = moids.proc_of(&[MoidId::INT], MoidId::BOOL);
    assert_eq!(moid_to_string(&moids, &interner, p), "PROC (INT) BOOL");
    assert_eq!(moid_to_string(&moids, &interner, MoidId::REF_STRING), "REF STRING");
}

#[test]
fn test_render_cycle_is_cut() {
    let (interner, mut moids) = setup();
    let node = moids.add(Moid::new(MoidKind::Struct));
    let link = moids.ref_of(node);
    moids[node].pack = vec![
        PackEntry::field(MoidId::INT, interner.intern("value")),
        PackEntry::field(link, interner.intern("next")),
    ];
    moids[node].dim = 2;
    assert_eq!(
        moid_to_string(&moids, &interner, node),
        "STRUCT (INT value, REF ... next)"
    );
}

#[test]
fn test_canonical_follows_equivalent() {
    let (_, mut moids) = setup();
    let dup = moids.add(Moid {
        sub: Some(MoidId::INT),
        ..Moid::new(MoidKind::Ref)
    });
    moids[dup].equivalent = Some(MoidId::REF_INT);
    assert_eq!(moids.canonical(dup), MoidId::REF_INT);
    assert_eq!(moids.canonical(MoidId::REF_INT), MoidId::REF_INT);
}
