use super::*;

use a68_ir::{Name, StringInterner};

fn arena() -> (MoidArena, StringInterner) {
    let interner = StringInterner::new();
    (MoidArena::new(&interner), interner)
}

/// `MODE <name> = STRUCT (REF <name> next)`, built by hand.
fn linked(moids: &mut MoidArena, name: Name, field: Name) -> MoidId {
    let indicant = moids.indicant(name, None);
    let next = moids.ref_of(indicant);
    let body = moids.add(a68_ir::Moid {
        pack: vec![a68_ir::PackEntry::field(next, field)],
        dim: 1,
        ..a68_ir::Moid::new(MoidKind::Struct)
    });
    moids[indicant].equivalent = Some(body);
    indicant
}

#[test]
fn test_standard_modes_are_distinct() {
    let (moids, _) = arena();
    assert!(equivalent(&moids, MoidId::INT, MoidId::INT));
    assert!(!equivalent(&moids, MoidId::INT, MoidId::LONG_INT));
    assert!(!equivalent(&moids, MoidId::INT, MoidId::REF_INT));
}

#[test]
fn test_cyclic_structures_are_equivalent() {
    let (mut moids, interner) = arena();
    let next = interner.intern("next");
    let a = linked(&mut moids, interner.intern("A"), next);
    let b = linked(&mut moids, interner.intern("B"), next);
    assert!(equivalent(&moids, a, b));
}

#[test]
fn test_field_names_matter() {
    let (mut moids, interner) = arena();
    let a = linked(&mut moids, interner.intern("A"), interner.intern("next"));
    let b = linked(&mut moids, interner.intern("B"), interner.intern("link"));
    assert!(!equivalent(&moids, a, b));
}

#[test]
fn test_unions_compare_by_coverage() {
    let (mut moids, _) = arena();
    let ab = moids.union_of(&[MoidId::INT, MoidId::REAL]);
    let ba = moids.union_of(&[MoidId::REAL, MoidId::INT]);
    let abc = moids.union_of(&[MoidId::REAL, MoidId::INT, MoidId::CHAR]);
    assert!(equivalent(&moids, ab, ba));
    assert!(!equivalent(&moids, ab, abc));
}

#[test]
fn test_flex_is_significant() {
    let (mut moids, _) = arena();
    let flex = moids.flex_of(MoidId::ROW_CHAR);
    assert!(equivalent(&moids, flex, MoidId::STRING));
    assert!(!equivalent(&moids, MoidId::ROW_CHAR, MoidId::STRING));
}

#[test]
fn test_postulates_are_rewound() {
    let (mut moids, interner) = arena();
    let next = interner.intern("next");
    let a = linked(&mut moids, interner.intern("A"), next);
    let b = linked(&mut moids, interner.intern("B"), next);
    let mut eq = Equivalencer::new(&moids);
    assert!(eq.equivalent(a, b));
    assert!(eq.postulates.is_empty());
    assert!(!eq.equivalent(a, MoidId::INT));
    assert!(eq.postulates.is_empty());
}

mod proptest_equivalence {
    use super::*;
    use proptest::prelude::*;

    /// A mode built from the standard modes with REF, row and PROC.
    #[derive(Clone, Debug)]
    enum Shape {
        Base(usize),
        Ref(Box<Shape>),
        Row(i32, Box<Shape>),
        Proc(Vec<Shape>, Box<Shape>),
        Union(Vec<Shape>),
    }

    const BASES: [MoidId; 5] = [MoidId::INT, MoidId::REAL, MoidId::BOOL, MoidId::CHAR, MoidId::LONG_INT];

    fn shape() -> impl Strategy<Value = Shape> {
        let leaf = (0..BASES.len()).prop_map(Shape::Base);
        leaf.prop_recursive(3, 16, 3, |inner| {
            prop_oneof![
                inner.clone().prop_map(|s| Shape::Ref(Box::new(s))),
                (1..3i32, inner.clone()).prop_map(|(d, s)| Shape::Row(d, Box::new(s))),
                (prop::collection::vec(inner.clone(), 0..3), inner.clone())
                    .prop_map(|(ps, r)| Shape::Proc(ps, Box::new(r))),
                prop::collection::vec(inner, 1..3).prop_map(Shape::Union),
            ]
        })
    }

    /// Build `shape`, adding fresh modes so equal shapes get distinct ids.
    fn build(moids: &mut MoidArena, shape: &Shape) -> MoidId {
        match shape {
            Shape::Base(i) => BASES[*i],
            Shape::Ref(s) => {
                let sub = build(moids, s);
                moids.add(a68_ir::Moid { sub: Some(sub), ..a68_ir::Moid::new(MoidKind::Ref) })
            }
            Shape::Row(dim, s) => {
                let sub = build(moids, s);
                moids.add(a68_ir::Moid { sub: Some(sub), dim: *dim, ..a68_ir::Moid::new(MoidKind::Row) })
            }
            Shape::Proc(params, r) => {
                let pack = params.iter().map(|p| a68_ir::PackEntry::new(build(moids, p))).collect::<Vec<_>>();
                let sub = build(moids, r);
                let dim = pack.len() as i32;
                moids.add(a68_ir::Moid { pack, dim, sub: Some(sub), ..a68_ir::Moid::new(MoidKind::Proc) })
            }
            Shape::Union(members) => {
                let pack = members.iter().map(|m| a68_ir::PackEntry::new(build(moids, m))).collect::<Vec<_>>();
                let dim = pack.len() as i32;
                moids.add(a68_ir::Moid { pack, dim, ..a68_ir::Moid::new(MoidKind::Union) })
            }
        }
    }

    proptest! {
        #[test]
        fn equal_shapes_are_equivalent(s in shape()) {
            let (mut moids, _) = arena();
            let a = build(&mut moids, &s);
            let b = build(&mut moids, &s);
            prop_assert!(equivalent(&moids, a, a));
            prop_assert!(equivalent(&moids, a, b));
        }

        #[test]
        fn equivalence_is_symmetric(s in shape(), t in shape()) {
            let (mut moids, _) = arena();
            let a = build(&mut moids, &s);
            let b = build(&mut moids, &t);
            prop_assert_eq!(equivalent(&moids, a, b), equivalent(&moids, b, a));
        }

        #[test]
        fn equivalence_is_transitive(s in shape(), t in shape()) {
            let (mut moids, _) = arena();
            let a = build(&mut moids, &s);
            let b = build(&mut moids, &t);
            let c = build(&mut moids, &t);
            if equivalent(&moids, a, b) {
                prop_assert!(equivalent(&moids, a, c));
            }
        }
    }
}
