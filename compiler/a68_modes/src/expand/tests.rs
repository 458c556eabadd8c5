use super::*;
use a68_ir::Attribute;
use pretty_assertions::assert_eq;

use crate::collect::collect;
use crate::test_util::{parsed, Analysed};

fn expanded(src: &str) -> Analysed {
    let mut a = parsed(src);
    let top = a.top.unwrap();
    collect(&mut a.program, top, &mut a.diags).unwrap();
    expand_contract(&mut a.program, &mut a.diags).unwrap();
    a
}

fn declared(a: &Analysed, text: &str) -> MoidId {
    let id = a.named(Attribute::DefiningIdentifier, text)[0];
    let tag = a.program.tree[id].tag.unwrap();
    a.program.moids.canonical(a.program.tables.tag(tag).moid.unwrap())
}

#[test]
fn test_indicant_of_standard_mode() {
    let mut a = expanded("MODE I = INT; I x; SKIP");
    assert_eq!(declared(&a, "x"), MoidId::REF_INT);
    assert!(a.codes().is_empty());
}

#[test]
fn test_structurally_equal_lists() {
    let mut a = expanded(
        "MODE A = STRUCT (INT i, REF A next), B = STRUCT (INT i, REF B next); \
         A p; B q; SKIP",
    );
    assert_eq!(declared(&a, "p"), declared(&a, "q"));
    assert!(a.codes().is_empty());
}

#[test]
fn test_field_names_keep_modes_apart() {
    let a = expanded("MODE A = STRUCT (INT i), B = STRUCT (INT j); A p; B q; SKIP");
    assert_ne!(declared(&a, "p"), declared(&a, "q"));
}

#[test]
fn test_flexible_row_of_char_is_string() {
    let a = expanded("MODE S = FLEX [1:0] CHAR; S s; SKIP");
    assert_eq!(declared(&a, "s"), MoidId::REF_STRING);
}

#[test]
fn test_nested_union_is_absorbed() {
    let mut a = expanded("MODE U = UNION (INT, UNION (REAL, CHAR)); U u; SKIP");
    let u = a.program.moids.sub(declared(&a, "u"));
    assert_eq!(a.program.moids[u].pack.len(), 3);
    assert!(a.codes().is_empty());
}

#[test]
fn test_overlapping_nested_union() {
    let mut a = expanded("MODE U = UNION (INT, UNION (INT, REAL)); SKIP");
    assert_eq!(a.codes(), vec![ErrorCode::E2005]);
}

#[test]
fn test_nested_union_that_adds_nothing() {
    let mut a = expanded("MODE U = UNION (INT, REAL, UNION (INT, REAL)); SKIP");
    assert_eq!(a.codes(), vec![ErrorCode::E2006]);
}

#[test]
fn test_union_members_that_become_equal() {
    let mut a = expanded("MODE I = INT; MODE U = UNION (I, INT); SKIP");
    assert_eq!(a.codes(), vec![ErrorCode::E2005]);
}

#[test]
fn test_tree_points_at_representatives() {
    let a = expanded("MODE I = INT; I x = 1; SKIP");
    for p in a.program.tree.preorder(a.program.tree.top) {
        if let Some(m) = a.program.tree[p].moid {
            assert_eq!(a.program.moids.canonical(m), m);
        }
    }
}
