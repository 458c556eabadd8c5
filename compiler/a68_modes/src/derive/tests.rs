use super::*;
use pretty_assertions::assert_eq;

use a68_ir::StringInterner;

fn arena() -> (MoidArena, StringInterner) {
    let interner = StringInterner::new();
    (MoidArena::new(&interner), interner)
}

#[test]
fn test_slice_of_matrix_is_vector() {
    let (mut moids, _) = arena();
    assert_eq!(slice(&mut moids, MoidId::ROW_ROW_REAL), Some(MoidId::ROW_REAL));
    assert_eq!(slice(&mut moids, MoidId::ROW_REAL), Some(MoidId::REAL));
    assert_eq!(slice(&mut moids, MoidId::INT), None);
}

#[test]
fn test_slice_of_string_is_char() {
    let (mut moids, _) = arena();
    assert_eq!(slice(&mut moids, MoidId::STRING), Some(MoidId::CHAR));
}

#[test]
fn test_deflexed_string_is_row_of_char() {
    let (mut moids, _) = arena();
    assert_eq!(deflexed(&mut moids, MoidId::STRING), MoidId::ROW_CHAR);
    assert_eq!(deflexed(&mut moids, MoidId::REF_STRING), MoidId::REF_STRING);
    assert_eq!(deflexed(&mut moids, MoidId::INT), MoidId::INT);
}

#[test]
fn test_deflexed_struct_builds_new_mode() {
    let (mut moids, interner) = arena();
    let s = interner.intern("s");
    let with_flex = moids.struct_of(&[(MoidId::STRING, s)]);
    let plain = deflexed(&mut moids, with_flex);
    assert!(plain != with_flex);
    assert_eq!(moids[plain].pack[0].moid, MoidId::ROW_CHAR);
    assert!(moids[plain].derivate);
    assert!(!moids[with_flex].derivate);
}

#[test]
fn test_trim_of_flexible_name() {
    let (mut moids, _) = arena();
    let trimmed = trim(&mut moids, MoidId::REF_STRING);
    assert!(moids.is(trimmed, MoidKind::Ref));
    assert_eq!(moids.sub(trimmed), MoidId::ROW_CHAR);
    assert_eq!(trim(&mut moids, MoidId::REF_INT), MoidId::REF_INT);
}

#[test]
fn test_name_of_row_name_is_element_name() {
    let (mut moids, _) = arena();
    let ref_row = moids.ref_of(MoidId::ROW_INT);
    assert_eq!(name(&mut moids, ref_row), Some(MoidId::REF_INT));
    assert_eq!(name(&mut moids, MoidId::INT), None);
}

#[test]
fn test_multiple_of_row_of_struct() {
    let (mut moids, interner) = arena();
    let (re, im) = (interner.intern("re"), interner.intern("im"));
    let point = moids.struct_of(&[(MoidId::REAL, re), (MoidId::INT, im)]);
    let rows = moids.row_of(point, 1);
    let multiple = multiple(&mut moids, rows);
    let fields: Vec<MoidId> = multiple.map(|m| moids[m].pack.iter().map(|e| e.moid).collect()).unwrap_or_default();
    assert_eq!(fields, vec![MoidId::ROW_REAL, MoidId::ROW_INT]);
}

#[test]
fn test_flags_do_not_look_through_names() {
    let (mut moids, _) = arena();
    flags(&mut moids, MoidId::REF_STRING);
    assert!(moids[MoidId::REF_STRING].has_ref);
    assert!(!moids[MoidId::REF_STRING].has_rows);
    flags(&mut moids, MoidId::STRING);
    assert!(moids[MoidId::STRING].has_flex);
    assert!(moids[MoidId::STRING].has_rows);
}

#[test]
fn test_rowed_name() {
    let (mut moids, _) = arena();
    let r = rowed(&mut moids, MoidId::REF_INT);
    assert!(moids.is(r, MoidKind::Ref));
    assert_eq!(moids.sub(r), MoidId::ROW_INT);
    assert_eq!(rowed(&mut moids, MoidId::INT), MoidId::ROW_INT);
}
