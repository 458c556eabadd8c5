use super::*;
use a68_ir::{Options, Program};
use pretty_assertions::assert_eq;

fn program() -> Program {
    let mut program = Program::new(Options::default());
    let standard: Vec<MoidId> = program.moids.ids().collect();
    for m in standard {
        crate::derive::derive(&mut program.moids, m);
    }
    program
}

fn attributes(path: &Path) -> Vec<Attribute> {
    path.iter().map(|s| s.attribute).collect()
}

fn path(p: &Program, from: MoidId, to: MoidId, sort: Sort) -> Option<Vec<Attribute>> {
    coercion_path(&p.moids, from, to, sort, Deflexing::SafeDeflexing).map(|path| attributes(&path))
}

#[test]
fn test_identical_modes_need_nothing() {
    let p = program();
    assert_eq!(path(&p, MoidId::INT, MoidId::INT, Sort::Strong), Some(vec![]));
}

#[test]
fn test_dereferencing_in_meek_position() {
    let p = program();
    assert_eq!(
        path(&p, MoidId::REF_INT, MoidId::INT, Sort::Meek),
        Some(vec![Attribute::Dereferencing])
    );
    assert_eq!(path(&p, MoidId::REF_INT, MoidId::INT, Sort::Soft), None);
}

#[test]
fn test_weak_position_keeps_name_of_row() {
    let mut p = program();
    let ref_ref = p.moids.ref_of(MoidId::REF_INT);
    assert_eq!(
        path(&p, ref_ref, MoidId::REF_INT, Sort::Weak),
        Some(vec![Attribute::Dereferencing])
    );
    let ref_row = p.moids.ref_of(MoidId::ROW_INT);
    assert_eq!(path(&p, ref_row, MoidId::ROW_INT, Sort::Weak), None);
}

#[test]
fn test_deproceduring_then_dereferencing() {
    let mut p = program();
    let proc_ref = p.moids.proc_of(&[], MoidId::REF_REAL);
    assert_eq!(
        path(&p, proc_ref, MoidId::REAL, Sort::Firm),
        Some(vec![Attribute::Deproceduring, Attribute::Dereferencing])
    );
}

#[test]
fn test_widening_only_in_strong_position() {
    let p = program();
    assert_eq!(
        path(&p, MoidId::INT, MoidId::REAL, Sort::Strong),
        Some(vec![Attribute::Widening])
    );
    assert_eq!(path(&p, MoidId::INT, MoidId::REAL, Sort::Firm), None);
    assert_eq!(
        path(&p, MoidId::INT, MoidId::COMPLEX, Sort::Strong),
        Some(vec![Attribute::Widening, Attribute::Widening])
    );
}

#[test]
fn test_widening_chain() {
    assert_eq!(
        widening_path(MoidId::INT, MoidId::LONG_REAL).map(|c| c.to_vec()),
        Some(vec![MoidId::LONG_INT, MoidId::LONG_REAL])
    );
    assert_eq!(
        widening_path(MoidId::INT, MoidId::LONG_COMPLEX).map(|c| c.to_vec()),
        Some(vec![MoidId::LONG_INT, MoidId::LONG_REAL, MoidId::LONG_COMPLEX])
    );
    assert_eq!(
        widening_path(MoidId::INT, MoidId::COMPLEX).map(|c| c.to_vec()),
        Some(vec![MoidId::REAL, MoidId::COMPLEX])
    );
    assert_eq!(widening_path(MoidId::REAL, MoidId::INT), None);
    assert_eq!(
        widening_path(MoidId::BITS, MoidId::ROW_BOOL).map(|c| c.to_vec()),
        Some(vec![MoidId::ROW_BOOL])
    );
}

#[test]
fn test_lengthening_is_recognised() {
    let p = program();
    assert!(is_lengthening(&p.moids, MoidId::INT, MoidId::LONG_INT));
    assert!(!is_lengthening(&p.moids, MoidId::INT, MoidId::REAL));
}

#[test]
fn test_uniting_into_simplout() {
    let p = program();
    assert_eq!(
        path(&p, MoidId::INT, MoidId::SIMPLOUT, Sort::Firm),
        Some(vec![Attribute::Uniting])
    );
    assert_eq!(
        path(&p, MoidId::REF_INT, MoidId::SIMPLOUT, Sort::Firm),
        Some(vec![Attribute::Dereferencing, Attribute::Uniting])
    );
    assert_eq!(path(&p, MoidId::INT, MoidId::SIMPLOUT, Sort::Meek), None);
}

#[test]
fn test_uniting_then_rowing_for_print() {
    let p = program();
    assert_eq!(
        path(&p, MoidId::INT, MoidId::ROW_SIMPLOUT, Sort::Strong),
        Some(vec![Attribute::Uniting, Attribute::Rowing])
    );
}

#[test]
fn test_rowing_a_name() {
    let mut p = program();
    let ref_row = p.moids.ref_of(MoidId::ROW_INT);
    crate::derive::derive(&mut p.moids, ref_row);
    assert_eq!(
        path(&p, MoidId::REF_INT, ref_row, Sort::Strong),
        Some(vec![Attribute::Rowing])
    );
}

#[test]
fn test_rows_accepts_any_row() {
    let mut p = program();
    let ref_row = p.moids.ref_of(MoidId::ROW_REAL);
    assert_eq!(
        path(&p, ref_row, MoidId::ROWS, Sort::Firm),
        Some(vec![Attribute::Dereferencing, Attribute::Uniting])
    );
    assert_eq!(path(&p, MoidId::INT, MoidId::ROWS, Sort::Firm), None);
}

#[test]
fn test_voiding() {
    let p = program();
    assert_eq!(
        path(&p, MoidId::INT, MoidId::VOID, Sort::Strong),
        Some(vec![Attribute::Voiding])
    );
    assert_eq!(
        path(&p, MoidId::PROC_VOID, MoidId::VOID, Sort::Strong),
        Some(vec![Attribute::Deproceduring])
    );
    assert_eq!(path(&p, MoidId::INT, MoidId::VOID, Sort::Firm), None);
}

#[test]
fn test_string_deflexes_to_row_of_char() {
    let p = program();
    assert!(is_same(&p.moids, MoidId::STRING, MoidId::ROW_CHAR, Deflexing::SafeDeflexing));
    assert!(!is_same(&p.moids, MoidId::STRING, MoidId::ROW_CHAR, Deflexing::NoDeflexing));
    assert!(!is_same(&p.moids, MoidId::ROW_CHAR, MoidId::STRING, Deflexing::AliasDeflexing));
    assert!(is_same(&p.moids, MoidId::STRING, MoidId::ROW_CHAR, Deflexing::AliasDeflexing));
}

#[test]
fn test_names_keep_flex_unless_forced() {
    let mut p = program();
    let ref_row_char = p.moids.ref_of(MoidId::ROW_CHAR);
    assert!(!is_same(&p.moids, MoidId::REF_STRING, ref_row_char, Deflexing::SafeDeflexing));
    assert!(is_same(&p.moids, MoidId::REF_STRING, ref_row_char, Deflexing::ForceDeflexing));
}

#[test]
fn test_firmly_related() {
    let mut p = program();
    assert!(is_firmly_related(&p.moids, MoidId::REF_INT, MoidId::INT));
    assert!(!is_firmly_related(&p.moids, MoidId::INT, MoidId::REAL));
    let proc_int = p.moids.proc_of(&[], MoidId::INT);
    assert!(is_firmly_related(&p.moids, proc_int, MoidId::INT));
}

#[test]
fn test_balance() {
    let p = program();
    assert_eq!(balance(&p.moids, &[MoidId::INT, MoidId::REAL], Sort::Strong), Some(MoidId::REAL));
    assert_eq!(balance(&p.moids, &[MoidId::REF_INT, MoidId::INT], Sort::Strong), Some(MoidId::INT));
    assert_eq!(balance(&p.moids, &[MoidId::HIP, MoidId::CHAR], Sort::Strong), Some(MoidId::CHAR));
    assert_eq!(balance(&p.moids, &[MoidId::BOOL, MoidId::CHAR], Sort::Strong), None);
    assert_eq!(balance(&p.moids, &[MoidId::HIP], Sort::Strong), Some(MoidId::HIP));
}

#[test]
fn test_balance_prefers_the_deepest_name() {
    let mut p = program();
    let ref_ref = p.moids.ref_of(MoidId::REF_INT);
    crate::derive::derive(&mut p.moids, ref_ref);
    assert_eq!(balance(&p.moids, &[MoidId::REF_INT, ref_ref], Sort::Soft), Some(MoidId::REF_INT));
    assert_eq!(balance(&p.moids, &[ref_ref, MoidId::REF_INT], Sort::Strong), Some(MoidId::REF_INT));
    assert_eq!(balance(&p.moids, &[ref_ref, MoidId::INT], Sort::Strong), Some(MoidId::INT));
}
