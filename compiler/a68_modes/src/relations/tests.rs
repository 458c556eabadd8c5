use super::*;
use pretty_assertions::assert_eq;

use crate::test_util::analysed;

#[test]
fn test_union_of_name_and_value() {
    let mut a = analysed("MODE U = UNION (REF INT, INT); SKIP");
    assert_eq!(a.codes(), vec![ErrorCode::E2007]);
}

#[test]
fn test_union_of_unrelated_modes() {
    let mut a = analysed("MODE U = UNION (INT, REAL, BOOL); SKIP");
    assert_eq!(a.codes(), vec![]);
}

#[test]
fn test_union_of_procedure_and_its_result() {
    let mut a = analysed("MODE U = UNION (PROC INT, INT); SKIP");
    assert_eq!(a.codes(), vec![ErrorCode::E2007]);
}

#[test]
fn test_union_of_itself_is_reported_once() {
    let mut a = analysed("MODE A = UNION (INT, A); SKIP");
    assert_eq!(a.codes(), vec![ErrorCode::E2002]);
    let mut a = analysed("MODE B = UNION (INT, C), C = STRUCT (B b); SKIP");
    assert!(!a.codes().contains(&ErrorCode::E2007));
}

#[test]
fn test_operators_with_related_operands() {
    let mut a = analysed(
        "PRIO MAX = 9; \
         OP MAX = (INT a, b) INT: a; \
         OP MAX = (REF INT a, INT b) INT: a; \
         SKIP",
    );
    assert_eq!(a.codes(), vec![ErrorCode::E2008]);
}

#[test]
fn test_operators_with_distinct_operands() {
    let mut a = analysed(
        "PRIO MAX = 9; \
         OP MAX = (INT a, b) INT: a; \
         OP MAX = (REAL a, b) REAL: a; \
         SKIP",
    );
    assert_eq!(a.codes(), vec![]);
}

#[test]
fn test_monadic_and_dyadic_do_not_clash() {
    let mut a = analysed(
        "PRIO MAX = 9; \
         OP MAX = (INT a, b) INT: a; \
         OP MAX = (INT a) INT: a; \
         SKIP",
    );
    assert_eq!(a.codes(), vec![]);
}
