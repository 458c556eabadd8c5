use super::*;
use pretty_assertions::assert_eq;

use a68_diagnostic::ErrorCode::*;

use crate::test_util::analysed;

#[test]
fn test_slice_of_flexible_row_may_not_be_kept() {
    let mut a = analysed("REF [] CHAR s = LOC FLEX [1:10] CHAR [2:5]");
    assert_eq!(a.codes(), vec![E4003]);
}

#[test]
fn test_dereferenced_slice_of_flexible_row_is_fine() {
    let mut a = analysed("FLEX [1:3] INT f; INT k = f[2]; f[1] := k");
    assert_eq!(a.codes(), vec![]);
}

#[test]
fn test_youngest_environ_of_routines() {
    let mut a = analysed(
        "PROC f = (INT n) INT: n + 1; \
         INT k := 0; \
         PROC g = INT: k; \
         SKIP",
    );
    assert_eq!(a.codes(), vec![]);
    let routines = a.all(Attribute::RoutineText);
    assert_eq!(a.program.tree[routines[0]].youngest_environ, Some(PRIMAL_SCOPE));
    let k = a.named(Attribute::DefiningIdentifier, "k")[0];
    let level = a.program.tables.tag(a.program.tree[k].tag.unwrap()).scope;
    assert_eq!(a.program.tree[routines[1]].youngest_environ, Some(level));
    assert!(a.program.tree[routines[1]].status.contains(Status::SCOPE_CHECKED));
}

#[test]
fn test_local_name_assigned_to_outer_variable() {
    let mut a = analysed("REF INT r; BEGIN INT i; r := i END");
    assert_eq!(a.codes(), vec![E4002]);
}

#[test]
fn test_generated_names_by_heap_qualifier() {
    let mut heap = analysed("REF INT r; BEGIN r := HEAP INT END");
    assert_eq!(heap.codes(), vec![]);
    let mut local = analysed("REF INT r; BEGIN r := LOC INT END");
    assert_eq!(local.codes(), vec![E4002]);
}

#[test]
fn test_local_routine_assigned_to_outer_variable() {
    let mut a = analysed("PROC INT p; BEGIN INT k := 1; p := INT: k END");
    assert_eq!(a.codes(), vec![E4001]);
}

#[test]
fn test_routine_yielding_its_own_local_name() {
    let mut a = analysed("PROC f = REF INT: (INT x := 1; x); SKIP");
    assert_eq!(a.codes(), vec![E4002]);
}

#[test]
fn test_local_name_kept_in_generated_identity() {
    let mut a = analysed("REF REF INT rrx = LOC REF INT; BEGIN INT y := 1; rrx := y END");
    assert_eq!(a.codes(), vec![E4002]);
    let mut heap = analysed("REF REF INT rrx = HEAP REF INT; BEGIN rrx := HEAP INT END");
    assert_eq!(heap.codes(), vec![]);
}

#[test]
fn test_local_routine_kept_in_generated_identity() {
    let mut a = analysed("REF PROC INT rp = LOC PROC INT; BEGIN INT y = 1; rp := INT: y END");
    assert_eq!(a.codes(), vec![E4001]);
}
