use super::*;
use pretty_assertions::assert_eq;

use a68_diagnostic::ErrorCode::*;
use Attribute::*;

use crate::test_util::{analysed, Analysed};

/// The unit inside the first argument list.
fn argument(a: &Analysed) -> NodeId {
    a.program.tree.child_ids(a.first(Argument))[1]
}

/// Coercions wrapped around the unit at `p`, outermost first.
fn coercions(a: &Analysed, p: NodeId) -> Vec<Attribute> {
    a.spine(p).into_iter().take_while(|&attr| attr != Unit).collect()
}

#[test]
fn test_print_of_integer_is_united_then_rowed() {
    let mut a = analysed("print (1)");
    assert_eq!(a.codes(), vec![]);
    let arg = argument(&a);
    assert_eq!(coercions(&a, arg), vec![Rowing, Uniting]);
    assert_eq!(a.mode(arg), MoidId::ROW_SIMPLOUT);
}

#[test]
fn test_variable_is_dereferenced_and_widened() {
    let mut a = analysed("INT i := 1; REAL x := i");
    assert_eq!(a.codes(), vec![]);
    let widening = a.first(Widening);
    assert_eq!(coercions(&a, widening), vec![Widening, Dereferencing]);
    assert_eq!(a.mode(widening), MoidId::REAL);
}

#[test]
fn test_call_and_slice_are_told_apart_by_mode() {
    let mut a = analysed("[1:3] REAL r; r[2] := sqrt (2.0)");
    assert_eq!(a.codes(), vec![]);
    assert_eq!(a.all(Slice).len(), 1);
    assert_eq!(a.all(Call).len(), 1);
    assert_eq!(a.mode_text(a.first(Slice)), "REF REAL");
    assert_eq!(a.mode(a.first(Call)), MoidId::REAL);
}

#[test]
fn test_trimmer_yields_a_row() {
    let mut a = analysed("[1:5] INT r; [] INT s = r[2:3]");
    assert_eq!(a.codes(), vec![]);
    assert_eq!(a.mode_text(a.first(Slice)), "REF [] INT");
}

#[test]
fn test_slice_of_flexible_name_is_transient() {
    let a = analysed("FLEX [1:0] INT f; f[1] := 2");
    let slice = a.first(Slice);
    assert!(a.program.tree[slice].status.contains(Status::TRANSIENT));
}

#[test]
fn test_wrong_number_of_indexers() {
    let mut a = analysed("[1:3] INT r; r[1, 2] := 0");
    assert_eq!(a.codes(), vec![E3013]);
}

#[test]
fn test_neither_row_nor_procedure() {
    let mut a = analysed("INT i; i[1] := 0");
    assert_eq!(a.codes(), vec![E3007]);
}

#[test]
fn test_wrong_number_of_arguments() {
    let mut a = analysed("REAL x = sqrt (1.0, 2.0)");
    assert_eq!(a.codes(), vec![E3010]);
}

#[test]
fn test_assignment_needs_a_name() {
    let mut a = analysed("INT i; 1 := i");
    assert_eq!(a.codes(), vec![E3004]);
}

#[test]
fn test_source_that_cannot_be_coerced() {
    let mut a = analysed("INT i; i := TRUE");
    assert_eq!(a.codes(), vec![E3001]);
}

#[test]
fn test_nil_needs_a_name() {
    let mut a = analysed("REF INT r = NIL; INT k = NIL");
    assert_eq!(a.codes(), vec![E3001]);
}

#[test]
fn test_selection_from_structure_name() {
    let mut a = analysed("STRUCT (INT a, REAL b) s; a OF s := 1");
    assert_eq!(a.codes(), vec![]);
    assert_eq!(a.mode_text(a.first(Selection)), "REF INT");
}

#[test]
fn test_selection_errors() {
    let mut a = analysed("STRUCT (INT a) s; INT i; b OF s := 1; a OF i := 2");
    assert_eq!(a.codes(), vec![E3006, E3005]);
}

#[test]
fn test_selection_from_row_of_structures() {
    let mut a = analysed("[1:3] STRUCT (INT a, BOOL b) r; [] INT s = a OF r");
    assert_eq!(a.codes(), vec![]);
    assert_eq!(a.mode_text(a.first(Selection)), "REF [] INT");
}

#[test]
fn test_undefined_operators() {
    let mut a = analysed("INT k = TRUE + 1; INT j = - TRUE");
    assert_eq!(a.codes(), vec![E3003, E3002]);
}

#[test]
fn test_integer_denotation_out_of_range() {
    let mut a = analysed("INT k = 99999999999999999999; INT m = 9223372036854775807");
    assert_eq!(a.codes(), vec![E0005]);
    let mut a = analysed("LONG INT k = LONG 99999999999999999999; SKIP");
    assert_eq!(a.codes(), vec![]);
}

#[test]
fn test_matrix_times_vector() {
    let mut a = analysed("[1:2, 1:2] REAL m; [1:2] REAL v; [] REAL w = m * v; REAL n = NORM w");
    assert_eq!(a.codes(), vec![]);
    assert_eq!(a.tag_mode("w"), "[] REAL");
}

#[test]
fn test_row_operand_of_the_wrong_shape() {
    let mut a = analysed("[1:2, 1:2] REAL m; REAL n = NORM m");
    assert_eq!(a.codes(), vec![E3009]);
    let mut a = analysed("[1:2] REAL v; REAL d = DET v");
    assert_eq!(a.codes(), vec![E3008]);
}

#[test]
fn test_row_operand_with_the_wrong_components() {
    let mut a = analysed("[1:2] INT v; REAL n = NORM v");
    let found = a.messages();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, E3012);
    assert!(found[0].message.contains("are not REAL"), "{}", found[0].message);
    let mut a = analysed("[1:2] BOOL v; [1:2] REAL w; [] REAL s = w + v");
    assert_eq!(a.codes(), vec![E3012]);
}

#[test]
fn test_void_operand() {
    let mut a = analysed("INT k = print (1) + 1");
    assert_eq!(a.codes(), vec![E3014]);
}

#[test]
fn test_mixed_formula_widens_its_operand() {
    let mut a = analysed("REAL x = 1 + 2.5");
    assert_eq!(a.codes(), vec![]);
    let op = a.first(Operator);
    assert_eq!(a.mode_text(op), "PROC (REAL, REAL) REAL");
    assert_eq!(a.all(Widening).len(), 1);
}

#[test]
fn test_user_operator_is_identified() {
    let mut a = analysed("PRIO PLUS = 6; OP PLUS = (INT a, INT b) INT: a + b; INT k = 1 PLUS 2");
    assert_eq!(a.codes(), vec![]);
    let applied = a.named(Operator, "PLUS")[0];
    let tag = a.program.tree[applied].tag.unwrap();
    assert!(a.program.tables.tag(tag).table != TableId::STANDENV);
}

#[test]
fn test_branches_are_balanced() {
    let mut a = analysed("INT i; BOOL c; REAL x = (c | i | 1.0) * 2.0");
    assert_eq!(a.codes(), vec![]);
    let widening = a.first(Widening);
    assert_eq!(coercions(&a, widening), vec![Widening, Dereferencing]);
}

#[test]
fn test_branches_without_balance() {
    let mut a = analysed("BOOL c; INT k = (c | 1 | \"a\") + 1");
    assert_eq!(a.codes(), vec![E3011]);
}

#[test]
fn test_strong_branches_take_the_position_mode() {
    let mut a = analysed("BOOL c; REAL x = IF c THEN 1 ELSE 2.0 FI");
    assert_eq!(a.codes(), vec![]);
    assert_eq!(a.all(Widening).len(), 1);
}

#[test]
fn test_displays() {
    let mut a = analysed("[] INT r = (1, 2, 3); STRUCT (INT i, REAL x) s = (1, 2)");
    assert_eq!(a.codes(), vec![]);
    assert_eq!(a.all(Widening).len(), 1);
}

#[test]
fn test_display_needs_a_strong_position() {
    let mut a = analysed("INT k = (1, 2) + 1");
    assert_eq!(a.codes(), vec![E3001]);
}

#[test]
fn test_conformity_specifiers_must_be_components() {
    let mut ok = analysed("UNION (INT, REAL) u = 1; INT k = CASE u IN (INT i): i, (REAL r): 0 ESAC");
    assert_eq!(ok.codes(), vec![]);
    let mut bad = analysed("UNION (INT, REAL) u = 1; INT k = CASE u IN (BOOL b): 0 OUT 1 ESAC");
    assert_eq!(bad.codes(), vec![E3001]);
}

#[test]
fn test_identity_relation() {
    let mut a = analysed("REF INT r = LOC INT; INT i; BOOL b = r :=: i, n = r :/=: NIL");
    assert_eq!(a.codes(), vec![]);
}

#[test]
fn test_identifier_in_its_own_declaration() {
    let mut a = analysed("INT x = x + 1");
    assert_eq!(a.codes(), vec![E5004]);
    let applied = a.named(Identifier, "x")[0];
    assert!(a.program.tree[applied].status.contains(Status::UNINITIALISED));
}

#[test]
fn test_recursive_routine_is_not_uninitialised() {
    let mut a = analysed("PROC f = (INT n) INT: IF n = 0 THEN 1 ELSE n * f (n - 1) FI; INT k = f (3)");
    assert_eq!(a.codes(), vec![]);
}

#[test]
fn test_parameterless_procedure_is_deprocedured_then_voided() {
    let mut a = analysed("random; SKIP");
    assert_eq!(a.codes(), vec![]);
    let voiding = a.first(Voiding);
    assert_eq!(coercions(&a, voiding), vec![Voiding, Deproceduring]);
}

#[test]
fn test_loop_parts() {
    let mut a = analysed("INT n := 0; FOR i FROM 1 TO 3 WHILE n < 10 DO n +:= i OD");
    assert_eq!(a.codes(), vec![]);
    let counter = a.named(DefiningIdentifier, "i")[0];
    assert_eq!(a.mode(counter), MoidId::INT);
    assert_eq!(a.tag_mode("i"), "INT");
}

#[test]
fn test_balanced_destination_is_the_deepest_name() {
    let mut a = analysed("REF INT ri = LOC INT; REF REF INT rri = LOC REF INT; (TRUE | ri | rri) := 5; SKIP");
    assert_eq!(a.codes(), vec![]);
    let assignation = a.first(Assignation);
    assert_eq!(a.mode_text(assignation), "REF INT");
    let destination = a.program.tree.sub(assignation).unwrap();
    assert_eq!(a.mode_text(destination), "REF INT");
    assert_eq!(a.all(Dereferencing).len(), 1);
}

#[test]
fn test_string_append() {
    let mut a = analysed("STRING s := \"ab\"; s +:= \"cd\"");
    assert_eq!(a.codes(), vec![]);
}

#[test]
fn test_operator_body_sees_the_standard_operator() {
    let mut a = analysed("OP + = (INT a, INT b) INT: a - b; INT k = 1 + 2");
    assert_eq!(a.codes(), vec![]);
    let plus = a.named(Operator, "+");
    assert_eq!(plus.len(), 1);
    let tag = a.program.tree[plus[0]].tag.unwrap();
    assert!(a.program.tables.tag(tag).table != TableId::STANDENV);
    let minus = a.named(Operator, "-")[0];
    let tag = a.program.tree[minus].tag.unwrap();
    assert_eq!(a.program.tables.tag(tag).table, TableId::STANDENV);
}
