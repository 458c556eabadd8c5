use pretty_assertions::assert_eq;

use a68_ir::Status;

use crate::test_util::compiled;
use crate::Construct;

fn constructs(level: u8, src: &str) -> Vec<Construct> {
    compiled(level, src).result.units.iter().map(|u| u.construct).collect()
}

#[test]
fn test_level_zero_generates_nothing() {
    let unit = compiled(0, "INT k = 1; SKIP");
    assert!(unit.result.is_empty());
    assert_eq!(unit.result.code, "");
}

#[test]
fn test_denotation_at_level_one() {
    let unit = compiled(1, "INT k = 1; SKIP");
    assert_eq!(unit.result.units.len(), 1);
    let compiled = &unit.result.units[0];
    assert_eq!(compiled.construct, Construct::Denotation);
    assert!(compiled.constant);
    assert!(compiled.name.starts_with("unit_denotation_"));

    let code = &unit.result.code;
    assert!(code.starts_with("/* Generated by a68c, optimise level 1 */"));
    assert!(code.contains(&format!("CODE ({})", compiled.name)));
    assert!(code.contains("PUSH_PRIMITIVE (p, 1, A68_INT);"));
    assert!(code.contains(&format!("EDOC ({}, N ({}))", compiled.name, compiled.node.raw())));
}

#[test]
fn test_compiled_nodes_are_marked() {
    let unit = compiled(1, "INT k = 1; SKIP");
    let compiled = &unit.result.units[0];
    let node = &unit.program.tree[compiled.node];
    assert!(node.status.contains(Status::COMPILED | Status::CONSTANT));
    assert_eq!(node.genie.compile_name.as_deref(), Some(compiled.name.as_str()));
    assert_eq!(unit.result.unit(compiled.node), Some(compiled));
}

#[test]
fn test_level_one_leaves_formulae_alone() {
    let found = constructs(1, "INT i = 7; INT k = i + 2; SKIP");
    assert!(!found.contains(&Construct::Formula));
}

#[test]
fn test_formula_named_after_operator() {
    let unit = compiled(2, "INT i = 7; INT k = i + 2; SKIP");
    let names = unit.names();
    assert!(names.iter().any(|n| n.starts_with("add_formula_")), "{names:?}");
}

#[test]
fn test_folded_formula_is_a_denotation() {
    let found = constructs(2, "INT k = 1 + 2 * 3; SKIP");
    assert_eq!(found, vec![Construct::Denotation]);
    let unit = compiled(2, "INT k = 1 + 2 * 3; SKIP");
    assert!(unit.result.code.contains("PUSH_PRIMITIVE (p, 7, A68_INT);"));
}

#[test]
fn test_overflowing_formula_is_left_to_the_run_time() {
    let mut unit = compiled(2, "INT k = max int + 1; INT j = max int - 1; SKIP");
    assert_eq!(unit.codes(), vec![]);
    let names = unit.names();
    assert!(!names.iter().any(|n| n.starts_with("add_formula_")), "{names:?}");
    let code = &unit.result.code;
    assert!(!code.contains("9223372036854775807 + 1"), "{code}");
    assert!(code.contains("PUSH_PRIMITIVE (p, 9223372036854775806, A68_INT);"), "{code}");
}

#[test]
fn test_user_calls_need_level_three() {
    let src = "PROC f = (INT a) INT: a; INT k = f (1); SKIP";
    assert!(!constructs(2, src).contains(&Construct::Call));
    assert!(constructs(3, src).contains(&Construct::Call));
}

#[test]
fn test_conditional_at_level_four() {
    let src = "BOOL b = TRUE; INT k = IF b THEN 1 ELSE 2 FI; SKIP";
    assert!(!constructs(3, src).contains(&Construct::Conditional));
    let unit = compiled(4, src);
    let conditional = unit
        .result
        .units
        .iter()
        .find(|u| u.construct == Construct::Conditional)
        .map(|u| u.name.clone());
    assert!(conditional.is_some(), "{:?}", unit.names());
    let code = &unit.result.code;
    assert!(code.contains("OPEN_STATIC_FRAME"));
    assert!(code.contains("== A68_TRUE) {"));
    assert!(code.contains("} else {"));
    assert!(code.contains("CLOSE_FRAME;"));
}

#[test]
fn test_function_names_are_unique() {
    let unit = compiled(2, "INT i = 1, j = 2; INT k = i + j, l = i * j; SKIP");
    let mut names = unit.names();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total);
}

#[test]
fn test_void_constructs_are_named_after_their_shape() {
    let unit = compiled(3, "PROC f = (INT a) INT: a; PROC g = INT: 2; INT x; f (1); g; x := 3; SKIP");
    let names = unit.names();
    assert!(names.iter().any(|n| n.starts_with("f_void_call_")), "{names:?}");
    assert!(names.iter().any(|n| n.starts_with("g_void_deproc_")), "{names:?}");
    assert!(names.iter().any(|n| n.contains("_void_assign_")), "{names:?}");
    assert!(!names.iter().any(|n| n.contains("voiding")), "{names:?}");
}
