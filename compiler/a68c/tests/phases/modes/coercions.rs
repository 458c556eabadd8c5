use pretty_assertions::assert_eq;

use a68_diagnostic::{ErrorCode, Phase};
use a68_ir::{Attribute, Options, TableId};

use crate::common::{all, check_ok, check_with, codes, mode_of, named, spine, tag_mode};

/// Coercions stacked on the unit at `p`, outermost first.
fn coercions(program: &a68_ir::Program, p: a68_ir::NodeId) -> Vec<Attribute> {
    spine(program, p)
        .into_iter()
        .take_while(|&attr| attr != Attribute::Unit)
        .collect()
}

#[test]
fn test_identity_declaration_and_print() {
    let compiler = check_ok("BEGIN INT i = 42; print (i) END");
    let program = &compiler.program;
    assert_eq!(tag_mode(program, "i"), "INT");
    assert!(all(program, Attribute::Dereferencing).is_empty());

    let argument = program.tree.child_ids(all(program, Attribute::Argument)[0])[1];
    assert_eq!(coercions(program, argument), vec![Attribute::Rowing, Attribute::Uniting]);
}

#[test]
fn test_assignation_widens_its_source() {
    let compiler = check_ok("BEGIN REF REAL x = LOC REAL; x := 1 END");
    let program = &compiler.program;
    let widening = all(program, Attribute::Widening);
    assert_eq!(widening.len(), 1);
    assert_eq!(mode_of(program, widening[0]), "REAL");
    let assignation = all(program, Attribute::Assignation)[0];
    assert_eq!(mode_of(program, assignation), "REF REAL");
    assert!(!all(program, Attribute::Voiding).is_empty());
}

#[test]
fn test_union_initialiser_is_united() {
    let compiler = check_ok(
        "MODE COLOUR = UNION (INT, REAL);\n\
         COLOUR c = 3.14;\n\
         CASE c IN (INT i): print (i), (REAL r): print (r) ESAC",
    );
    let program = &compiler.program;
    let colour = tag_mode(program, "c");
    let mut alternatives: Vec<&str> = colour
        .strip_prefix("UNION (")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap()
        .split(", ")
        .collect();
    alternatives.sort_unstable();
    assert_eq!(alternatives, vec!["INT", "REAL"]);
    let uniting = all(program, Attribute::Uniting);
    assert!(uniting.iter().any(|&u| mode_of(program, u) == colour));
    assert_eq!(tag_mode(program, "i"), "INT");
    assert_eq!(tag_mode(program, "r"), "REAL");
}

#[test]
fn test_operator_overloading() {
    let compiler = check_ok("OP + = (INT a, INT b) INT: a*a + b*b; PRIO + = 6; print (1 + 2)");
    let program = &compiler.program;
    let plus = named(program, Attribute::Operator, "+");
    assert_eq!(plus.len(), 2);
    let table = |p| program.tables.tag(program.tree[p].tag.unwrap()).table;
    assert_eq!(table(plus[0]), TableId::STANDENV);
    assert!(table(plus[1]) != TableId::STANDENV);
}

#[test]
fn test_mode_errors_stop_before_code_generation() {
    let (compiler, outcome) = check_with(Options::default(), "INT i; i[1] := 0");
    assert_eq!(outcome.failed, Some(Phase::ModeChecker));
    assert!(compiler.top().is_some());
}

#[test]
fn test_checker_diagnostics() {
    assert_eq!(codes("[1:3] INT r; r[1, 2] := 0"), vec![ErrorCode::E3013]);
    assert_eq!(codes("REAL x = sqrt (1.0, 2.0)"), vec![ErrorCode::E3010]);
    assert_eq!(codes("INT i; 1 := i"), vec![ErrorCode::E3004]);
}

#[test]
fn test_uninitialised_identifier_is_a_warning() {
    let (mut compiler, outcome) = check_with(Options::default(), "INT x = x + 1");
    assert!(outcome.is_ok());
    let found = compiler.diags.flush();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, ErrorCode::E5004);
    assert!(found[0].is_warning());
}

#[test]
fn test_portability_warnings() {
    let options = Options {
        portcheck: true,
        ..Options::default()
    };
    let (mut compiler, outcome) = check_with(options, "BOOL b = TRUE & FALSE");
    assert!(outcome.is_ok());
    let found: Vec<ErrorCode> = compiler.diags.flush().into_iter().map(|d| d.code).collect();
    assert_eq!(found, vec![ErrorCode::E5001]);
    assert_eq!(codes("BOOL b = TRUE & FALSE"), vec![]);
}

#[test]
fn test_overlong_mode_is_clamped_with_a_warning() {
    let (mut compiler, _) = check_with(Options::default(), "LONG LONG LONG INT a = 1; SKIP");
    let found = compiler.diags.flush();
    assert_eq!(found[0].code, ErrorCode::E2009);
    assert!(found[0].is_warning());
}
