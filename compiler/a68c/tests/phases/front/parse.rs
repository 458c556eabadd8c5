use pretty_assertions::assert_eq;

use a68_diagnostic::{ErrorCode, Phase};
use a68_ir::{Attribute, Options};

use crate::common::{all, check_ok, check_with, codes, codes_with, named};

#[test]
fn test_bracket_mismatch_names_the_missing_closer() {
    let (mut compiler, outcome) = check_with(Options::default(), "BEGIN IF x THEN y END");
    assert_eq!(outcome.failed, Some(Phase::Parser));
    let found = compiler.diags.flush();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, ErrorCode::E1001);
    assert_eq!(found[0].message, "\"IF\" without matching \"FI\"");
}

#[test]
fn test_top_is_the_particular_program() {
    let compiler = check_ok("BEGIN INT i = 42; print (i) END");
    let top = compiler.top().unwrap();
    assert_eq!(compiler.program.tree.top, Some(top));
    assert_eq!(compiler.program.tree.attribute(top), Attribute::ParticularProgram);
}

#[test]
fn test_user_priority_governs_formula() {
    let compiler = check_ok("OP + = (INT a, INT b) INT: a*a + b*b; PRIO + = 6; print (1 + 2)");
    let program = &compiler.program;
    let formulae = all(program, Attribute::Formula);
    let outer = formulae
        .iter()
        .copied()
        .find(|&f| program.tree.descendants(f).into_iter().any(|d| program.text(d) == "1"))
        .unwrap();
    let op = program.tree.find_child(outer, Attribute::Operator).unwrap();
    assert_eq!(program.tree[op].priority, 6);
    assert_eq!(all(program, Attribute::PriorityDeclaration).len(), 1);
}

#[test]
fn test_united_case_clause_shape() {
    let compiler = check_ok(
        "MODE COLOUR = UNION (INT, REAL);\n\
         COLOUR c = 3.14;\n\
         CASE c IN (INT i): print (i), (REAL r): print (r) ESAC",
    );
    let program = &compiler.program;
    assert_eq!(all(program, Attribute::UnitedCaseClause).len(), 1);
    assert_eq!(all(program, Attribute::SpecifiedUnit).len(), 2);
}

#[test]
fn test_undeclared_identifier() {
    assert_eq!(codes("BEGIN INT i = 1;\nprint (j) END"), vec![ErrorCode::E1005]);
}

#[test]
fn test_declared_twice_in_one_range() {
    assert_eq!(codes("INT i = 1; INT i = 2; SKIP"), vec![ErrorCode::E1006]);
    assert_eq!(codes("INT i = 1; BEGIN INT i = 2; SKIP END"), vec![]);
}

#[test]
fn test_one_syntax_error_per_line() {
    let found = codes("BEGIN ) ) END");
    assert_eq!(found.len(), 1);
}

#[test]
fn test_brackets_option_makes_square_brackets_parentheses() {
    let options = Options {
        brackets: true,
        ..Options::default()
    };
    assert_eq!(codes_with(options, "INT x = [TRUE | 1 | 2]; print (x)"), vec![]);
}

#[test]
fn test_labels_and_jumps() {
    let compiler = check_ok("BEGIN INT i := 0; again: i +:= 1; IF i < 3 THEN GOTO again FI END");
    let program = &compiler.program;
    let jump = all(program, Attribute::Jump)[0];
    let label = program.tree.find_child(jump, Attribute::Identifier).unwrap();
    assert!(program.tree[label].tag.is_some());
    assert_eq!(named(program, Attribute::Identifier, "again").len(), 1);
}

#[test]
fn test_loop_clause() {
    let compiler = check_ok("INT sum := 0; FOR i FROM 1 TO 10 WHILE sum < 20 DO sum +:= i OD; print (sum)");
    assert_eq!(all(&compiler.program, Attribute::LoopClause).len(), 1);
}

#[test]
fn test_leaves_read_back_as_the_source() {
    let compiler = check_ok("BEGIN INT i = 42; print (i) END");
    let program = &compiler.program;
    let tree = &program.tree;
    let leaves: Vec<&str> = tree
        .preorder(tree.top)
        .into_iter()
        .filter(|&p| tree.sub(p).is_none())
        .map(|p| program.text(p))
        .collect();
    assert_eq!(leaves.join(" "), "BEGIN INT i = 42 ; print ( i ) END");
}
