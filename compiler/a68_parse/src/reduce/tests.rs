use a68_diagnostic::ErrorCode;
use a68_ir::{Attribute, NodeId, Options, Status};
use pretty_assertions::assert_eq;

use super::Pat;
use crate::test_util::{parsed, parsed_with, Parsed};

/// The phrase of kind `attr` whose leaves read `text`.
fn phrase(parsed: &Parsed, attr: Attribute, text: &str) -> NodeId {
    parsed
        .all(attr)
        .into_iter()
        .find(|&p| parsed.text(p) == text)
        .unwrap_or_else(|| panic!("no {attr} reading {text:?}"))
}

#[test]
fn test_identity_declaration_and_call() {
    let mut parsed = parsed("BEGIN INT i = 42; print(i) END");
    let top = parsed.top.unwrap();
    assert!(parsed.program.tree.is(top, Attribute::ParticularProgram));

    let closed = parsed.first(Attribute::ClosedClause);
    assert_eq!(
        parsed.children(closed),
        vec![Attribute::BeginSymbol, Attribute::SerialClause, Attribute::EndSymbol]
    );
    let serial = parsed.program.tree.find_child(closed, Attribute::SerialClause).unwrap();
    assert_eq!(
        parsed.children(serial),
        vec![Attribute::DeclarationList, Attribute::SemiSymbol, Attribute::Unit]
    );

    let identity = parsed.first(Attribute::IdentityDeclaration);
    assert_eq!(
        parsed.children(identity),
        vec![
            Attribute::Declarer,
            Attribute::DefiningIdentifier,
            Attribute::EqualsSymbol,
            Attribute::Unit,
        ]
    );

    let call = parsed.first(Attribute::Specification);
    assert_eq!(parsed.children(call), vec![Attribute::Primary, Attribute::GenericArgument]);
    let argument = parsed.first(Attribute::GenericArgument);
    assert_eq!(
        parsed.children(argument),
        vec![Attribute::OpenSymbol, Attribute::Unit, Attribute::CloseSymbol]
    );
    assert!(parsed.codes().is_empty());
}

#[test]
fn test_united_case_clause() {
    let mut parsed = parsed(
        "MODE COLOUR = UNION(INT, REAL);\n\
         COLOUR c = 3.14;\n\
         CASE c IN (INT i): print(i), (REAL r): print(r) ESAC",
    );
    assert_eq!(parsed.all(Attribute::ModeDeclaration).len(), 1);
    assert_eq!(parsed.all(Attribute::UnitedCaseClause).len(), 1);
    let specified = parsed.all(Attribute::SpecifiedUnit);
    assert_eq!(specified.len(), 2);
    for unit in specified {
        assert_eq!(
            parsed.children(unit),
            vec![Attribute::Specifier, Attribute::ColonSymbol, Attribute::Unit]
        );
    }
    let pack = parsed.first(Attribute::UnionPack);
    assert_eq!(
        parsed.children(pack),
        vec![
            Attribute::OpenSymbol,
            Attribute::Declarer,
            Attribute::CommaSymbol,
            Attribute::Declarer,
            Attribute::CloseSymbol,
        ]
    );
    assert!(parsed.codes().is_empty());
}

#[test]
fn test_user_priority_governs_formula() {
    let mut parsed = parsed("OP + = (INT a, INT b) INT: a*a + b*b; PRIO + = 6; print(1 + 2)");
    let formula = phrase(&parsed, Attribute::Formula, "1 + 2");
    assert_eq!(
        parsed.children(formula),
        vec![Attribute::Secondary, Attribute::Operator, Attribute::Secondary]
    );
    let op = parsed.program.tree.find_child(formula, Attribute::Operator).unwrap();
    assert_eq!(parsed.program.tree[op].priority, 6);

    let body = phrase(&parsed, Attribute::Formula, "a * a + b * b");
    assert_eq!(
        parsed.children(body),
        vec![Attribute::Formula, Attribute::Operator, Attribute::Formula]
    );
    assert_eq!(parsed.all(Attribute::BriefOperatorDeclaration).len(), 1);
    assert_eq!(parsed.all(Attribute::PriorityDeclaration).len(), 1);
    assert!(parsed.codes().is_empty());
}

#[test]
fn test_formula_is_left_associative() {
    let parsed = parsed("INT x = 1 - 2 - 3; SKIP");
    let outer = phrase(&parsed, Attribute::Formula, "1 - 2 - 3");
    let lhs = parsed.program.tree.sub(outer).unwrap();
    assert!(parsed.program.tree.is(lhs, Attribute::Formula));
    assert_eq!(parsed.text(lhs), "1 - 2");
}

#[test]
fn test_monadic_binds_tighter_than_dyadic() {
    let parsed = parsed("INT x = - 1 * 2; SKIP");
    let monadic = parsed.first(Attribute::MonadicFormula);
    assert_eq!(parsed.text(monadic), "- 1");
    let op = parsed.program.tree.sub(monadic).unwrap();
    assert_eq!(parsed.program.tree[op].priority, crate::MONADIC_PRIORITY);
}

#[test]
fn test_slice_of_generator() {
    let mut parsed = parsed("REF [] CHAR s = LOC FLEX [1:10] CHAR [2:5]");
    let slice = parsed.first(Attribute::Specification);
    let primary = parsed.program.tree.sub(slice).unwrap();
    let generator = parsed.program.tree.descend(primary, &[Attribute::Primary]);
    assert!(parsed.program.tree.is(generator, Attribute::Generator));
    let argument = parsed.first(Attribute::GenericArgument);
    assert_eq!(
        parsed.children(argument),
        vec![Attribute::SubSymbol, Attribute::Trimmer, Attribute::BusSymbol]
    );
    assert_eq!(parsed.all(Attribute::IdentityDeclaration).len(), 1);
    assert!(parsed.codes().is_empty());
}

#[test]
fn test_declaration_forms() {
    let mut parsed = parsed("INT a = 1, b = 2; REAL x, y := 1.0; PROC p = VOID: SKIP; HEAP INT h; p");
    let identity = parsed.first(Attribute::IdentityDeclaration);
    assert_eq!(parsed.text(identity), "INT a = 1 , b = 2");
    let variables = parsed.all(Attribute::VariableDeclaration);
    assert_eq!(variables.len(), 2);
    assert_eq!(parsed.text(variables[0]), "REAL x , y := 1.0");
    assert_eq!(parsed.text(variables[1]), "HEAP INT h");
    let procedure = parsed.first(Attribute::ProcedureDeclaration);
    assert_eq!(
        parsed.children(procedure),
        vec![
            Attribute::ProcSymbol,
            Attribute::DefiningIdentifier,
            Attribute::EqualsSymbol,
            Attribute::Unit,
        ]
    );
    assert_eq!(parsed.all(Attribute::RoutineText).len(), 1);
    assert!(parsed.codes().is_empty());
}

#[test]
fn test_structure_declarer_and_selection() {
    let mut parsed = parsed("MODE P = STRUCT(INT x, y, REAL z); P p = (1, 2, 3.0); x OF p");
    let pack = parsed.first(Attribute::StructurePack);
    let fields: Vec<_> = parsed
        .program
        .tree
        .children(pack)
        .filter(|&c| parsed.program.tree.is(c, Attribute::StructuredField))
        .collect();
    assert_eq!(fields.len(), 2);
    assert_eq!(parsed.text(fields[0]), "INT x , y");
    let selection = parsed.first(Attribute::Selection);
    assert_eq!(
        parsed.children(selection),
        vec![Attribute::FieldIdentifier, Attribute::OfSymbol, Attribute::Secondary]
    );
    assert_eq!(parsed.all(Attribute::CollateralClause).len(), 1);
    assert!(parsed.codes().is_empty());
}

#[test]
fn test_conditional_with_elif() {
    let mut parsed = parsed("INT n = 1; IF n = 1 THEN SKIP ELIF n = 2 THEN SKIP ELSE SKIP FI");
    let conditional = parsed.first(Attribute::ConditionalClause);
    assert_eq!(
        parsed.children(conditional),
        vec![Attribute::IfPart, Attribute::ThenPart, Attribute::ElifClause, Attribute::FiSymbol]
    );
    let elif = parsed.first(Attribute::ElifClause);
    assert_eq!(
        parsed.children(elif),
        vec![Attribute::ElifPart, Attribute::ThenPart, Attribute::ElsePart]
    );
    assert!(parsed.codes().is_empty());
}

#[test]
fn test_brief_forms() {
    let mut parsed = parsed("INT n = 2; INT m = (n | 10, 20 | 30); INT k = (n > 1 | n | 0); SKIP");
    assert_eq!(parsed.all(Attribute::IntegerCaseClause).len(), 1);
    assert_eq!(parsed.all(Attribute::ConditionalClause).len(), 1);
    assert!(parsed.codes().is_empty());
}

#[test]
fn test_loop_clause() {
    let mut parsed = parsed("FOR i FROM 1 TO 3 DO print(i) OD");
    let clause = parsed.first(Attribute::LoopClause);
    assert_eq!(
        parsed.children(clause),
        vec![
            Attribute::ForPart,
            Attribute::FromPart,
            Attribute::ToPart,
            Attribute::DoPart,
            Attribute::OdSymbol,
        ]
    );
    let id = parsed.first(Attribute::DefiningIdentifier);
    let tag = parsed.program.tree[id].tag.unwrap();
    assert_eq!(parsed.program.tables.tag(tag).moid, Some(a68_ir::MoidId::INT));
    assert!(parsed.codes().is_empty());
}

#[test]
fn test_format_text_pictures() {
    let mut parsed = parsed("FORMAT f = $ 3d, x $; SKIP");
    let format = parsed.first(Attribute::FormatText);
    assert_eq!(
        parsed.children(format),
        vec![
            Attribute::FormatDelimiterSymbol,
            Attribute::Picture,
            Attribute::CommaSymbol,
            Attribute::Picture,
            Attribute::FormatDelimiterSymbol,
        ]
    );
    assert!(parsed.codes().is_empty());
}

#[test]
fn test_ambiguous_format_pattern() {
    let mut parsed = parsed("FORMAT f = $ 3d + 2d $; SKIP");
    assert_eq!(parsed.codes(), vec![ErrorCode::E1013]);
}

#[test]
fn test_exit_needs_a_labeled_unit() {
    let mut parsed = parsed("BEGIN SKIP EXIT SKIP END");
    assert_eq!(parsed.codes(), vec![ErrorCode::E1007]);
}

#[test]
fn test_exit_before_label() {
    let mut parsed = parsed("BEGIN SKIP EXIT l: SKIP END");
    assert!(parsed.codes().is_empty());
    assert_eq!(parsed.all(Attribute::LabeledUnit).len(), 1);
}

#[test]
fn test_declaration_after_label() {
    let mut parsed = parsed("l: SKIP; INT x = 1; SKIP");
    assert_eq!(parsed.codes(), vec![ErrorCode::E1008]);
}

#[test]
fn test_program_must_be_serial() {
    let mut parsed = parsed("1, 2");
    assert_eq!(parsed.codes(), vec![ErrorCode::E1004]);
}

#[test]
fn test_missing_priority_in_formula() {
    let mut parsed = parsed("OP MAX = (INT a, INT b) INT: a;\n1 MAX 2");
    assert_eq!(parsed.codes(), vec![ErrorCode::E1010]);
    let max = phrase(&parsed, Attribute::Operator, "MAX");
    assert!(parsed.program.tree[max].status.contains(Status::ERROR));
}

#[test]
fn test_trailing_semicolon() {
    let mut parsed = parsed("BEGIN SKIP; END");
    assert_eq!(parsed.codes(), vec![ErrorCode::E1003]);
}

#[test]
fn test_invalid_sequence_is_recovered() {
    let mut parsed = parsed("BEGIN INT x = 1; x SKIP END");
    let codes = parsed.codes();
    assert_eq!(codes, vec![ErrorCode::E1004]);
    assert!(parsed
        .all(Attribute::SerialClause)
        .iter()
        .any(|&s| parsed.program.tree[s].status.contains(Status::ERROR)));
}

#[test]
fn test_brackets_alias_parentheses() {
    let options = Options {
        brackets: true,
        ..Options::default()
    };
    let mut parsed = parsed_with(options, "INT x = [TRUE | 1 | 2]; SKIP");
    let conditional = parsed.first(Attribute::ConditionalClause);
    assert!(parsed.program.tree[conditional].status.contains(Status::ALIAS_BRACKETS));
    assert!(parsed.codes().is_empty());
}

#[test]
fn test_reductions_are_traced_without_changing_the_tree() {
    let options = Options {
        reductions: true,
        ..Options::default()
    };
    let traced = parsed_with(options, "INT i = 1; i");
    let plain = parsed("INT i = 1; i");
    assert_eq!(traced.program.tree.len(), plain.program.tree.len());
}

#[test]
fn test_patterns_match_negation_and_any_phrase() {
    let parsed = parsed("BEGIN SKIP END");
    let tree = &parsed.program.tree;
    let closed = parsed.first(Attribute::ClosedClause);
    let begin = tree.sub(closed).unwrap();
    assert!(Pat::A(Attribute::ClosedClause).accepts(tree, closed));
    assert!(!Pat::Not(Attribute::ClosedClause).accepts(tree, closed));
    assert!(Pat::Not(Attribute::Unit).accepts(tree, begin));
    assert!(Pat::Any.accepts(tree, closed));
    assert!(!Pat::Any.accepts(tree, begin));
}

#[test]
fn test_exit_at_end_of_clause_is_one_error() {
    let mut parsed = parsed("BEGIN SKIP EXIT END");
    assert_eq!(parsed.codes(), vec![ErrorCode::E1003]);
}

#[test]
fn test_label_before_declaration_in_a_packet() {
    let mut parsed = parsed("BEGIN l: INT x = 1; SKIP END");
    assert_eq!(parsed.codes(), vec![ErrorCode::E1008]);
}
