use super::*;
use pretty_assertions::assert_eq;

use crate::brackets;
use crate::test_util::{lexed, Parsed};

fn structured(src: &str) -> Parsed {
    let mut parsed = lexed(src);
    let top = parsed.top.unwrap();
    let matches = brackets::check(&parsed.program, top, &mut parsed.diags).unwrap();
    structure(&mut parsed.program, top, &matches, &mut parsed.diags).unwrap();
    parsed
}

#[test]
fn test_packet_holds_opener_contents_and_closer() {
    let parsed = structured("BEGIN x END");
    let top = parsed.top.unwrap();
    assert!(parsed.program.tree.sub(top).is_some());
    assert_eq!(
        parsed.children(top),
        vec![Attribute::BeginSymbol, Attribute::Identifier, Attribute::EndSymbol]
    );
}

#[test]
fn test_conditional_parts() {
    let parsed = structured("IF a THEN b ELIF c THEN d ELSE e FI");
    let top = parsed.top.unwrap();
    assert_eq!(
        parsed.children(top),
        vec![
            Attribute::IfPart,
            Attribute::ThenPart,
            Attribute::ElifPart,
            Attribute::ThenPart,
            Attribute::ElsePart,
            Attribute::FiSymbol,
        ]
    );
}

#[test]
fn test_case_parts() {
    let parsed = structured("CASE n IN a, b OUSE m IN c OUT d ESAC");
    let top = parsed.top.unwrap();
    assert_eq!(
        parsed.children(top),
        vec![
            Attribute::CasePart,
            Attribute::InPart,
            Attribute::OusePart,
            Attribute::InPart,
            Attribute::OutPart,
            Attribute::EsacSymbol,
        ]
    );
}

#[test]
fn test_brief_choice_parts() {
    let parsed = structured("(a | b |: c | d | e)");
    let top = parsed.top.unwrap();
    assert_eq!(
        parsed.children(top),
        vec![
            Attribute::IfPart,
            Attribute::ThenPart,
            Attribute::ElifPart,
            Attribute::ThenPart,
            Attribute::ElsePart,
            Attribute::CloseSymbol,
        ]
    );
}

#[test]
fn test_plain_parentheses_have_no_parts() {
    let parsed = structured("(a, b)");
    let top = parsed.top.unwrap();
    assert_eq!(
        parsed.children(top),
        vec![
            Attribute::OpenSymbol,
            Attribute::Identifier,
            Attribute::CommaSymbol,
            Attribute::Identifier,
            Attribute::CloseSymbol,
        ]
    );
}

#[test]
fn test_loop_clause_gathers_its_parts() {
    let parsed = structured("FOR i FROM 2 BY 2 TO 10 WHILE ok DO f(i) UNTIL done OD");
    let top = parsed.top.unwrap();
    assert!(parsed.program.tree.is(top, Attribute::LoopClause));
    assert!(parsed.program.tree.next(top).is_none());
    assert_eq!(
        parsed.children(top),
        vec![
            Attribute::ForPart,
            Attribute::FromPart,
            Attribute::ByPart,
            Attribute::ToPart,
            Attribute::WhilePart,
            Attribute::DoPart,
            Attribute::UntilPart,
            Attribute::OdSymbol,
        ]
    );
}

#[test]
fn test_bare_do_loop() {
    let mut parsed = structured("x; DO f OD");
    let loops = parsed.all(Attribute::LoopClause);
    assert_eq!(loops.len(), 1);
    assert_eq!(parsed.children(loops[0]), vec![Attribute::DoPart, Attribute::OdSymbol]);
    assert!(parsed.codes().is_empty());
}

#[test]
fn test_downto_is_a_to_part() {
    let parsed = structured("FOR i FROM 10 DOWNTO 1 DO SKIP OD");
    let top = parsed.top.unwrap();
    assert!(parsed.children(top).contains(&Attribute::ToPart));
}
