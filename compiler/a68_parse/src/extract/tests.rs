use super::*;
use pretty_assertions::assert_eq;

use crate::test_util::{lexed, Parsed};

fn extracted(src: &str) -> Parsed {
    let mut parsed = lexed(src);
    let top = parsed.top.unwrap();
    let matches = crate::brackets::check(&parsed.program, top, &mut parsed.diags).unwrap();
    crate::top_down::structure(&mut parsed.program, top, &matches, &mut parsed.diags).unwrap();
    crate::standenv::install(&mut parsed.program);
    crate::tables::open_ranges(&mut parsed.program, top);
    extract(&mut parsed.program, top, &mut parsed.diags).unwrap();
    parsed
}

#[test]
fn test_mode_declaration_binds_indicants() {
    let mut parsed = extracted("MODE NODE = STRUCT(INT v, REF NODE next), LIST = REF NODE; SKIP");
    let defining = parsed.all(Attribute::DefiningIndicant);
    assert_eq!(defining.len(), 2);
    let applied = parsed.all(Attribute::Indicant);
    let node_tag = parsed.program.tree[defining[0]].tag;
    assert!(applied
        .iter()
        .filter(|&&p| parsed.program.text(p) == "NODE")
        .all(|&p| parsed.program.tree[p].tag == node_tag));
    assert!(parsed.codes().is_empty());
}

#[test]
fn test_standard_indicants_resolve() {
    let parsed = extracted("INT i = 1; SKIP");
    let int = parsed.first(Attribute::Indicant);
    let tag = parsed.program.tree[int].tag.unwrap();
    assert_eq!(parsed.program.tables.tag(tag).table, TableId::STANDENV);
}

#[test]
fn test_priority_declaration() {
    let mut parsed = extracted("PRIO MAX = 9, MIN = 9; SKIP");
    let ops = parsed.all(Attribute::DefiningOperator);
    assert_eq!(ops.len(), 2);
    assert_eq!(parsed.program.tree[ops[0]].priority, 9);
    let max = parsed.program.interner.intern("MAX");
    let table = parsed.program.tree[ops[0]].table.unwrap();
    assert_eq!(parsed.program.tables.priority_of(table, max), Some(9));
    assert!(parsed.codes().is_empty());
}

#[test]
fn test_priority_out_of_range() {
    let mut parsed = extracted("PRIO MAX = 12; SKIP");
    assert_eq!(parsed.codes(), vec![ErrorCode::E1011]);
}

#[test]
fn test_operator_tag_makes_bold_word_an_operator() {
    let parsed = extracted("OP NEG = (INT a) INT: -a; NEG 1");
    let applied: Vec<_> = parsed
        .all(Attribute::Operator)
        .into_iter()
        .filter(|&p| parsed.program.text(p) == "NEG")
        .collect();
    assert_eq!(applied.len(), 1);
    assert_eq!(parsed.all(Attribute::DefiningOperator).len(), 1);
}

#[test]
fn test_operator_declaration_without_tag() {
    let mut parsed = extracted("OP (INT a) INT: a; SKIP");
    assert_eq!(parsed.codes(), vec![ErrorCode::E1012]);
}

#[test]
fn test_keyword_cannot_be_a_mode() {
    let mut parsed = extracted("MODE SKIP = INT; SKIP");
    assert_eq!(parsed.codes(), vec![ErrorCode::E1009]);
}

#[test]
fn test_duplicate_mode_in_one_range() {
    let mut parsed = extracted("MODE A = INT; MODE A = REAL; SKIP");
    assert_eq!(parsed.codes(), vec![ErrorCode::E1006]);
}

#[test]
fn test_unknown_bold_word() {
    let mut parsed = extracted("FOO x = 1; SKIP");
    let foo = parsed.first(Attribute::Indicant);
    assert!(parsed.program.tree[foo].status.contains(Status::ERROR));
    assert_eq!(parsed.codes(), vec![ErrorCode::E1005]);
}
