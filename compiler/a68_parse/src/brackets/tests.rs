use super::*;
use pretty_assertions::assert_eq;

use crate::test_util::lexed;

fn check_source(src: &str) -> (usize, Vec<(ErrorCode, String)>) {
    let mut lexed = lexed(src);
    let top = lexed.top.unwrap();
    let matches = check(&lexed.program, top, &mut lexed.diags).unwrap();
    let messages = lexed.messages().into_iter().map(|d| (d.code, d.message)).collect();
    (matches.len(), messages)
}

#[test]
fn test_nested_pairs_match() {
    let (pairs, messages) = check_source("BEGIN IF a THEN (b) ELSE c[1] FI END");
    assert_eq!(pairs, 4);
    assert!(messages.is_empty());
}

#[test]
fn test_if_without_fi_before_end() {
    let (pairs, messages) = check_source("BEGIN IF x THEN y END");
    assert_eq!(pairs, 1);
    assert_eq!(messages, vec![(ErrorCode::E1001, "\"IF\" without matching \"FI\"".to_string())]);
}

#[test]
fn test_stray_closer() {
    let (_, messages) = check_source("x := 1)");
    assert_eq!(messages, vec![(ErrorCode::E1002, "\")\" without matching \"(\"".to_string())]);
}

#[test]
fn test_unclosed_at_end_of_file() {
    let (_, messages) = check_source("BEGIN x := 1");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, ErrorCode::E1001);
    assert!(messages[0].1.contains("\"END\""));
}

#[test]
fn test_format_delimiters_pair_up() {
    let (pairs, messages) = check_source("f := $ 3d, x $");
    assert_eq!(pairs, 1);
    assert!(messages.is_empty());
}

#[test]
fn test_loop_body_brackets() {
    let (pairs, messages) = check_source("FOR i TO 3 DO print(i) OD");
    assert_eq!(pairs, 2);
    assert!(messages.is_empty());
}
