use super::*;
use crate::{tokenise, MemoryLoader};
use a68_ir::{Options, Program};
use pretty_assertions::assert_eq;

fn run(src: &str) -> (Vec<String>, Vec<ErrorCode>) {
    let mut program = Program::new(Options::default());
    let mut diags = DiagnosticQueue::new();
    let tokens = tokenise(&mut program, "r.a68", src, &MemoryLoader::new(), &mut diags).unwrap();
    let texts = tokens.into_iter().map(|t| t.text).collect();
    let codes = diags.flush().into_iter().map(|d| d.code).collect();
    (texts, codes)
}

#[test]
fn test_refinements_substituted_with_forward_reference() {
    let (texts, codes) = run("BEGIN INT x; step one END.\nstep one: x := 1; step two.\nstep two: print(x).");
    assert!(codes.is_empty(), "{codes:?}");
    assert_eq!(
        texts.join(" "),
        "BEGIN INT x ; x := 1 ; print ( x ) END"
    );
}

#[test]
fn test_trailing_point_dropped() {
    let (texts, codes) = run("BEGIN SKIP END.");
    assert!(codes.is_empty());
    assert_eq!(texts, vec!["BEGIN", "SKIP", "END"]);
}

#[test]
fn test_point_inside_brackets_is_not_a_prelude() {
    let (texts, _) = run("BEGIN SKIP END");
    assert_eq!(texts.len(), 3);
}

#[test]
fn test_duplicate_definition_stops() {
    let (texts, codes) = run("BEGIN a END.\na: SKIP.\na: SKIP.");
    assert_eq!(codes, vec![ErrorCode::E0008]);
    assert_eq!(texts, vec!["BEGIN", "a", "END"]);
}

#[test]
fn test_unapplied_and_twice_applied() {
    let (_, codes) = run("BEGIN a; a END.\na: SKIP.\nb: SKIP.");
    assert_eq!(codes, vec![ErrorCode::E0010, ErrorCode::E0009]);
}

#[test]
fn test_malformed_definition() {
    let (_, codes) = run("BEGIN a END.\na: SKIP.\n+ 1.");
    assert_eq!(codes, vec![ErrorCode::E0012]);
}
