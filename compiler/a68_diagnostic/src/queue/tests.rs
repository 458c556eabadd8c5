use super::*;
use crate::diagnostic::{error_at, syntax_error_at, warning_at};
use a68_ir::LineId;
use pretty_assertions::assert_eq;

fn span(line: u32, column: u32) -> Span {
    Span::new(LineId::new(line), column, 1)
}

#[test]
fn test_report_aborts_past_the_limit() {
    let mut queue = DiagnosticQueue::new();
    for i in 0..MAX_ERRORS {
        assert!(queue.report(error_at(ErrorCode::E3001, span(i as u32, 0), "x")).is_ok());
    }
    assert!(queue.limit_reached());
    let err = queue.report(error_at(ErrorCode::E3001, span(99, 0), "x"));
    assert_eq!(err, Err(PhaseAborted { errors: MAX_ERRORS + 1 }));
}

#[test]
fn test_warnings_never_abort() {
    let mut queue = DiagnosticQueue::new();
    for i in 0..20 {
        assert!(queue.report(warning_at(ErrorCode::E5001, span(i, 0), "ext")).is_ok());
    }
    assert_eq!(queue.warning_count(), 20);
    assert_eq!(queue.error_count(), 0);
}

#[test]
fn test_same_span_and_code_reported_once() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(error_at(ErrorCode::E3001, span(1, 2), "a")));
    assert!(!queue.add(error_at(ErrorCode::E3001, span(1, 2), "b")));
    assert!(queue.add(error_at(ErrorCode::E3003, span(1, 2), "c")));
    assert!(queue.add(error_at(ErrorCode::E3001, span(1, 2), "d").forced()));
    assert_eq!(queue.error_count(), 3);
}

#[test]
fn test_one_syntax_error_per_line() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(syntax_error_at(ErrorCode::E1003, span(4, 1), "first")));
    assert!(!queue.add(syntax_error_at(ErrorCode::E1004, span(4, 9), "second")));
    assert!(queue.add(syntax_error_at(ErrorCode::E1004, span(5, 9), "next line")));
}

#[test]
fn test_flush_sorts_by_position_and_keeps_counts() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(error_at(ErrorCode::E3001, span(3, 0), "c"));
    queue.add(error_at(ErrorCode::E3001, span(1, 5), "b"));
    queue.add(error_at(ErrorCode::E3001, span(1, 2), "a"));
    let messages: Vec<String> = queue.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["a", "b", "c"]);
    assert!(queue.is_empty());
    assert_eq!(queue.error_count(), 3);
}

#[test]
fn test_unlimited_never_aborts() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    for i in 0..50 {
        assert!(queue.report(error_at(ErrorCode::E3001, span(i, 0), "x")).is_ok());
    }
}
