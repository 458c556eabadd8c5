use pretty_assertions::assert_eq;

use a68_diagnostic::{ErrorCode, Phase};
use a68_ir::Options;

use crate::common::{check_with, codes};

#[test]
fn test_transient_slice_rejected() {
    let (mut compiler, outcome) = check_with(Options::default(), "REF [] CHAR s = LOC FLEX [1:10] CHAR [2:5]");
    assert_eq!(outcome.failed, Some(Phase::Scope));
    let found = compiler.diags.flush();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, ErrorCode::E4003);
}

#[test]
fn test_local_name_escaping_its_range() {
    assert_eq!(codes("REF INT r; BEGIN INT i; r := i END"), vec![ErrorCode::E4002]);
    assert_eq!(codes("REF INT r; BEGIN r := HEAP INT END"), vec![]);
}

#[test]
fn test_local_routine_escaping_its_range() {
    assert_eq!(codes("PROC INT p; BEGIN INT k := 1; p := INT: k END"), vec![ErrorCode::E4001]);
}
