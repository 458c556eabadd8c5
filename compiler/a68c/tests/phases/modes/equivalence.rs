use pretty_assertions::assert_eq;
use proptest::prelude::*;

use a68_ir::Attribute;

use crate::common::{all, check_ok, tag_mode, tag_moid};

const FIELD_MODES: &[&str] = &["INT", "REAL", "BOOL", "CHAR", "STRING", "REF INT"];

/// A structure with the given fields and a link to itself.
fn linked(indicant: &str, fields: &[usize]) -> String {
    let mut text = format!("MODE {indicant} = STRUCT (");
    for (i, &mode) in fields.iter().enumerate() {
        text.push_str(&format!("{} f{i}, ", FIELD_MODES[mode]));
    }
    text.push_str(&format!("REF {indicant} next);"));
    text
}

#[test]
fn test_mutually_recursive_modes_collapse() {
    let compiler = check_ok(
        "MODE A = STRUCT (INT v, REF B link); MODE B = STRUCT (INT v, REF A link);\n\
         A a; B b; SKIP",
    );
    assert_eq!(tag_moid(&compiler.program, "a"), tag_moid(&compiler.program, "b"));
}

#[test]
fn test_field_names_keep_modes_apart() {
    let compiler = check_ok("MODE A = STRUCT (INT x); MODE B = STRUCT (INT y); A a; B b; SKIP");
    assert!(tag_moid(&compiler.program, "a") != tag_moid(&compiler.program, "b"));
}

#[test]
fn test_mode_declarations_are_kept_in_the_tree() {
    let compiler = check_ok("MODE P = STRUCT (REAL x, REAL y); P origin = (0, 0); SKIP");
    assert_eq!(all(&compiler.program, Attribute::ModeDeclaration).len(), 1);
    assert_eq!(tag_mode(&compiler.program, "origin"), "STRUCT (REAL x, REAL y)");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Two indicants spelling out the same cyclic structure are one mode.
    #[test]
    fn test_structurally_equal_modes_are_one(fields in prop::collection::vec(0..FIELD_MODES.len(), 1..5)) {
        let src = format!("{}\n{}\nA a; B b; SKIP", linked("A", &fields), linked("B", &fields));
        let compiler = check_ok(&src);
        prop_assert_eq!(tag_moid(&compiler.program, "a"), tag_moid(&compiler.program, "b"));
    }
}
