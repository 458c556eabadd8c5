use pretty_assertions::assert_eq;

use a68_diagnostic::{ErrorCode, Phase};
use a68_ir::{Attribute, Options, Stropping};
use a68_lexer::MemoryLoader;

use crate::common::{all, check_loading, check_ok, check_with, codes, codes_with, named, tag_mode};

#[test]
fn test_quote_stropped_program() {
    let options = Options::default().with_stropping(Stropping::Quote);
    let (mut compiler, outcome) = check_with(options, "'BEGIN' 'INT' Max = 1; print (Max) 'END'");
    assert!(outcome.is_ok(), "{:?}", compiler.diags.flush());
    assert_eq!(tag_mode(&compiler.program, "Max"), "INT");
}

#[test]
fn test_pragmat_switches_stropping() {
    let compiler = check_ok("PR QUOTESTROPPING PR 'INT' k = 1; print (k)");
    assert_eq!(compiler.program.options.stropping, Stropping::Quote);
}

#[test]
fn test_unknown_pragmat_option_is_a_warning() {
    let (mut compiler, outcome) = check_with(Options::default(), "PR frobnicate PR SKIP");
    assert!(outcome.is_ok());
    let found = compiler.diags.flush();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, ErrorCode::E0016);
    assert!(found[0].is_warning());
}

#[test]
fn test_comments_vanish() {
    let compiler = check_ok("# a comment # INT k = 1; CO another CO print (k)");
    assert_eq!(named(&compiler.program, Attribute::Identifier, "k").len(), 1);
}

#[test]
fn test_unterminated_string_stops_in_lexer() {
    let (compiler, outcome) = check_with(Options::default(), "print (\"abc)");
    assert_eq!(outcome.failed, Some(Phase::Lexer));
    assert_eq!(compiler.top(), None);
}

#[test]
fn test_include_from_memory() {
    let loader = MemoryLoader::new().with_file("defs.a68", "INT answer = 42;");
    let (mut compiler, outcome) = check_loading(
        Options::default(),
        "BEGIN\nPR INCLUDE \"defs.a68\" PR\nprint (answer)\nEND",
        &loader,
    );
    assert!(outcome.is_ok(), "{:?}", compiler.diags.flush());
    assert_eq!(tag_mode(&compiler.program, "answer"), "INT");
}

#[test]
fn test_missing_include() {
    assert_eq!(
        codes("PR INCLUDE \"nowhere.a68\" PR SKIP"),
        vec![ErrorCode::E0006]
    );
}

#[test]
fn test_include_through_search_path() {
    let dir = tempfile::tempdir().unwrap();
    let lib = dir.path().join("lib");
    std::fs::create_dir(&lib).unwrap();
    std::fs::write(lib.join("square.a68"), "PROC square = (INT n) INT: n * n;").unwrap();
    let main = dir.path().join("main.a68");
    std::fs::write(&main, "PR INCLUDE \"square.a68\" PR\nprint (square (7))").unwrap();

    let mut compiler = a68c::Compiler::new(a68c::Config {
        include_paths: vec![lib],
        ..crate::common::config(Options::default())
    });
    let outcome = compiler.check_file(&main).unwrap();
    assert!(outcome.is_ok(), "{:?}", compiler.diags.flush());
    assert_eq!(all(&compiler.program, Attribute::Call).len(), 2);
    assert_eq!(named(&compiler.program, Attribute::DefiningIdentifier, "square").len(), 1);
}

#[test]
fn test_refinements_are_substituted() {
    let compiler = check_ok("BEGIN INT x; step one END.\nstep one: x := 1; step two.\nstep two: print (x).");
    assert_eq!(all(&compiler.program, Attribute::Assignation).len(), 1);
    assert_eq!(named(&compiler.program, Attribute::Identifier, "print").len(), 1);
}

#[test]
fn test_refinement_defined_twice() {
    let found = codes("BEGIN a END.\na: SKIP.\na: SKIP.");
    assert_eq!(found.first(), Some(&ErrorCode::E0008));
}

#[test]
fn test_underscore_tag_under_portcheck() {
    let options = Options {
        portcheck: true,
        ..Options::default()
    };
    assert_eq!(codes_with(options, "INT my_var = 1; SKIP"), vec![ErrorCode::E5002]);
    assert_eq!(codes("INT my_var = 1; SKIP"), vec![]);
}
