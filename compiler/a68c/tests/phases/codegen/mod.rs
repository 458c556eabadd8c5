//! C generation through the driver.

use pretty_assertions::assert_eq;

use a68_codegen::Construct;
use a68_ir::{Options, Status};
use a68_lexer::MemoryLoader;
use a68c::{tree_listing, Compiler};

use crate::common::{compile_at, config};

#[test]
fn test_level_zero_compiles_nothing() {
    let (_, outcome) = compile_at(0, "INT k = 1; SKIP");
    let result = outcome.codegen.unwrap();
    assert!(result.is_empty());
    assert_eq!(result.code, "");
}

#[test]
fn test_units_are_marked_and_listed() {
    let (compiler, outcome) = compile_at(2, "INT i = 7; INT k = i + 2; print (k)");
    let result = outcome.codegen.unwrap();
    assert!(!result.is_empty());
    for unit in &result.units {
        let node = &compiler.program.tree[unit.node];
        assert!(node.status.contains(Status::COMPILED));
        assert!(result.code.contains(&format!("CODE ({})", unit.name)));
    }
    let listing = tree_listing(&compiler.program);
    assert!(listing.contains(&format!("[{}]", result.units[0].name)), "{listing}");
}

#[test]
fn test_clauses_need_the_highest_level() {
    let src = "BOOL b = TRUE; INT k = IF b THEN 1 ELSE 2 FI; print (k)";
    let constructs = |level| -> Vec<Construct> {
        compile_at(level, src).1.codegen.unwrap().units.iter().map(|u| u.construct).collect()
    };
    assert!(!constructs(3).contains(&Construct::Conditional));
    assert!(constructs(4).contains(&Construct::Conditional));
}

#[test]
fn test_generated_names_are_unique() {
    let (_, outcome) = compile_at(4, "INT a = 1; INT b = 2; INT c = a + b; INT d = a * b; print ((c, d))");
    let mut names: Vec<String> = outcome.codegen.unwrap().units.into_iter().map(|u| u.name).collect();
    let total = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), total);
}

#[test]
fn test_errors_leave_no_code() {
    let mut compiler = Compiler::new(config(Options::default().with_optimise(3)));
    let outcome = compiler.compile("test.a68", "INT k = TRUE; SKIP", &MemoryLoader::new());
    assert!(!outcome.is_ok());
    assert_eq!(outcome.codegen, None);
}
