use pretty_assertions::assert_eq;

use super::*;
use crate::test_util::compiled;

/// Fold the first node with `attr` in `src`.
fn fold_first(attr: Attribute, src: &str) -> Option<Value> {
    let unit = compiled(0, src);
    let p = unit.all(attr)[0];
    fold(&unit.program, p)
}

#[test]
fn test_fold_integer_formula() {
    assert_eq!(fold_first(Attribute::Formula, "INT k = 1 + 2 * 3; SKIP"), Some(Value::Int(7)));
    assert_eq!(fold_first(Attribute::Formula, "INT k = 1 - 2 - 3; SKIP"), Some(Value::Int(-4)));
}

#[test]
fn test_fold_through_widening() {
    assert_eq!(fold_first(Attribute::Widening, "REAL x = 1 + 2; SKIP"), Some(Value::Real(3.0)));
}

#[test]
fn test_fold_monadic_and_comparison() {
    assert_eq!(fold_first(Attribute::MonadicFormula, "INT k = ABS -5; SKIP"), Some(Value::Int(5)));
    assert_eq!(fold_first(Attribute::Formula, "BOOL b = 2 < 3; SKIP"), Some(Value::Bool(true)));
}

#[test]
fn test_run_time_errors_do_not_fold() {
    assert_eq!(fold_first(Attribute::Formula, "INT k = 9223372036854775807 + 1; SKIP"), None);
    assert_eq!(fold_first(Attribute::Formula, "INT k = 1 % 0; SKIP"), None);
}

#[test]
fn test_identifiers_do_not_fold() {
    assert_eq!(fold_first(Attribute::Formula, "INT i = 2; INT k = i + 1; SKIP"), None);
}

#[test]
fn test_integer_division_rounds_like_the_run_time() {
    assert_eq!(dyadic("mod", Value::Int(-7), Value::Int(3)), Some(Value::Int(2)));
    assert_eq!(dyadic("over", Value::Int(7), Value::Int(2)), Some(Value::Int(3)));
    assert_eq!(dyadic("div", Value::Int(7), Value::Int(2)), Some(Value::Real(3.5)));
    assert_eq!(dyadic("div", Value::Int(7), Value::Int(0)), None);
}

#[test]
fn test_bits_operators() {
    assert_eq!(dyadic("shl", Value::Bits(1), Value::Int(3)), Some(Value::Bits(8)));
    assert_eq!(dyadic("shl", Value::Bits(8), Value::Int(-3)), Some(Value::Bits(1)));
    assert_eq!(dyadic("shl", Value::Bits(1), Value::Int(64)), None);
    assert_eq!(dyadic("elem", Value::Int(1), Value::Bits(1 << 63)), Some(Value::Bool(true)));
    assert_eq!(dyadic("elem", Value::Int(65), Value::Bits(1)), None);
}

#[test]
fn test_monadic_conversions() {
    assert_eq!(monadic("round", Value::Real(2.5)), Some(Value::Int(3)));
    assert_eq!(monadic("entier", Value::Real(-1.5)), Some(Value::Int(-2)));
    assert_eq!(monadic("repr", Value::Int(65)), Some(Value::Char('A')));
    assert_eq!(monadic("repr", Value::Int(300)), None);
    assert_eq!(monadic("entier", Value::Real(1e300)), None);
    assert_eq!(monadic("sign", Value::Real(-0.5)), Some(Value::Int(-1)));
}

#[test]
fn test_literals() {
    assert_eq!(Value::Int(42).literal(), "42");
    assert_eq!(Value::Int(-3).literal(), "(-3)");
    assert_eq!(Value::Int(i64::MIN).literal(), "(-9223372036854775807 - 1)");
    assert_eq!(Value::Real(2.5).literal(), "2.5");
    assert_eq!(Value::Real(-1.0).literal(), "(-1.0)");
    assert_eq!(Value::Bool(false).literal(), "A68_FALSE");
    assert_eq!(Value::Char('a').literal(), "'a'");
    assert_eq!(Value::Char('\'').literal(), "(CHAR_T) 39");
    assert_eq!(Value::Bits(255).literal(), "(UNSIGNED_T) 0xff");
    assert_eq!(Value::LongInt(1).literal(), "{INIT_MASK, {0, 0x1}}");
}
