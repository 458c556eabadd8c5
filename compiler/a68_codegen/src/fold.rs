//! The constant folder.
//!
//! A unit built from denotations, standard constants and standard
//! operators has a value known now. The folder computes it with the same
//! semantics as the run-time routines, so the generator can emit the value
//! instead of code. Anything that would raise a run-time error (overflow,
//! division by zero, a result out of range) does not fold; the run time
//! reports it when the unit is reached.
//!
//! LONG REAL values are folded in double precision and only denotations
//! and widenings produce them, so no precision is lost on the way.

#![allow(clippy::cast_precision_loss)]

use a68_ir::{Attribute, MoidId, NodeId, Program};
use a68_stack::ensure_sufficient_stack;

use crate::{is_unit, WRAPPERS};

/// Largest INT, matching the run time's `INT_T`.
pub const MAX_INT: i64 = i64::MAX;
/// Decimal digits of [`MAX_INT`].
pub const INT_WIDTH: i64 = 19;
pub const BITS_WIDTH: i64 = 64;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
    Bool(bool),
    Char(char),
    Bits(u64),
    LongInt(i128),
    LongReal(f64),
    Complex(f64, f64),
}

impl Value {
    /// A value the C compiler reads as a plain expression.
    pub fn is_primitive(self) -> bool {
        !matches!(self, Value::LongInt(_) | Value::LongReal(_) | Value::Complex(..))
    }

    /// C expression for a primitive value, or the static initialiser of a
    /// long or complex one.
    pub fn literal(self) -> String {
        match self {
            Value::Int(i64::MIN) => "(-9223372036854775807 - 1)".to_owned(),
            Value::Int(v) if v < 0 => format!("({v})"),
            Value::Int(v) => v.to_string(),
            Value::Real(v) => real_literal(v, ""),
            Value::Bool(true) => "A68_TRUE".to_owned(),
            Value::Bool(false) => "A68_FALSE".to_owned(),
            Value::Char(c) if c == ' ' || (c.is_ascii_graphic() && c != '\'' && c != '\\') => format!("'{c}'"),
            Value::Char(c) => format!("(CHAR_T) {}", u32::from(c)),
            Value::Bits(v) => format!("(UNSIGNED_T) 0x{v:x}"),
            Value::LongInt(v) => {
                let high = (v >> 64) as i64;
                let low = v as u64;
                format!("{{INIT_MASK, {{{high}, 0x{low:x}}}}}")
            }
            Value::LongReal(v) => format!("{{INIT_MASK, {}}}", real_literal(v, "L")),
            Value::Complex(re, im) => format!(
                "{{{{INIT_MASK, {}}}, {{INIT_MASK, {}}}}}",
                real_literal(re, ""),
                real_literal(im, "")
            ),
        }
    }
}

fn real_literal(v: f64, suffix: &str) -> String {
    let text = format!("{v:?}{suffix}");
    if v.is_sign_negative() {
        format!("({text})")
    } else {
        text
    }
}

/// Value of the unit at `p`, when it has one now.
pub fn fold(program: &Program, p: NodeId) -> Option<Value> {
    ensure_sufficient_stack(|| fold_phrase(program, p)).filter(|&v| finite(v))
}

/// Whether `p` folds. Units of modes the folder does not know never do.
pub fn is_constant(program: &Program, p: NodeId) -> bool {
    fold(program, p).is_some()
}

/// Whether the formula at `p` has constant `operands` yet no value of its
/// own: the operation itself fails and must be left to the run time.
pub(crate) fn faults(program: &Program, p: NodeId, operands: &[NodeId]) -> bool {
    operands.iter().all(|&q| fold(program, q).is_some()) && fold(program, p).is_none()
}

fn fold_phrase(program: &Program, p: NodeId) -> Option<Value> {
    let tree = &program.tree;
    let attr = tree.attribute(p);
    if WRAPPERS.contains(&attr) {
        return fold(program, tree.sub(p)?);
    }
    match attr {
        Attribute::Denotation => denotation(program, p),
        Attribute::Widening => widen(fold(program, tree.sub(p)?)?, program.moid_of(p)?),
        Attribute::Formula => {
            let children = tree.child_ids(p);
            let [lhs, op, rhs] = children.as_slice() else {
                return None;
            };
            let a = fold(program, *lhs)?;
            let b = fold(program, *rhs)?;
            dyadic(slug(program, *op)?, a, b)
        }
        Attribute::MonadicFormula => {
            let children = tree.child_ids(p);
            let [op, operand] = children.as_slice() else {
                return None;
            };
            let a = fold(program, *operand)?;
            monadic(slug(program, *op)?, a)
        }
        Attribute::Cast => fold(program, tree.last_sibling(tree.sub(p)?)),
        Attribute::ClosedClause => fold(program, single_unit(program, p)?),
        Attribute::Identifier => standard_constant(program, p),
        _ => None,
    }
}

/// The only unit of a closed clause without declarations.
pub(crate) fn single_unit(program: &Program, closed: NodeId) -> Option<NodeId> {
    let tree = &program.tree;
    let serial = tree.find_child(closed, Attribute::SerialClause)?;
    let children = tree.child_ids(serial);
    match children.as_slice() {
        [u] if is_unit(tree, *u) => Some(*u),
        _ => None,
    }
}

/// Operator slug of a standard operator: `add` for `genie_add_int_int`.
fn slug(program: &Program, op: NodeId) -> Option<&'static str> {
    let tag = program.tree[op].tag?;
    let runtime = program.tables.tag(tag).runtime?;
    runtime.strip_prefix("genie_")?.split('_').next()
}

fn finite(v: Value) -> bool {
    match v {
        Value::Real(x) | Value::LongReal(x) => x.is_finite(),
        Value::Complex(re, im) => re.is_finite() && im.is_finite(),
        _ => true,
    }
}

fn denotation(program: &Program, p: NodeId) -> Option<Value> {
    let tree = &program.tree;
    let m = program.moid_of(p)?;
    let base = tree
        .children(p)
        .find(|&c| !matches!(tree.attribute(c), Attribute::Longety | Attribute::Shortety))?;
    let text = program.text(base);
    match (tree.attribute(base), m) {
        (Attribute::IntDenotation, MoidId::INT) => text.parse().ok().map(Value::Int),
        (Attribute::IntDenotation, MoidId::LONG_INT) => text.parse().ok().map(Value::LongInt),
        (Attribute::RealDenotation, MoidId::REAL) => text.parse().ok().map(Value::Real),
        (Attribute::RealDenotation, MoidId::LONG_REAL) => text.parse().ok().map(Value::LongReal),
        (Attribute::BitsDenotation, MoidId::BITS) => {
            let (radix, digits) = text.split_once('r')?;
            u64::from_str_radix(digits, radix.parse().ok()?).ok().map(Value::Bits)
        }
        (Attribute::RowCharDenotation, MoidId::CHAR) => text.chars().next().map(Value::Char),
        (Attribute::TrueSymbol, _) => Some(Value::Bool(true)),
        (Attribute::FalseSymbol, _) => Some(Value::Bool(false)),
        _ => None,
    }
}

fn standard_constant(program: &Program, p: NodeId) -> Option<Value> {
    let tag = program.tree[p].tag?;
    match program.tables.tag(tag).runtime? {
        "genie_pi" => Some(Value::Real(std::f64::consts::PI)),
        "genie_maxint" => Some(Value::Int(MAX_INT)),
        "genie_maxreal" => Some(Value::Real(f64::MAX)),
        "genie_smallreal" => Some(Value::Real(f64::EPSILON)),
        "genie_intwidth" => Some(Value::Int(INT_WIDTH)),
        "genie_bitswidth" => Some(Value::Int(BITS_WIDTH)),
        "genie_blank" => Some(Value::Char(' ')),
        _ => None,
    }
}

fn widen(v: Value, to: MoidId) -> Option<Value> {
    match (v, to) {
        (Value::Int(i), MoidId::REAL) => Some(Value::Real(i as f64)),
        (Value::Int(i), MoidId::LONG_INT) => Some(Value::LongInt(i128::from(i))),
        (Value::LongInt(i), MoidId::LONG_REAL) => Some(Value::LongReal(i as f64)),
        (Value::Real(x), MoidId::LONG_REAL) => Some(Value::LongReal(x)),
        (Value::Real(x), MoidId::COMPLEX) => Some(Value::Complex(x, 0.0)),
        _ => None,
    }
}

fn compare<T: PartialOrd>(slug: &str, a: T, b: T) -> Option<Value> {
    let result = match slug {
        "eq" => a == b,
        "ne" => a != b,
        "lt" => a < b,
        "le" => a <= b,
        "gt" => a > b,
        "ge" => a >= b,
        _ => return None,
    };
    Some(Value::Bool(result))
}

fn dyadic(slug: &str, a: Value, b: Value) -> Option<Value> {
    use Value::{Bits, Bool, Char, Complex, Int, LongInt, LongReal, Real};
    match (a, b) {
        (Int(x), Int(y)) => match slug {
            "add" => x.checked_add(y).map(Int),
            "sub" => x.checked_sub(y).map(Int),
            "mul" => x.checked_mul(y).map(Int),
            "over" => x.checked_div(y).map(Int),
            "mod" => x.checked_rem_euclid(y).map(Int),
            "div" if y != 0 => Some(Real(x as f64 / y as f64)),
            "pow" => u32::try_from(y).ok().and_then(|e| x.checked_pow(e)).map(Int),
            "i" => Some(Complex(x as f64, y as f64)),
            _ => compare(slug, x, y),
        },
        (LongInt(x), LongInt(y)) => match slug {
            "add" => x.checked_add(y).map(LongInt),
            "sub" => x.checked_sub(y).map(LongInt),
            "mul" => x.checked_mul(y).map(LongInt),
            "over" => x.checked_div(y).map(LongInt),
            "mod" => x.checked_rem_euclid(y).map(LongInt),
            _ => compare(slug, x, y),
        },
        (LongInt(x), Int(y)) if slug == "pow" => u32::try_from(y).ok().and_then(|e| x.checked_pow(e)).map(LongInt),
        (Real(x), Real(y)) => match slug {
            "add" => Some(Real(x + y)),
            "sub" => Some(Real(x - y)),
            "mul" => Some(Real(x * y)),
            "div" if y != 0.0 => Some(Real(x / y)),
            "pow" if x > 0.0 => Some(Real(x.powf(y))),
            "i" => Some(Complex(x, y)),
            _ => compare(slug, x, y),
        },
        (Real(x), Int(y)) if slug == "pow" => i32::try_from(y).ok().map(|e| Real(x.powi(e))),
        (LongReal(x), LongReal(y)) => match slug {
            "add" => Some(LongReal(x + y)),
            "sub" => Some(LongReal(x - y)),
            "mul" => Some(LongReal(x * y)),
            "div" if y != 0.0 => Some(LongReal(x / y)),
            _ => compare(slug, x, y),
        },
        (Complex(a, b), Complex(c, d)) => match slug {
            "add" => Some(Complex(a + c, b + d)),
            "sub" => Some(Complex(a - c, b - d)),
            "mul" => Some(Complex(a * c - b * d, a * d + b * c)),
            "div" => {
                let denominator = c * c + d * d;
                (denominator != 0.0)
                    .then(|| Complex((a * c + b * d) / denominator, (b * c - a * d) / denominator))
            }
            "eq" => Some(Bool(a == c && b == d)),
            "ne" => Some(Bool(a != c || b != d)),
            _ => None,
        },
        (Bool(x), Bool(y)) => match slug {
            "and" => Some(Bool(x && y)),
            "or" => Some(Bool(x || y)),
            "eq" => Some(Bool(x == y)),
            "ne" => Some(Bool(x != y)),
            _ => None,
        },
        (Bits(x), Bits(y)) => match slug {
            "and" => Some(Bits(x & y)),
            "or" => Some(Bits(x | y)),
            "eq" => Some(Bool(x == y)),
            "ne" => Some(Bool(x != y)),
            _ => None,
        },
        (Bits(x), Int(y)) => {
            let shift = u32::try_from(y.unsigned_abs()).ok().filter(|&s| s < 64)?;
            match (slug, y >= 0) {
                ("shl", true) | ("shr", false) => Some(Bits(x << shift)),
                ("shl", false) | ("shr", true) => Some(Bits(x >> shift)),
                _ => None,
            }
        }
        (Int(k), Bits(x)) if slug == "elem" && (1..=BITS_WIDTH).contains(&k) => {
            Some(Bool((x >> (BITS_WIDTH - k)) & 1 == 1))
        }
        (Char(x), Char(y)) => compare(slug, x, y),
        _ => None,
    }
}

fn monadic(slug: &str, a: Value) -> Option<Value> {
    use Value::{Bits, Bool, Char, Complex, Int, LongInt, LongReal, Real};
    match (slug, a) {
        ("add", v) => Some(v),
        ("sub", Int(x)) => x.checked_neg().map(Int),
        ("sub", LongInt(x)) => x.checked_neg().map(LongInt),
        ("sub", Real(x)) => Some(Real(-x)),
        ("sub", LongReal(x)) => Some(LongReal(-x)),
        ("sub", Complex(re, im)) => Some(Complex(-re, -im)),
        ("abs", Int(x)) => x.checked_abs().map(Int),
        ("abs", LongInt(x)) => x.checked_abs().map(LongInt),
        ("abs", Real(x)) => Some(Real(x.abs())),
        ("abs", LongReal(x)) => Some(LongReal(x.abs())),
        ("abs", Complex(re, im)) => Some(Real(re.hypot(im))),
        ("abs", Bool(b)) => Some(Int(i64::from(b))),
        ("abs", Bits(x)) => i64::try_from(x).ok().map(Int),
        ("abs", Char(c)) => Some(Int(i64::from(u32::from(c)))),
        ("sign", Int(x)) => Some(Int(x.signum())),
        ("sign", LongInt(x)) => Some(Int(x.signum() as i64)),
        ("sign", Real(x) | LongReal(x)) => Some(Int(real_sign(x))),
        ("odd", Int(x)) => Some(Bool(x % 2 != 0)),
        ("odd", LongInt(x)) => Some(Bool(x % 2 != 0)),
        ("not", Bool(b)) => Some(Bool(!b)),
        ("not", Bits(x)) => Some(Bits(!x)),
        ("repr", Int(x)) => u8::try_from(x).ok().map(|b| Char(char::from(b))),
        ("bin", Int(x)) => u64::try_from(x).ok().map(Bits),
        ("entier", Real(x)) => to_int(x.floor()),
        ("round", Real(x)) => to_int((x + 0.5).floor()),
        ("leng", Int(x)) => Some(LongInt(i128::from(x))),
        ("leng", Real(x)) => Some(LongReal(x)),
        ("shorten", LongInt(x)) => i64::try_from(x).ok().map(Int),
        ("shorten", LongReal(x)) => (x.abs() <= f64::MAX).then_some(Real(x)),
        ("re", Complex(re, _)) => Some(Real(re)),
        ("im", Complex(_, im)) => Some(Real(im)),
        _ => None,
    }
}

fn real_sign(x: f64) -> i64 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// A whole REAL as INT, when it fits.
fn to_int(x: f64) -> Option<Value> {
    let fits = x.is_finite() && x >= i64::MIN as f64 && x < i64::MAX as f64;
    fits.then_some(Value::Int(x as i64))
}

#[cfg(test)]
mod tests;
