//! Runtime values and operator semantics.
//!
//! A [`Value`] is one of the three primitives (number, string, boolean).
//! Numbers keep the integer/fractional split of their literal; arithmetic
//! promotes to float when either side is fractional, and division always
//! divides truly. Every operation yields a fresh value.
//!
//! Operator application reports failures as [`OpError`]; the interpreter
//! turns those into diagnostics carrying the source span of the expression.

use std::fmt;

use viper_par::ast::{BinOp, CompOpKind};

/// An integer-or-float number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Num::Int(i) => i == 0,
            Num::Float(f) => f == 0.0,
        }
    }
}

/// The type tag carried by every value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    Num,
    Bool,
    Str,
    Func,
}

impl DataType {
    /// The language-level type name, as written in declarations.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Num => "num",
            DataType::Bool => "bool",
            DataType::Str => "String",
            DataType::Func => "func",
        }
    }
}

/// A runtime value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Num(Num),
    Str(String),
    Bool(bool),
}

impl Value {
    pub fn int(i: i64) -> Value {
        Value::Num(Num::Int(i))
    }

    pub fn float(f: f64) -> Value {
        Value::Num(Num::Float(f))
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Num(_) => DataType::Num,
            Value::Str(_) => DataType::Str,
            Value::Bool(_) => DataType::Bool,
        }
    }

    /// Truthiness: `True`, non-zero numbers, and non-empty strings.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Num(n) => !n.is_zero(),
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(Num::Int(i)) => write!(f, "{i}"),
            Value::Num(Num::Float(x)) => {
                if x.is_finite() && x.fract() == 0.0 {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            Value::Str(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
        }
    }
}

/// Why an operator application failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpError {
    /// The operand types do not support this operator.
    Unsupported,
    /// Division with a zero divisor.
    DivisionByZero,
}

fn add(a: Num, b: Num) -> Num {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => x
            .checked_add(y)
            .map(Num::Int)
            .unwrap_or(Num::Float(x as f64 + y as f64)),
        _ => Num::Float(a.as_f64() + b.as_f64()),
    }
}

fn sub(a: Num, b: Num) -> Num {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => x
            .checked_sub(y)
            .map(Num::Int)
            .unwrap_or(Num::Float(x as f64 - y as f64)),
        _ => Num::Float(a.as_f64() - b.as_f64()),
    }
}

fn mul(a: Num, b: Num) -> Num {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => x
            .checked_mul(y)
            .map(Num::Int)
            .unwrap_or(Num::Float(x as f64 * y as f64)),
        _ => Num::Float(a.as_f64() * b.as_f64()),
    }
}

fn pow(a: Num, b: Num) -> Num {
    if let (Num::Int(x), Num::Int(y)) = (a, b) {
        if (0..=u32::MAX as i64).contains(&y) {
            if let Some(result) = x.checked_pow(y as u32) {
                return Num::Int(result);
            }
        }
    }
    Num::Float(a.as_f64().powf(b.as_f64()))
}

/// Apply an arithmetic binary operator. `and`/`or` never reach here: the
/// interpreter evaluates them by truthiness over arbitrary values.
pub fn apply_bin(op: BinOp, left: &Value, right: &Value) -> Result<Value, OpError> {
    match (op, left, right) {
        (BinOp::Add, Value::Num(a), Value::Num(b)) => Ok(Value::Num(add(*a, *b))),
        (BinOp::Sub, Value::Num(a), Value::Num(b)) => Ok(Value::Num(sub(*a, *b))),
        (BinOp::Mul, Value::Num(a), Value::Num(b)) => Ok(Value::Num(mul(*a, *b))),
        (BinOp::Div, Value::Num(a), Value::Num(b)) => {
            if b.is_zero() {
                Err(OpError::DivisionByZero)
            } else {
                Ok(Value::float(a.as_f64() / b.as_f64()))
            }
        }
        (BinOp::Pow, Value::Num(a), Value::Num(b)) => Ok(Value::Num(pow(*a, *b))),

        (BinOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
        (BinOp::Mul, Value::Str(s), Value::Num(Num::Int(n)))
        | (BinOp::Mul, Value::Num(Num::Int(n)), Value::Str(s)) => {
            Ok(Value::Str(s.repeat((*n).max(0) as usize)))
        }

        _ => Err(OpError::Unsupported),
    }
}

/// Apply a comparison operator. Numbers compare numerically, strings
/// lexicographically, booleans only for equality; anything cross-type is
/// unsupported.
pub fn apply_comp(op: CompOpKind, left: &Value, right: &Value) -> Result<bool, OpError> {
    match (left, right) {
        (Value::Num(a), Value::Num(b)) => {
            let ordered = |lt: bool, eq: bool, gt: bool| -> bool {
                match (a, b) {
                    (Num::Int(x), Num::Int(y)) => pick(x.cmp(y), lt, eq, gt),
                    _ => {
                        let (x, y) = (a.as_f64(), b.as_f64());
                        (x < y && lt) || (x == y && eq) || (x > y && gt)
                    }
                }
            };
            Ok(match op {
                CompOpKind::Less => ordered(true, false, false),
                CompOpKind::Greater => ordered(false, false, true),
                CompOpKind::LessEqual => ordered(true, true, false),
                CompOpKind::GreaterEqual => ordered(false, true, true),
                CompOpKind::EqEqual => ordered(false, true, false),
                CompOpKind::NotEqual => ordered(true, false, true),
            })
        }
        (Value::Str(a), Value::Str(b)) => Ok(match op {
            CompOpKind::Less => a < b,
            CompOpKind::Greater => a > b,
            CompOpKind::LessEqual => a <= b,
            CompOpKind::GreaterEqual => a >= b,
            CompOpKind::EqEqual => a == b,
            CompOpKind::NotEqual => a != b,
        }),
        (Value::Bool(a), Value::Bool(b)) => match op {
            CompOpKind::EqEqual => Ok(a == b),
            CompOpKind::NotEqual => Ok(a != b),
            _ => Err(OpError::Unsupported),
        },
        _ => Err(OpError::Unsupported),
    }
}

fn pick(ord: std::cmp::Ordering, lt: bool, eq: bool, gt: bool) -> bool {
    match ord {
        std::cmp::Ordering::Less => lt,
        std::cmp::Ordering::Equal => eq,
        std::cmp::Ordering::Greater => gt,
    }
}

/// Negate a number.
pub fn apply_neg(value: &Value) -> Result<Value, OpError> {
    match value {
        Value::Num(Num::Int(i)) => Ok(Value::int(-i)),
        Value::Num(Num::Float(f)) => Ok(Value::float(-f)),
        _ => Err(OpError::Unsupported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_stays_integral() {
        let v = apply_bin(BinOp::Add, &Value::int(1), &Value::int(2)).unwrap();
        assert_eq!(v, Value::int(3));
        let v = apply_bin(BinOp::Mul, &Value::int(4), &Value::int(5)).unwrap();
        assert_eq!(v, Value::int(20));
        let v = apply_bin(BinOp::Pow, &Value::int(2), &Value::int(10)).unwrap();
        assert_eq!(v, Value::int(1024));
    }

    #[test]
    fn floats_are_contagious() {
        let v = apply_bin(BinOp::Add, &Value::int(1), &Value::float(0.5)).unwrap();
        assert_eq!(v, Value::float(1.5));
    }

    #[test]
    fn division_is_true_division() {
        let v = apply_bin(BinOp::Div, &Value::int(10), &Value::int(4)).unwrap();
        assert_eq!(v, Value::float(2.5));
        let v = apply_bin(BinOp::Div, &Value::int(10), &Value::int(2)).unwrap();
        assert_eq!(v, Value::float(5.0));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let err = apply_bin(BinOp::Div, &Value::int(1), &Value::int(0)).unwrap_err();
        assert_eq!(err, OpError::DivisionByZero);
        let err = apply_bin(BinOp::Div, &Value::float(1.0), &Value::float(0.0)).unwrap_err();
        assert_eq!(err, OpError::DivisionByZero);
    }

    #[test]
    fn string_concatenation_and_repetition() {
        let v = apply_bin(
            BinOp::Add,
            &Value::Str("ab".into()),
            &Value::Str("cd".into()),
        )
        .unwrap();
        assert_eq!(v, Value::Str("abcd".into()));

        let v = apply_bin(BinOp::Mul, &Value::Str("ab".into()), &Value::int(3)).unwrap();
        assert_eq!(v, Value::Str("ababab".into()));
        let v = apply_bin(BinOp::Mul, &Value::int(2), &Value::Str("xy".into())).unwrap();
        assert_eq!(v, Value::Str("xyxy".into()));
    }

    #[test]
    fn mixed_arithmetic_is_unsupported() {
        let err = apply_bin(BinOp::Add, &Value::int(1), &Value::Str("x".into())).unwrap_err();
        assert_eq!(err, OpError::Unsupported);
        let err = apply_bin(BinOp::Sub, &Value::Bool(true), &Value::int(1)).unwrap_err();
        assert_eq!(err, OpError::Unsupported);
    }

    #[test]
    fn numeric_comparison_spans_int_and_float() {
        assert!(apply_comp(CompOpKind::Less, &Value::int(1), &Value::float(1.5)).unwrap());
        assert!(apply_comp(CompOpKind::EqEqual, &Value::int(7), &Value::float(7.0)).unwrap());
        assert!(apply_comp(CompOpKind::GreaterEqual, &Value::int(3), &Value::int(3)).unwrap());
    }

    #[test]
    fn string_comparison_is_lexicographic() {
        assert!(apply_comp(
            CompOpKind::Less,
            &Value::Str("abc".into()),
            &Value::Str("abd".into())
        )
        .unwrap());
    }

    #[test]
    fn booleans_only_compare_for_equality() {
        assert!(apply_comp(CompOpKind::EqEqual, &Value::Bool(true), &Value::Bool(true)).unwrap());
        let err =
            apply_comp(CompOpKind::Less, &Value::Bool(false), &Value::Bool(true)).unwrap_err();
        assert_eq!(err, OpError::Unsupported);
    }

    #[test]
    fn cross_type_comparison_is_unsupported() {
        let err = apply_comp(CompOpKind::EqEqual, &Value::int(1), &Value::Str("1".into()))
            .unwrap_err();
        assert_eq!(err, OpError::Unsupported);
    }

    #[test]
    fn truthiness() {
        assert!(Value::int(1).is_truthy());
        assert!(!Value::int(0).is_truthy());
        assert!(Value::float(0.5).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(Value::Str("x".into()).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
    }

    #[test]
    fn display_matches_the_language() {
        assert_eq!(Value::int(7).to_string(), "7");
        assert_eq!(Value::float(7.0).to_string(), "7.0");
        assert_eq!(Value::float(2.5).to_string(), "2.5");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Str("hi".into()).to_string(), "hi");
    }

    #[test]
    fn negation() {
        assert_eq!(apply_neg(&Value::int(3)).unwrap(), Value::int(-3));
        assert_eq!(apply_neg(&Value::Str("x".into())).unwrap_err(), OpError::Unsupported);
    }

    #[test]
    fn integer_overflow_falls_back_to_float() {
        let v = apply_bin(BinOp::Add, &Value::int(i64::MAX), &Value::int(1)).unwrap();
        assert_eq!(v, Value::float(i64::MAX as f64 + 1.0));
    }
}
