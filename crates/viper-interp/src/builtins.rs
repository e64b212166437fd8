//! Built-in functions and primitive method tables.
//!
//! Both tables are closed enumerations: unknown built-ins cannot exist
//! (they are pre-installed by name), and unknown primitive methods resolve
//! to `UndefinedNameError` in the interpreter.

use viper_util::symbol::{SYM_INPUT_EXPR, SYM_INPUT_NUM, SYM_PRINT, SYM_SUM};
use viper_util::Symbol;

use crate::value::Value;

/// The pre-installed built-in functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    /// `print(args...)` - writes the arguments space-separated, then a
    /// newline.
    Print,
    /// `sum(nums...)` - folds the arguments with `+`.
    Sum,
    /// `inputExpr(prompt?)` - reads a line as a String.
    InputExpr,
    /// `inputNum(prompt?)` - reads a line as a number.
    InputNum,
}

impl Builtin {
    pub fn from_symbol(name: Symbol) -> Option<Builtin> {
        if name == SYM_PRINT {
            Some(Builtin::Print)
        } else if name == SYM_SUM {
            Some(Builtin::Sum)
        } else if name == SYM_INPUT_EXPR {
            Some(Builtin::InputExpr)
        } else if name == SYM_INPUT_NUM {
            Some(Builtin::InputNum)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Sum => "sum",
            Builtin::InputExpr => "inputExpr",
            Builtin::InputNum => "inputNum",
        }
    }
}

/// Methods strings answer via dotted calls (`s.upper()`). Numbers and
/// booleans have none.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrMethod {
    Upper,
    Lower,
    Length,
}

impl StrMethod {
    pub fn from_name(name: &str) -> Option<StrMethod> {
        match name {
            "upper" => Some(StrMethod::Upper),
            "lower" => Some(StrMethod::Lower),
            "length" => Some(StrMethod::Length),
            _ => None,
        }
    }

    pub fn apply(self, s: &str) -> Value {
        match self {
            StrMethod::Upper => Value::Str(s.to_uppercase()),
            StrMethod::Lower => Value::Str(s.to_lowercase()),
            StrMethod::Length => Value::int(s.chars().count() as i64),
        }
    }
}
