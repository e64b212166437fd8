//! String interning for identifiers and lexemes.
//!
//! A [`Symbol`] is a 4-byte handle to an interned string. Interning gives
//! O(1) equality for the names the parser and interpreter compare
//! constantly (identifiers, type names, built-in names), and lets tokens
//! stay `Copy`.
//!
//! Interned strings live for the program lifetime; the total is bounded by
//! the source text, which is acceptable for an interpreter process.
//!
//! # Examples
//!
//! ```
//! use viper_util::Symbol;
//!
//! let a = Symbol::intern("x");
//! let b = Symbol::intern("x");
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "x");
//! ```

use std::fmt;
use std::sync::{OnceLock, RwLock};

use dashmap::DashMap;

/// Names pre-installed in every global scope. Interned first, in this
/// order, so the `SYM_*` constants below hold.
const KNOWN: &[&str] = &["num", "bool", "String", "print", "sum", "inputExpr", "inputNum"];

pub const SYM_NUM: Symbol = Symbol(0);
pub const SYM_BOOL: Symbol = Symbol(1);
pub const SYM_STRING: Symbol = Symbol(2);
pub const SYM_PRINT: Symbol = Symbol(3);
pub const SYM_SUM: Symbol = Symbol(4);
pub const SYM_INPUT_EXPR: Symbol = Symbol(5);
pub const SYM_INPUT_NUM: Symbol = Symbol(6);

/// A handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    /// Intern `string`, returning the existing handle if it was seen before.
    pub fn intern(string: &str) -> Symbol {
        let interner = interner();
        if let Some(sym) = interner.map.get(string) {
            return *sym;
        }

        let mut strings = interner.strings.write().expect("interner lock poisoned");
        // Re-check under the write lock; another thread may have won.
        if let Some(sym) = interner.map.get(string) {
            return *sym;
        }
        let leaked: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let sym = Symbol(strings.len() as u32);
        strings.push(leaked);
        interner.map.insert(leaked, sym);
        sym
    }

    /// The interned string.
    pub fn as_str(self) -> &'static str {
        let strings = interner().strings.read().expect("interner lock poisoned");
        strings[self.0 as usize]
    }

    /// Raw index, for debugging.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Interner {
    map: DashMap<&'static str, Symbol, ahash::RandomState>,
    strings: RwLock<Vec<&'static str>>,
}

fn interner() -> &'static Interner {
    static INTERNER: OnceLock<Interner> = OnceLock::new();
    INTERNER.get_or_init(|| {
        let interner = Interner {
            map: DashMap::with_hasher(ahash::RandomState::new()),
            strings: RwLock::new(Vec::new()),
        };
        let mut strings = interner.strings.write().expect("interner lock poisoned");
        for (i, &known) in KNOWN.iter().enumerate() {
            strings.push(known);
            interner.map.insert(known, Symbol(i as u32));
        }
        drop(strings);
        interner
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let a = Symbol::intern("hello");
        let b = Symbol::intern("hello");
        let c = Symbol::intern("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn round_trips_text() {
        let sym = Symbol::intern("factorial");
        assert_eq!(sym.as_str(), "factorial");
    }

    #[test]
    fn known_constants_match_their_text() {
        assert_eq!(SYM_NUM.as_str(), "num");
        assert_eq!(SYM_BOOL.as_str(), "bool");
        assert_eq!(SYM_STRING.as_str(), "String");
        assert_eq!(SYM_PRINT.as_str(), "print");
        assert_eq!(SYM_SUM.as_str(), "sum");
        assert_eq!(SYM_INPUT_EXPR.as_str(), "inputExpr");
        assert_eq!(SYM_INPUT_NUM.as_str(), "inputNum");
    }

    #[test]
    fn interning_a_known_name_returns_its_constant() {
        assert_eq!(Symbol::intern("print"), SYM_PRINT);
    }
}
