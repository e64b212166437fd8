//! viper-interp - Evaluation.
//!
//! Walks the AST produced by `viper-par`, maintaining a lexically scoped
//! symbol table, and produces values and I/O effects. The crate is split
//! into:
//!
//! - [`value`] - the primitive value system and operator semantics
//! - [`scope`] - the scope tree (bindings, parent chain, pre-installed
//!   globals)
//! - [`builtins`] - the closed built-in function and string method tables
//! - [`interp`] - the tree walker itself
//!
//! Every execution starts from a fresh global scope; nothing leaks between
//! REPL blocks or script runs.

pub mod builtins;
pub mod interp;
pub mod scope;
pub mod value;

pub use interp::Interpreter;
pub use scope::{ScopeTree, SymbolEntry};
pub use value::{DataType, Num, Value};
