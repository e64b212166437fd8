//! viper-par - Syntactic analysis.
//!
//! Builds the typed AST from the token stream via recursive descent with
//! single-token lookahead and cheap index-based backtracking. Statement
//! builders are tried in a fixed order (if/else, function, return, for,
//! call, declaration, reassignment); a builder that does not match restores
//! the cursor exactly. Expressions use a binding-power loop.
//!
//! The parser aborts on the first hard error; there is no resynchronising
//! error recovery.

pub mod ast;
mod expr;
pub mod parser;

pub use ast::Node;
pub use parser::{parse, Parser};
