//! viper-lex - Lexical analysis.
//!
//! Transforms Viper source text into a stream of [`Token`]s terminated by
//! an EOF token, or the first [`Diagnostic`](viper_util::Diagnostic) when
//! the text contains an invalid literal or character.
//!
//! The lexer is direct-coded: a [`Cursor`] walks the characters while
//! [`Lexer::lex`] dispatches on the current character class (whitespace,
//! digit, quote, letter, operator glyph, punctuator) and hands each run to
//! a focused helper.

pub mod cursor;
pub mod lexer;
pub mod token;

#[cfg(test)]
mod edge_cases;

pub use cursor::Cursor;
pub use lexer::{tokenize, Lexer};
pub use token::{Token, TokenFamily, TokenKind};
