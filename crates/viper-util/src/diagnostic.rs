//! Diagnostics - the error values produced by every pipeline stage.
//!
//! Errors in Viper are values, not unwinds: the lexer, parser, and
//! interpreter each return `Result<T, Diagnostic>` and the pipeline stops at
//! the first `Err`. A diagnostic renders as a one-line header followed by
//! the offending source line with a caret run underneath:
//!
//! ```text
//! UndefinedNameError: Name 'y' is undefined | column 7 line 1
//!
//! print(y)
//!       ^
//! ```

use std::fmt;

use thiserror::Error;

use crate::pos::Span;

/// The named diagnostic kinds. The display string is the user-visible error
/// name in the rendered header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    #[error("InvalidLiteralError")]
    InvalidLiteral,
    #[error("InvalidCharError")]
    InvalidChar,
    #[error("MissingParanError")]
    MissingParen,
    #[error("MissingBraceError")]
    MissingBrace,
    #[error("MissingExprError")]
    MissingExpr,
    #[error("UnexpectedTokenError")]
    UnexpectedToken,
    #[error("InvalidSyntaxError")]
    InvalidSyntax,
    #[error("InvalidAssignmentError")]
    InvalidAssignment,
    #[error("InvalidTypeError")]
    InvalidType,
    #[error("UndefinedNameError")]
    UndefinedName,
    #[error("RuntimeError")]
    Runtime,
}

/// A rendered-on-demand error value with its source excerpt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Which named error this is.
    pub kind: DiagnosticKind,
    /// Human-readable detail, e.g. the offending name or type pair.
    pub details: String,
    /// The source line the span starts on, without its newline.
    pub line: String,
    /// Where in the source the error sits.
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, details: impl Into<String>, line: impl Into<String>, span: Span) -> Self {
        Self { kind, details: details.into(), line: line.into(), span }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let begin = self.span.begin;
        write!(
            f,
            "{}: {} | column {} line {}\n\n{}",
            self.kind,
            self.details,
            begin.display_column(),
            begin.display_line(),
            self.line
        )?;

        // A multi-line excerpt gets no caret; the header locates it.
        if self.line.contains('\n') {
            return Ok(());
        }

        let carets = if self.span.is_point() {
            1
        } else {
            (self.span.end.column + 1).saturating_sub(begin.column).max(1)
        };
        write!(f, "\n{}{}", " ".repeat(begin.column), "^".repeat(carets))
    }
}

/// Result alias used by every pipeline stage.
pub type DiagResult<T> = std::result::Result<T, Diagnostic>;
