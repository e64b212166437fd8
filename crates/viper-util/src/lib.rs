//! viper-util - Core utilities and foundation types.
//!
//! This crate provides the types shared by every phase of the Viper
//! pipeline:
//!
//! - [`Position`] and [`Span`] - source location tracking
//! - [`SourceBuffer`] - the source text plus line extraction for diagnostics
//! - [`Symbol`] - interned strings for identifiers and lexemes
//! - [`Diagnostic`] - the error value threaded through every stage
//!
//! Every stage of the pipeline returns `Result<T, Diagnostic>`; the first
//! diagnostic aborts the run and is rendered with a caret-annotated excerpt
//! of the offending line.

pub mod diagnostic;
pub mod pos;
pub mod source;
pub mod symbol;

pub use diagnostic::{DiagResult, Diagnostic, DiagnosticKind};
pub use pos::{Position, Span};
pub use source::SourceBuffer;
pub use symbol::Symbol;
