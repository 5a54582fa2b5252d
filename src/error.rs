//! Centralised error hierarchy for the **Toy compiler**.
//!
//! Compilation never aborts on the first problem: the parser turns every
//! lexical, syntax or semantic problem into a [`Diagnostic`] and hands it to
//! a [`DiagnosticSink`].  Only the entry points in [`crate::compiler`] turn a
//! failed compilation into a [`ToyError`].
//!
//! The module **does not** print diagnostics itself.

use std::fmt;
use std::io;

use log::info;
use serde::Serialize;
use thiserror::Error;

/// Which stage found the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Scanner rejected the input (surfaced as an `ERROR` token).
    Lexical,

    /// An expected token was missing or no expression can start here.
    Syntax,

    /// Well-formed but meaningless: bad assignment target, duplicate local,
    /// exhausted operand space.
    Semantic,
}

/// Where on the line the problem was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Location {
    /// At a concrete lexeme.
    At(String),

    /// At end of input.
    End,

    /// No useful location (lexical errors).
    Unknown,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::At(lexeme) => write!(f, " at '{}'", lexeme),
            Location::End => write!(f, " at end"),
            Location::Unknown => Ok(()),
        }
    }
}

/// One reported compile error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("[line {line}] Error{location}: {message}")]
pub struct Diagnostic {
    pub kind: ErrorKind,

    /// 1‑based line where the error occurred.
    pub line: usize,

    pub location: Location,

    /// Human‑readable description.
    pub message: String,
}

impl Diagnostic {
    pub fn new<S: Into<String>>(kind: ErrorKind, line: usize, location: Location, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating {:?} diagnostic: line={}, msg={}",
            kind, line, message
        );

        Diagnostic {
            kind,
            line,
            location,
            message,
        }
    }
}

/// Receiver for diagnostics.  Purely observational.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Canonical error type returned by the crate's entry points.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ToyError {
    /// Compilation finished with errors; the chunk was discarded.
    #[error("compilation failed with {} error(s)", .0.len())]
    Compile(Vec<Diagnostic>),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting source text.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, ToyError>;
