use std::result;

use thiserror::Error;

use crate::diagnostics::Diagnostic;
use crate::span::Span;

#[derive(Error, Debug)]
pub enum Error {
    /// A bug in an earlier pass: the tree violates an invariant this
    /// crate is entitled to rely on. Fails loudly instead of producing
    /// partial output.
    #[error("Invariant violation at {0}: {1}")]
    Invariant(Span, String),
    #[error("{0}")]
    Diagnostic(Diagnostic),
    #[error("Generic error: {0}")]
    Generic(#[from] eyre::Report),
}

pub type Result<T> = result::Result<T, Error>;

impl Error {
    pub fn generic(message: impl Into<String>) -> Self {
        Error::Generic(eyre::Report::msg(message.into()))
    }

    pub fn diagnostic(diagnostic: Diagnostic) -> Self {
        Error::Diagnostic(diagnostic)
    }

    pub fn invariant(span: Span, message: impl Into<String>) -> Self {
        Error::Invariant(span, message.into())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::generic(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::generic(s)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::generic(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::generic(e.to_string())
    }
}
