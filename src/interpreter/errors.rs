use crate::frontend::Span;
use crate::introspection::{Access, HostError};

use std::error::Error;
use std::fmt;
use thiserror::Error as ThisError;

/// Failure while evaluating a compiled unit, positioned at the offending node.
#[derive(Debug, PartialEq, Clone)]
pub struct EvalError {
    pub span: Option<Span>,
    pub kind: EvalErrorKind,
}

#[derive(Debug, ThisError, PartialEq, Clone)]
pub enum EvalErrorKind {
    #[error("cannot access `{0}` on null")]
    Property(String),
    #[error("no {access} `{member}` on {type_name}")]
    MemberNotFound {
        type_name: String,
        member: String,
        access: Access,
    },
    #[error("type error: {0}")]
    Type(String),
    #[error("arithmetic error: {0}")]
    Arithmetic(String),
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("`{member}` failed: {source}")]
    Invocation { member: String, source: HostError },
}

pub type EvalResult<T> = Result<T, EvalError>;

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError { span: None, kind }
    }

    /// Attaches a position unless a more precise one is already set.
    pub fn at(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind)
    }
}

impl Error for EvalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.kind)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.span {
            Some(span) => write!(f, "{}: {}", span, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}
