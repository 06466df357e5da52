use crate::frontend::{LexError, SyntaxError};
use crate::interpreter::EvalError;

use thiserror::Error;

/// Any failure surfaced by the engine.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum Error {
    #[error("lex error at {0}")]
    Lex(#[from] LexError),
    #[error("syntax error at {0}")]
    Syntax(#[from] SyntaxError),
    #[error("evaluation error at {0}")]
    Evaluation(#[from] EvalError),
}

impl Error {
    /// Message for a user looking at `source`, with line and offending token.
    pub fn render(&self, source: &str) -> String {
        match self {
            Error::Syntax(err) => err.render(source),
            other => other.to_string(),
        }
    }
}
