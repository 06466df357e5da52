use super::span::{CodePosition, Span};
use super::token::Token;

use std::fmt;
use thiserror::Error;

pub const MAX_CALL_ARGS: usize = 255;

/// Failure to turn source text into tokens.
#[derive(Debug, Error, PartialEq, Clone)]
#[error("{pos}: {kind}")]
pub struct LexError {
    pub pos: CodePosition,
    pub kind: LexErrorKind,
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum LexErrorKind {
    #[error("unrecognized character `{0}`")]
    UnrecognizedChar(char),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(char),
    #[error("unparsable number `{0}`")]
    InvalidNumber(String),
}

pub type LexResult<T> = Result<T, LexError>;

/// Syntactic construct being parsed when an error occurred.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Item {
    If,
    While,
    Condition,
    Block,
    Expression,
    Arguments,
    Index,
    ThenBranch,
    FunctionName,
}

/// Failure to build a tree from a token stream.
#[derive(Debug, Error, PartialEq, Clone)]
#[error("{span}: {kind}")]
pub struct SyntaxError {
    pub span: Span,
    pub kind: SyntaxErrorKind,
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum SyntaxErrorKind {
    #[error("expected `{expected}` after {after}, found {}", .found.describe())]
    ExpectedAfter {
        expected: &'static str,
        after: Item,
        found: Token,
    },
    #[error("expected expression, found {}", .0.describe())]
    ExpectedExpr(Token),
    #[error("expected property name after `.`, found {}", .0.describe())]
    ExpectedPropertyName(Token),
    #[error("invalid assignment target")]
    ExpectedLValue,
    #[error("expression is not callable")]
    NotCallable,
    #[error("unclosed `{0}`")]
    UnclosedDelimiter(&'static str),
    #[error("expected end of input, found {}", .0.describe())]
    TrailingInput(Token),
    #[error("`{name}` takes exactly one argument, found {found}")]
    BuiltinArity { name: String, found: usize },
    #[error("too many arguments, at most {} are supported", MAX_CALL_ARGS)]
    TooManyArgs,
}

pub type ParserResult<T> = Result<T, SyntaxError>;

impl SyntaxError {
    pub fn new(span: Span, kind: SyntaxErrorKind) -> Self {
        SyntaxError { span, kind }
    }

    /// Formats the error against the source it was produced from.
    pub fn render(&self, source: &str) -> String {
        let at = match self.span.extract_string(source) {
            Some(lexeme) if !lexeme.is_empty() => format!(" at '{}'", lexeme),
            _ => " at end".to_owned(),
        };
        format!("[line {}] Error{}: {}", self.span.start_pos.line_no, at, self.kind)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Item::If => "`if`",
            Item::While => "`while`",
            Item::Condition => "condition",
            Item::Block => "block",
            Item::Expression => "expression",
            Item::Arguments => "arguments",
            Item::Index => "index",
            Item::ThenBranch => "then branch",
            Item::FunctionName => "function name",
        };
        f.write_str(name)
    }
}
