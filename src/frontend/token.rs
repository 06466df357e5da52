use super::span::Span;
use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // Punctuation.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Dot,
    Comma,
    Semicolon,
    Colon,

    // Operators.
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Ampersand,
    Pipe,
    Caret,
    Tilde,
    Question,
    QuestionColon,
    Bang,
    BangEq,
    BangTilde,
    Equals,
    DoubleEq,
    EqTilde,
    LeftAngle,
    LeftAngleEq,
    RightAngle,
    RightAngleEq,
    DoubleAmpersand,
    DoublePipe,

    // Literals.
    Identifier(String),
    String(String),
    Integer(i64),
    Float(f64),

    // Keywords.
    If,
    Else,
    While,
    True,
    False,
    Null,
    Size,
    Empty,

    EndOfFile,
}

/// Coarse classification of a token.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Operator,
    Keyword,
    Punctuation,
    EndOfInput,
}

#[derive(Debug, PartialEq, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::LeftParen
            | Token::RightParen
            | Token::LeftBrace
            | Token::RightBrace
            | Token::LeftBracket
            | Token::RightBracket
            | Token::Dot
            | Token::Comma
            | Token::Semicolon
            | Token::Colon => TokenKind::Punctuation,
            Token::Identifier(_) => TokenKind::Identifier,
            Token::String(_) => TokenKind::String,
            Token::Integer(_) | Token::Float(_) => TokenKind::Number,
            Token::If
            | Token::Else
            | Token::While
            | Token::True
            | Token::False
            | Token::Null
            | Token::Size
            | Token::Empty => TokenKind::Keyword,
            Token::EndOfFile => TokenKind::EndOfInput,
            _ => TokenKind::Operator,
        }
    }

    /// Human readable form used in syntax error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Identifier(name) => format!("identifier `{}`", name),
            Token::String(s) => format!("string '{}'", s),
            Token::Integer(n) => format!("number {}", n),
            Token::Float(n) => format!("number {}", n),
            Token::EndOfFile => "end of input".to_owned(),
            other => format!("`{}`", other),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::LeftBrace => "{",
            Token::RightBrace => "}",
            Token::LeftBracket => "[",
            Token::RightBracket => "]",
            Token::Dot => ".",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Colon => ":",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Asterisk => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Ampersand => "&",
            Token::Pipe => "|",
            Token::Caret => "^",
            Token::Tilde => "~",
            Token::Question => "?",
            Token::QuestionColon => "?:",
            Token::Bang => "!",
            Token::BangEq => "!=",
            Token::BangTilde => "!~",
            Token::Equals => "=",
            Token::DoubleEq => "==",
            Token::EqTilde => "=~",
            Token::LeftAngle => "<",
            Token::LeftAngleEq => "<=",
            Token::RightAngle => ">",
            Token::RightAngleEq => ">=",
            Token::DoubleAmpersand => "&&",
            Token::DoublePipe => "||",
            Token::If => "if",
            Token::Else => "else",
            Token::While => "while",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            Token::Size => "size",
            Token::Empty => "empty",
            Token::EndOfFile => "<eof>",
            Token::Identifier(name) => return write!(f, "{}", name),
            Token::String(s) => return write!(f, "'{}'", s),
            Token::Integer(n) => return write!(f, "{}", n),
            Token::Float(n) => return write!(f, "{:?}", n),
        };
        f.write_str(symbol)
    }
}

impl SpannedToken {
    pub fn new(token: Token, span: Span) -> Self {
        SpannedToken { token, span }
    }
}
