use super::cursor::Cursor;
use super::errors::{LexError, LexErrorKind, LexResult};
use super::span::Span;
use super::token::{SpannedToken, Token};

use log::trace;

pub struct Lexer<'src> {
    source: &'src str,
    cursor: Cursor<'src>,
    seen_eof: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer from source.
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source,
            cursor: Cursor::new(source),
            seen_eof: false,
        }
    }

    /// Returns the next token, `EndOfFile` once the source is exhausted.
    pub fn next_token(&mut self) -> LexResult<SpannedToken> {
        loop {
            self.cursor.take_while(|ch| ch.is_whitespace());

            let start_pos = self.cursor.get_position();
            let token = self.lex_token().map_err(|kind| LexError {
                pos: start_pos,
                kind,
            })?;
            let end_pos = self.cursor.get_position();

            if let Some(token) = token {
                return Ok(SpannedToken::new(token, Span::new(start_pos, end_pos)));
            }
        }
    }

    /// Lexes a single token. `None` means a comment was skipped.
    fn lex_token(&mut self) -> Result<Option<Token>, LexErrorKind> {
        let (byte_idx, ch) = match self.cursor.take() {
            Some(t) => t,
            None => return Ok(Some(Token::EndOfFile)),
        };

        let token = match ch {
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '{' => Token::LeftBrace,
            '}' => Token::RightBrace,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            '.' => Token::Dot,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            ':' => Token::Colon,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Asterisk,
            '%' => Token::Percent,
            '^' => Token::Caret,
            '~' => Token::Tilde,

            '#' => {
                if self.cursor.take_if('#') {
                    self.consume_line();
                    return Ok(None);
                }
                return Err(LexErrorKind::UnrecognizedChar('#'));
            }
            '/' => {
                if self.cursor.take_if('/') {
                    self.consume_line();
                    return Ok(None);
                } else if self.cursor.take_if('*') {
                    self.consume_block_comment()?;
                    return Ok(None);
                } else {
                    Token::Slash
                }
            }

            '&' => self.look_for('&', Token::Ampersand, Token::DoubleAmpersand),
            '|' => self.look_for('|', Token::Pipe, Token::DoublePipe),
            '?' => self.look_for(':', Token::Question, Token::QuestionColon),
            '<' => self.look_for('=', Token::LeftAngle, Token::LeftAngleEq),
            '>' => self.look_for('=', Token::RightAngle, Token::RightAngleEq),
            '=' => match self.cursor.peek() {
                Some((_, '=')) => self.take_and(Token::DoubleEq),
                Some((_, '~')) => self.take_and(Token::EqTilde),
                _ => Token::Equals,
            },
            '!' => match self.cursor.peek() {
                Some((_, '=')) => self.take_and(Token::BangEq),
                Some((_, '~')) => self.take_and(Token::BangTilde),
                _ => Token::Bang,
            },

            '"' | '\'' => self.lex_string(ch)?,
            _ if is_digit_char(ch) => self.lex_number(byte_idx)?,
            _ if is_identifier_start(ch) => self.lex_identifier_or_kw(byte_idx),

            _ => return Err(LexErrorKind::UnrecognizedChar(ch)),
        };

        Ok(Some(token))
    }

    fn take_and(&mut self, token: Token) -> Token {
        self.cursor.take();
        token
    }

    fn consume_line(&mut self) {
        self.cursor.take_while(|ch| ch != '\n');
        self.cursor.take();
    }

    fn consume_block_comment(&mut self) -> Result<(), LexErrorKind> {
        loop {
            match self.cursor.take() {
                Some((_, '*')) if self.cursor.take_if('/') => return Ok(()),
                Some(_) => {}
                None => return Err(LexErrorKind::UnterminatedComment),
            }
        }
    }

    /// Checks if next char is `next`. If so, consume it and return t2.
    /// Otherwise, return t1.
    fn look_for(&mut self, next: char, t1: Token, t2: Token) -> Token {
        if self.cursor.take_if(next) {
            t2
        } else {
            t1
        }
    }

    /// Scans a string up to the closing `quote`, decoding escapes.
    fn lex_string(&mut self, quote: char) -> Result<Token, LexErrorKind> {
        let mut string = String::new();

        loop {
            let (_, ch) = self
                .cursor
                .take()
                .ok_or(LexErrorKind::UnterminatedString)?;

            match ch {
                _ if ch == quote => return Ok(Token::String(string)),
                '\\' => string.push(self.lex_escape()?),
                _ => string.push(ch),
            }
        }
    }

    fn lex_escape(&mut self) -> Result<char, LexErrorKind> {
        let (_, ch) = self
            .cursor
            .take()
            .ok_or(LexErrorKind::UnterminatedString)?;

        let escaped = match ch {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            '0' => '\0',
            '\\' | '\'' | '"' => ch,
            'u' => {
                let mut code = 0;
                for _ in 0..4 {
                    let digit = self
                        .cursor
                        .take()
                        .and_then(|(_, d)| d.to_digit(16))
                        .ok_or(LexErrorKind::InvalidEscape('u'))?;
                    code = code * 16 + digit;
                }
                char::from_u32(code).ok_or(LexErrorKind::InvalidEscape('u'))?
            }
            other => return Err(LexErrorKind::InvalidEscape(other)),
        };

        Ok(escaped)
    }

    /// Scans an integer or float literal.
    fn lex_number(&mut self, start_idx: usize) -> Result<Token, LexErrorKind> {
        self.cursor.take_while(is_digit_char);

        let mut is_float = false;
        if let Some((_, '.')) = self.cursor.peek() {
            if self
                .cursor
                .peek_next()
                .map_or(false, |t| is_digit_char(t.1))
            {
                is_float = true;
                self.cursor.take();
                self.cursor.take_while(is_digit_char);
            }
        }

        let end_idx = self.cursor.byte_offset();
        let scanned_number = &self.source[start_idx..end_idx];
        let token = if is_float {
            scanned_number.parse().map(Token::Float).ok()
        } else {
            scanned_number.parse().map(Token::Integer).ok()
        };

        token.ok_or_else(|| LexErrorKind::InvalidNumber(scanned_number.to_owned()))
    }

    /// Scan up to end of lexeme and return it as identifier. Checks for keywords.
    fn lex_identifier_or_kw(&mut self, start_idx: usize) -> Token {
        self.cursor.take_while(is_identifier_char);

        let end_idx = self.cursor.byte_offset();

        match &self.source[start_idx..end_idx] {
            "if" => Token::If,
            "else" => Token::Else,
            "while" => Token::While,
            "true" => Token::True,
            "false" => Token::False,
            "null" => Token::Null,
            "size" => Token::Size,
            "empty" => Token::Empty,
            "and" => Token::DoubleAmpersand,
            "or" => Token::DoublePipe,
            "not" => Token::Bang,
            "eq" => Token::DoubleEq,
            "ne" => Token::BangEq,
            "lt" => Token::LeftAngle,
            "le" => Token::LeftAngleEq,
            "gt" => Token::RightAngle,
            "ge" => Token::RightAngleEq,
            "div" => Token::Slash,
            "mod" => Token::Percent,
            other => Token::Identifier(other.to_owned()),
        }
    }

    /// Returns an iterator version of lexer. The final item is `EndOfFile`.
    pub fn iter(self) -> LexerIterator<'src> {
        LexerIterator { lexer: self }
    }
}

pub struct LexerIterator<'src> {
    lexer: Lexer<'src>,
}

impl<'src> Iterator for LexerIterator<'src> {
    type Item = LexResult<SpannedToken>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.lexer.seen_eof {
            return None;
        }

        let token = self.lexer.next_token();
        match &token {
            Ok(t) if t.token == Token::EndOfFile => self.lexer.seen_eof = true,
            Err(_) => self.lexer.seen_eof = true,
            _ => {}
        }
        Some(token)
    }
}

/// Turns source text into a token sequence ending with `EndOfFile`.
pub fn tokenize(source: &str) -> LexResult<Vec<SpannedToken>> {
    let tokens = Lexer::new(source).iter().collect::<LexResult<Vec<_>>>()?;
    trace!("lexed {} tokens", tokens.len());
    Ok(tokens)
}

fn is_digit_char(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}
