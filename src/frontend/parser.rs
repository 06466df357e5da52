use super::errors::{Item, ParserResult, SyntaxError, SyntaxErrorKind, MAX_CALL_ARGS};
use super::grammar::{Builtin, Expr, ExprType, Identifier, Literal, Mode, Stmt, StmtType, Tree};
use super::operator::PrefixOperator;
use super::parser_utils::{ParserOperator, Precedence};
use super::span::Span;
use super::token::{SpannedToken, Token, TokenKind};

use log::trace;

pub struct Parser {
    tokens: std::vec::IntoIter<SpannedToken>,
    current: SpannedToken,
    previous: SpannedToken,
}

impl Parser {
    /// Creates a parser over a token sequence produced by the lexer.
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        let dummy_token = SpannedToken::new(Token::EndOfFile, Span::default());
        let mut tokens = tokens.into_iter();
        let current = tokens.next().unwrap_or_else(|| dummy_token.clone());

        Parser {
            tokens,
            current,
            previous: dummy_token,
        }
    }

    /// Advances the stream. Past the end, keeps yielding `EndOfFile`.
    fn bump(&mut self) {
        let end = Span::at(self.current.span.end_pos);
        let next = self
            .tokens
            .next()
            .unwrap_or_else(|| SpannedToken::new(Token::EndOfFile, end));
        self.previous = std::mem::replace(&mut self.current, next);
    }

    /// Checks whether or not the current token matches the given token.
    fn check(&self, t: &Token) -> bool {
        self.current.token == *t
    }

    /// Consumes the current token if it matches.
    fn check_consume(&mut self, t: &Token) -> bool {
        if self.check(t) {
            self.bump();
            return true;
        }
        false
    }

    fn consume(&mut self, t: Token, expected: &'static str, after: Item) -> ParserResult<()> {
        if self.check_consume(&t) {
            Ok(())
        } else {
            Err(self.error_here(SyntaxErrorKind::ExpectedAfter {
                expected,
                after,
                found: self.current.token.clone(),
            }))
        }
    }

    /// Like `consume`, but reports an unclosed delimiter at end of input.
    fn consume_closing(
        &mut self,
        t: Token,
        expected: &'static str,
        after: Item,
        open: Span,
    ) -> ParserResult<()> {
        if self.check(&Token::EndOfFile) {
            return Err(SyntaxError::new(
                open,
                SyntaxErrorKind::UnclosedDelimiter(opening_of(expected)),
            ));
        }
        self.consume(t, expected, after)
    }

    fn error_here(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::new(self.current.span, kind)
    }

    /// Parses the whole token stream in the given mode.
    pub fn parse(mut self, mode: Mode) -> ParserResult<Tree> {
        let tree = match mode {
            Mode::Expression => {
                let expr = self.parse_expression()?;
                self.check_consume(&Token::Semicolon);
                Tree::Expression(expr)
            }
            Mode::Script => {
                let mut stmts = vec![];
                while !self.check(&Token::EndOfFile) {
                    stmts.push(self.parse_statement()?);
                }
                Tree::Script(stmts)
            }
        };

        if !self.check(&Token::EndOfFile) {
            return Err(self.error_here(SyntaxErrorKind::TrailingInput(
                self.current.token.clone(),
            )));
        }

        trace!("parsed {:?} unit: {}", mode, tree.ast_string());
        Ok(tree)
    }

    fn parse_statement(&mut self) -> ParserResult<Stmt> {
        let curr_span = self.current.span;
        let stmt_type = match self.current.token {
            Token::Semicolon => {
                self.bump();
                StmtType::Empty
            }
            Token::If => self.parse_if_else()?,
            Token::While => self.parse_while()?,
            Token::LeftBrace => {
                self.bump();
                StmtType::Block(self.parse_block_stmts(curr_span)?)
            }
            _ => self.parse_expression_statement()?,
        };

        Ok(Stmt::new(stmt_type, curr_span.extend(self.previous.span)))
    }

    /// The terminator may be left out before `}` and at end of input.
    fn parse_expression_statement(&mut self) -> ParserResult<StmtType> {
        let expr = self.parse_expression()?;
        if !self.check_consume(&Token::Semicolon)
            && !self.check(&Token::RightBrace)
            && !self.check(&Token::EndOfFile)
        {
            return Err(self.error_here(SyntaxErrorKind::ExpectedAfter {
                expected: ";",
                after: Item::Expression,
                found: self.current.token.clone(),
            }));
        }
        Ok(StmtType::Expression(expr))
    }

    fn parse_if_else(&mut self) -> ParserResult<StmtType> {
        self.bump();
        let condition = self.parse_condition(Item::If)?;

        let if_body = Box::new(self.parse_statement()?);
        let else_body = if self.check_consume(&Token::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(StmtType::IfElse(condition, if_body, else_body))
    }

    fn parse_while(&mut self) -> ParserResult<StmtType> {
        self.bump();
        let condition = self.parse_condition(Item::While)?;
        let body = self.parse_statement()?;

        Ok(StmtType::While(condition, Box::new(body)))
    }

    /// Parses `( expr )` following `if` or `while`.
    fn parse_condition(&mut self, keyword: Item) -> ParserResult<Expr> {
        let open = self.current.span;
        self.consume(Token::LeftParen, "(", keyword)?;
        let condition = self.parse_expression()?;
        self.consume_closing(Token::RightParen, ")", Item::Condition, open)?;
        Ok(condition)
    }

    fn parse_block_stmts(&mut self, open: Span) -> ParserResult<Vec<Stmt>> {
        let mut stmts = vec![];

        while !self.check(&Token::RightBrace) && !self.check(&Token::EndOfFile) {
            stmts.push(self.parse_statement()?);
        }

        self.consume_closing(Token::RightBrace, "}", Item::Block, open)?;
        Ok(stmts)
    }

    /// Parse expression with precedence.
    pub fn parse_expression(&mut self) -> ParserResult<Expr> {
        self.run_pratt_parse_algo(Precedence::Lowest)
    }

    /// Pratt parsing algo.
    fn run_pratt_parse_algo(&mut self, min_precedence: Precedence) -> ParserResult<Expr> {
        let prefix_op = match &self.current.token {
            Token::Bang => Some(PrefixOperator::LogicalNot),
            Token::Minus => Some(PrefixOperator::Negate),
            Token::Tilde => Some(PrefixOperator::BitwiseNot),
            _ => None,
        };

        let mut lhs = match prefix_op {
            Some(op) => {
                let curr_span = self.current.span;
                self.bump();
                let expr = self.run_pratt_parse_algo(Precedence::Unary)?;
                Expr::new(
                    ExprType::Prefix(op, Box::new(expr)),
                    curr_span.extend(self.previous.span),
                )
            }
            None => self.parse_primary()?,
        };

        while let Some(op) = ParserOperator::from_token(&self.current.token) {
            if !op.is_higher_precedence(min_precedence) {
                break;
            }

            let op_span = self.current.span;
            self.bump();

            let precedence = op.precedence();
            let lhs_span = lhs.span;

            let new_lhs = match op {
                ParserOperator::Arithequal(op) => {
                    let rhs = self.run_pratt_parse_algo(precedence)?;
                    ExprType::Infix(op, Box::new(lhs), Box::new(rhs))
                }
                ParserOperator::Logical(op) => {
                    let rhs = self.run_pratt_parse_algo(precedence)?;
                    ExprType::Logical(op, Box::new(lhs), Box::new(rhs))
                }
                ParserOperator::Assignment => {
                    let rhs_box = Box::new(self.run_pratt_parse_algo(precedence)?);
                    match lhs.expr {
                        ExprType::Variable(var) => ExprType::Assignment(var, rhs_box),
                        ExprType::Get(expr, property) => ExprType::Set(expr, property, rhs_box),
                        ExprType::Index(expr, key) => ExprType::SetIndex(expr, key, rhs_box),
                        _ => {
                            return Err(SyntaxError::new(op_span, SyntaxErrorKind::ExpectedLValue))
                        }
                    }
                }
                ParserOperator::Ternary => {
                    let then_expr = self.parse_expression()?;
                    self.consume(Token::Colon, ":", Item::ThenBranch)?;
                    let else_expr = self.run_pratt_parse_algo(precedence)?;
                    ExprType::Ternary(Box::new(lhs), Box::new(then_expr), Box::new(else_expr))
                }
                ParserOperator::Elvis => {
                    let rhs = self.run_pratt_parse_algo(precedence)?;
                    ExprType::Elvis(Box::new(lhs), Box::new(rhs))
                }
                ParserOperator::Call => {
                    let arguments = self.parse_call_args(op_span)?;
                    match lhs.expr {
                        ExprType::Get(target, method) => {
                            ExprType::MethodCall(target, method, arguments)
                        }
                        _ => return Err(SyntaxError::new(lhs_span, SyntaxErrorKind::NotCallable)),
                    }
                }
                ParserOperator::Property => {
                    let property = self.parse_property_name()?;
                    ExprType::Get(Box::new(lhs), property)
                }
                ParserOperator::Index => {
                    let key = self.parse_expression()?;
                    self.consume_closing(Token::RightBracket, "]", Item::Index, op_span)?;
                    ExprType::Index(Box::new(lhs), Box::new(key))
                }
            };

            lhs = Expr::new(new_lhs, lhs_span.extend(self.previous.span));
        }

        Ok(lhs)
    }

    /// Parse primary token.
    fn parse_primary(&mut self) -> ParserResult<Expr> {
        let curr_span = self.current.span;
        let token = self.current.token.clone();

        let expr = match token {
            Token::Integer(n) => ExprType::Literal(Literal::Integer(n)),
            Token::Float(n) => ExprType::Literal(Literal::Float(n)),
            Token::String(s) => ExprType::Literal(Literal::Str(s)),
            Token::True => ExprType::Literal(Literal::Boolean(true)),
            Token::False => ExprType::Literal(Literal::Boolean(false)),
            Token::Null => ExprType::Literal(Literal::Null),
            Token::Identifier(name) => ExprType::Variable(Identifier::new(name, curr_span)),
            Token::Size => {
                self.bump();
                return self.parse_builtin_call(Builtin::Size, curr_span);
            }
            Token::Empty => {
                self.bump();
                return self.parse_builtin_call(Builtin::Empty, curr_span);
            }
            Token::LeftParen => {
                self.bump();
                let sub_expr = self.parse_expression()?;
                self.consume_closing(Token::RightParen, ")", Item::Expression, curr_span)?;
                return Ok(sub_expr);
            }
            t => return Err(self.error_here(SyntaxErrorKind::ExpectedExpr(t))),
        };

        self.bump();
        Ok(Expr::new(expr, curr_span))
    }

    /// Parses `size(x)` and `empty(x)`.
    fn parse_builtin_call(&mut self, builtin: Builtin, curr_span: Span) -> ParserResult<Expr> {
        let open = self.current.span;
        self.consume(Token::LeftParen, "(", Item::FunctionName)?;
        let args = self.parse_call_args(open)?;
        if args.len() != 1 {
            return Err(SyntaxError::new(
                curr_span.extend(self.previous.span),
                SyntaxErrorKind::BuiltinArity {
                    name: builtin.name().to_owned(),
                    found: args.len(),
                },
            ));
        }

        Ok(Expr::new(
            ExprType::FunctionCall(builtin, args),
            curr_span.extend(self.previous.span),
        ))
    }

    /// Property names may reuse keywords, as in `x.size()` or `x.empty`.
    fn parse_property_name(&mut self) -> ParserResult<Identifier> {
        let name = match &self.current.token {
            Token::Identifier(name) => name.clone(),
            t if t.kind() == TokenKind::Keyword => t.to_string(),
            t => return Err(self.error_here(SyntaxErrorKind::ExpectedPropertyName(t.clone()))),
        };
        self.bump();
        Ok(Identifier::new(name, self.previous.span))
    }

    /// Parses arguments after an already consumed `(`.
    fn parse_call_args(&mut self, open: Span) -> ParserResult<Vec<Expr>> {
        let mut args = vec![];
        if self.check_consume(&Token::RightParen) {
            return Ok(args);
        }

        args.push(self.parse_expression()?);

        while !self.check_consume(&Token::RightParen) {
            if self.check(&Token::EndOfFile) {
                return Err(SyntaxError::new(
                    open,
                    SyntaxErrorKind::UnclosedDelimiter("("),
                ));
            }
            self.consume(Token::Comma, ")", Item::Arguments)?;
            args.push(self.parse_expression()?);
        }

        if let Some(extra) = args.get(MAX_CALL_ARGS) {
            return Err(SyntaxError::new(extra.span, SyntaxErrorKind::TooManyArgs));
        }

        Ok(args)
    }
}

fn opening_of(closing: &str) -> &'static str {
    match closing {
        ")" => "(",
        "]" => "[",
        _ => "{",
    }
}

/// Parses a token sequence into a tree of the requested shape.
pub fn parse(tokens: Vec<SpannedToken>, mode: Mode) -> ParserResult<Tree> {
    Parser::new(tokens).parse(mode)
}
