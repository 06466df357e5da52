use super::operator::{InfixOperator, LogicalOperator};
use super::token::Token;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParserOperator {
    Arithequal(InfixOperator),
    Logical(LogicalOperator),
    Assignment,
    Ternary,
    Elvis,
    Call,
    Property,
    Index,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Precedence {
    // Lowest precedence
    Lowest,
    Assignment,
    Ternary,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equality,
    Comparison,
    Addition,
    Multiplication,
    Unary,
    Call, // Highest precedence
}

#[derive(Debug, Clone, Copy)]
pub enum Associativity {
    Left,
    Right,
}

impl ParserOperator {
    pub fn from_token(token: &Token) -> Option<ParserOperator> {
        if let Some(op) = Self::try_arithequal(token) {
            return Some(ParserOperator::Arithequal(op));
        }

        if let Some(op) = Self::try_logical(token) {
            return Some(ParserOperator::Logical(op));
        }

        match token {
            Token::Equals => Some(ParserOperator::Assignment),
            Token::Question => Some(ParserOperator::Ternary),
            Token::QuestionColon => Some(ParserOperator::Elvis),
            Token::LeftParen => Some(ParserOperator::Call),
            Token::Dot => Some(ParserOperator::Property),
            Token::LeftBracket => Some(ParserOperator::Index),
            _ => None,
        }
    }

    fn try_arithequal(token: &Token) -> Option<InfixOperator> {
        let op = match token {
            Token::Plus => InfixOperator::Add,
            Token::Minus => InfixOperator::Subtract,
            Token::Asterisk => InfixOperator::Multiply,
            Token::Slash => InfixOperator::Divide,
            Token::Percent => InfixOperator::Modulo,
            Token::DoubleEq => InfixOperator::EqualTo,
            Token::BangEq => InfixOperator::NotEqualTo,
            Token::RightAngle => InfixOperator::GreaterThan,
            Token::RightAngleEq => InfixOperator::GreaterEq,
            Token::LeftAngle => InfixOperator::LessThan,
            Token::LeftAngleEq => InfixOperator::LessEq,
            Token::EqTilde => InfixOperator::Matches,
            Token::BangTilde => InfixOperator::NotMatches,
            Token::Ampersand => InfixOperator::BitwiseAnd,
            Token::Pipe => InfixOperator::BitwiseOr,
            Token::Caret => InfixOperator::BitwiseXor,
            _ => return None,
        };
        Some(op)
    }

    fn try_logical(token: &Token) -> Option<LogicalOperator> {
        let op = match token {
            Token::DoubleAmpersand => LogicalOperator::And,
            Token::DoublePipe => LogicalOperator::Or,
            _ => return None,
        };

        Some(op)
    }

    pub fn is_higher_precedence(&self, min_precedence: Precedence) -> bool {
        use std::cmp::Ordering;
        match self.precedence().cmp(&min_precedence) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match self.associativity() {
                Associativity::Left => false,
                Associativity::Right => true,
            },
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            ParserOperator::Arithequal(op) => match op {
                InfixOperator::Add | InfixOperator::Subtract => Precedence::Addition,
                InfixOperator::Multiply | InfixOperator::Divide | InfixOperator::Modulo => {
                    Precedence::Multiplication
                }
                InfixOperator::EqualTo
                | InfixOperator::NotEqualTo
                | InfixOperator::Matches
                | InfixOperator::NotMatches => Precedence::Equality,
                InfixOperator::GreaterEq
                | InfixOperator::LessEq
                | InfixOperator::GreaterThan
                | InfixOperator::LessThan => Precedence::Comparison,
                InfixOperator::BitwiseAnd => Precedence::BitwiseAnd,
                InfixOperator::BitwiseXor => Precedence::BitwiseXor,
                InfixOperator::BitwiseOr => Precedence::BitwiseOr,
            },
            ParserOperator::Logical(op) => match op {
                LogicalOperator::And => Precedence::LogicalAnd,
                LogicalOperator::Or => Precedence::LogicalOr,
            },
            ParserOperator::Assignment => Precedence::Assignment,
            ParserOperator::Ternary | ParserOperator::Elvis => Precedence::Ternary,
            ParserOperator::Call | ParserOperator::Property | ParserOperator::Index => {
                Precedence::Call
            }
        }
    }

    pub fn associativity(&self) -> Associativity {
        self.precedence().associativity()
    }
}

impl Precedence {
    fn associativity(&self) -> Associativity {
        match self {
            Precedence::Assignment | Precedence::Ternary => Associativity::Right,
            _ => Associativity::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::more_asserts::*;

    #[test]
    fn test_precedence() {
        assert_lt!(Precedence::Lowest, Precedence::Unary);
        assert_lt!(Precedence::Assignment, Precedence::LogicalOr);
        assert_lt!(Precedence::LogicalOr, Precedence::LogicalAnd);
        assert_gt!(Precedence::Multiplication, Precedence::Addition);
        assert_gt!(Precedence::Comparison, Precedence::Equality);
        assert_gt!(Precedence::Call, Precedence::Unary);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            ParserOperator::from_token(&Token::Plus),
            Some(ParserOperator::Arithequal(InfixOperator::Add))
        );

        assert_eq!(
            ParserOperator::from_token(&Token::Percent),
            Some(ParserOperator::Arithequal(InfixOperator::Modulo))
        );

        assert_eq!(
            ParserOperator::from_token(&Token::DoubleAmpersand),
            Some(ParserOperator::Logical(LogicalOperator::And))
        );

        assert_eq!(ParserOperator::from_token(&Token::Bang), None);
    }

    #[test]
    fn test_associativity() {
        let assign = ParserOperator::Assignment;
        let add = ParserOperator::Arithequal(InfixOperator::Add);
        assert!(assign.is_higher_precedence(Precedence::Assignment));
        assert!(!add.is_higher_precedence(Precedence::Addition));
        assert!(add.is_higher_precedence(Precedence::Comparison));
    }
}
