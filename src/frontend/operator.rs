#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PrefixOperator {
    Negate,
    LogicalNot,
    BitwiseNot,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InfixOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    EqualTo,
    NotEqualTo,
    GreaterThan,
    GreaterEq,
    LessThan,
    LessEq,
    Matches,
    NotMatches,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
}

impl LogicalOperator {
    pub fn symbol(&self) -> &str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
        }
    }
}

impl PrefixOperator {
    pub fn symbol(&self) -> &str {
        match self {
            PrefixOperator::LogicalNot => "!",
            PrefixOperator::Negate => "-",
            PrefixOperator::BitwiseNot => "~",
        }
    }
}

impl InfixOperator {
    pub fn symbol(&self) -> &str {
        match self {
            InfixOperator::Add => "+",
            InfixOperator::Subtract => "-",
            InfixOperator::Multiply => "*",
            InfixOperator::Divide => "/",
            InfixOperator::Modulo => "%",
            InfixOperator::EqualTo => "==",
            InfixOperator::NotEqualTo => "!=",
            InfixOperator::GreaterThan => ">",
            InfixOperator::GreaterEq => ">=",
            InfixOperator::LessThan => "<",
            InfixOperator::LessEq => "<=",
            InfixOperator::Matches => "=~",
            InfixOperator::NotMatches => "!~",
            InfixOperator::BitwiseAnd => "&",
            InfixOperator::BitwiseOr => "|",
            InfixOperator::BitwiseXor => "^",
        }
    }
}
