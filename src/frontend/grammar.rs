use super::operator::{InfixOperator, LogicalOperator, PrefixOperator};
use super::span::Span;

/// Whether a unit holds a single expression or a statement sequence.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Mode {
    Expression,
    Script,
}

/// Root of a parsed unit.
#[derive(Debug, PartialEq, Clone)]
pub enum Tree {
    Expression(Expr),
    Script(Vec<Stmt>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Stmt {
    pub stmt: StmtType,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum StmtType {
    Expression(Expr),
    Block(Vec<Stmt>),
    IfElse(Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Expr, Box<Stmt>),
    Empty,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Expr {
    pub expr: ExprType,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExprType {
    Literal(Literal),
    Variable(Identifier),
    Infix(InfixOperator, Box<Expr>, Box<Expr>),
    Prefix(PrefixOperator, Box<Expr>),
    Logical(LogicalOperator, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    Elvis(Box<Expr>, Box<Expr>),
    Assignment(Identifier, Box<Expr>),
    Get(Box<Expr>, Identifier),
    Index(Box<Expr>, Box<Expr>),
    Set(Box<Expr>, Identifier, Box<Expr>),
    SetIndex(Box<Expr>, Box<Expr>, Box<Expr>),
    MethodCall(Box<Expr>, Identifier, Vec<Expr>),
    FunctionCall(Builtin, Vec<Expr>),
}

/// Functions callable without a target.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Builtin {
    Size,
    Empty,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Str(String),
    Null,
}

impl Tree {
    pub fn mode(&self) -> Mode {
        match self {
            Tree::Expression(_) => Mode::Expression,
            Tree::Script(_) => Mode::Script,
        }
    }

    pub fn ast_string(&self) -> String {
        match self {
            Tree::Expression(expr) => expr.ast_string(),
            Tree::Script(stmts) => {
                let stmts: Vec<_> = stmts.iter().map(|s| s.ast_string()).collect();
                stmts.join(" ")
            }
        }
    }
}

impl Identifier {
    pub fn new(name: String, span: Span) -> Self {
        Self { name, span }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Builtin {
    pub fn name(&self) -> &str {
        match self {
            Builtin::Size => "size",
            Builtin::Empty => "empty",
        }
    }
}

impl Stmt {
    pub fn new(stmt: StmtType, span: Span) -> Self {
        Stmt { stmt, span }
    }

    pub fn ast_string(&self) -> String {
        match &self.stmt {
            StmtType::Expression(expr) => expr.ast_string(),
            StmtType::Block(stmts) => {
                let stmts: Vec<_> = stmts.iter().map(|s| s.ast_string()).collect();
                format!("(block {})", stmts.join(" "))
            }
            StmtType::IfElse(condition, then_branch, else_branch) => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    condition.ast_string(),
                    then_branch.ast_string(),
                    else_branch.ast_string()
                ),
                None => format!(
                    "(if {} {})",
                    condition.ast_string(),
                    then_branch.ast_string()
                ),
            },
            StmtType::While(condition, body) => {
                format!("(while {} {})", condition.ast_string(), body.ast_string())
            }
            StmtType::Empty => "(empty)".to_owned(),
        }
    }
}

impl Expr {
    pub fn new(expr: ExprType, span: Span) -> Self {
        Expr { expr, span }
    }

    /// Dotted name (`a.b.c`) when the expression is a plain variable path.
    pub fn dotted_path(&self) -> Option<String> {
        match &self.expr {
            ExprType::Variable(var) => Some(var.name.clone()),
            ExprType::Get(target, property) => target
                .dotted_path()
                .map(|path| format!("{}.{}", path, property.name)),
            _ => None,
        }
    }

    /// S-expression rendering of the tree, used in tests and tracing.
    pub fn ast_string(&self) -> String {
        match &self.expr {
            ExprType::Literal(l) => match l {
                Literal::Integer(n) => n.to_string(),
                Literal::Float(n) => format!("{:?}", n),
                Literal::Boolean(b) => b.to_string(),
                Literal::Str(s) => format!("'{}'", s),
                Literal::Null => "null".to_owned(),
            },
            ExprType::Variable(var) => var.name.clone(),
            ExprType::Infix(op, lhs, rhs) => format!(
                "({} {} {})",
                op.symbol(),
                lhs.ast_string(),
                rhs.ast_string()
            ),
            ExprType::Prefix(op, expr) => format!("({} {})", op.symbol(), expr.ast_string()),
            ExprType::Logical(op, lhs, rhs) => format!(
                "({} {} {})",
                op.symbol(),
                lhs.ast_string(),
                rhs.ast_string()
            ),
            ExprType::Ternary(condition, then_expr, else_expr) => format!(
                "(? {} {} {})",
                condition.ast_string(),
                then_expr.ast_string(),
                else_expr.ast_string()
            ),
            ExprType::Elvis(lhs, rhs) => {
                format!("(?: {} {})", lhs.ast_string(), rhs.ast_string())
            }
            ExprType::Assignment(var, expr) => format!("(set {} {})", var.name, expr.ast_string()),
            ExprType::Get(expr, property) => {
                format!("(get {} {})", expr.ast_string(), property.name)
            }
            ExprType::Index(expr, key) => {
                format!("(get {} {})", expr.ast_string(), key.ast_string())
            }
            ExprType::Set(expr_lhs, property, expr_rhs) => format!(
                "(set {} {} {})",
                expr_lhs.ast_string(),
                property.name,
                expr_rhs.ast_string()
            ),
            ExprType::SetIndex(expr_lhs, key, expr_rhs) => format!(
                "(set {} {} {})",
                expr_lhs.ast_string(),
                key.ast_string(),
                expr_rhs.ast_string()
            ),
            ExprType::MethodCall(target, method, args) => {
                let mut parts = vec![target.ast_string(), method.name.clone()];
                parts.extend(args.iter().map(|a| a.ast_string()));
                format!("(call {})", parts.join(" "))
            }
            ExprType::FunctionCall(builtin, args) => {
                let mut parts = vec![builtin.name().to_owned()];
                parts.extend(args.iter().map(|a| a.ast_string()));
                format!("(call {})", parts.join(" "))
            }
        }
    }
}
