use super::arithmetic::Arithmetic;
use super::builtins::call_builtin;
use super::context::Context;
use super::errors::{EvalError, EvalErrorKind, EvalResult};
use super::members::invoke;
use super::value::Value;
use crate::frontend::grammar::{Expr, ExprType, Literal, Stmt, StmtType, Tree};
use crate::frontend::operator::LogicalOperator;
use crate::introspection::{Access, MemberResolver};

use log::{debug, trace};

/// Tree-walking evaluator over a borrowed context.
pub struct Interpreter<'a> {
    context: &'a mut Context,
    resolver: &'a dyn MemberResolver,
    arithmetic: Arithmetic,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        context: &'a mut Context,
        resolver: &'a dyn MemberResolver,
        arithmetic: Arithmetic,
    ) -> Self {
        Interpreter {
            context,
            resolver,
            arithmetic,
        }
    }

    pub fn eval_tree(&mut self, tree: &Tree) -> EvalResult<Value> {
        debug!("evaluating {:?} with {} bound variables", tree.mode(), self.context.len());
        let result = match tree {
            Tree::Expression(expr) => self.eval_expression(expr),
            Tree::Script(stmts) => self.eval_statements(stmts),
        };
        match &result {
            Ok(value) => debug!("evaluation returned {}", value),
            Err(err) => debug!("evaluation failed: {}", err),
        }
        result
    }

    /// Value of the last non-empty statement, null if there is none.
    pub fn eval_statements(&mut self, stmts: &[Stmt]) -> EvalResult<Value> {
        let mut last = Value::Null;
        for stmt in stmts.iter() {
            if stmt.stmt != StmtType::Empty {
                last = self.eval_statement(stmt)?;
            }
        }
        Ok(last)
    }

    pub fn eval_statement(&mut self, stmt: &Stmt) -> EvalResult<Value> {
        #[cfg(feature = "trace-evaluation")]
        trace!("{} {}", stmt.span, stmt.ast_string());

        match &stmt.stmt {
            StmtType::Expression(expr) => self.eval_expression(expr),
            StmtType::Block(stmts) => self.eval_statements(stmts),
            StmtType::IfElse(condition, then_body, else_body) => {
                self.eval_if_else(condition, then_body, else_body.as_deref())
            }
            StmtType::While(condition, body) => self.eval_while(condition, body),
            StmtType::Empty => Ok(Value::Null),
        }
    }

    fn eval_if_else(
        &mut self,
        condition: &Expr,
        then_body: &Stmt,
        else_body: Option<&Stmt>,
    ) -> EvalResult<Value> {
        if self.eval_expression(condition)?.is_truthy() {
            return self.eval_statement(then_body);
        }
        match else_body {
            Some(else_body) => self.eval_statement(else_body),
            None => Ok(Value::Null),
        }
    }

    fn eval_while(&mut self, condition: &Expr, body: &Stmt) -> EvalResult<Value> {
        let mut last = Value::Null;
        while self.eval_expression(condition)?.is_truthy() {
            last = self.eval_statement(body)?;
        }
        Ok(last)
    }

    pub fn eval_expression(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.eval_expression_at(expr).map_err(|err| err.at(expr.span))
    }

    fn eval_expression_at(&mut self, expr: &Expr) -> EvalResult<Value> {
        match &expr.expr {
            ExprType::Literal(literal) => Ok(match literal {
                Literal::Integer(n) => Value::Integer(*n),
                Literal::Float(n) => Value::Float(*n),
                Literal::Boolean(b) => Value::Boolean(*b),
                Literal::Str(s) => Value::String(s.clone()),
                Literal::Null => Value::Null,
            }),
            ExprType::Variable(var) => self.lookup_variable(var.name()),
            ExprType::Infix(op, lhs, rhs) => {
                let lhs = self.eval_expression(lhs)?;
                let rhs = self.eval_expression(rhs)?;
                self.arithmetic.apply_infix(*op, lhs, rhs)
            }
            ExprType::Prefix(op, operand) => {
                let value = self.eval_expression(operand)?;
                self.arithmetic.apply_prefix(*op, value)
            }
            ExprType::Logical(op, lhs, rhs) => {
                let lhs = self.eval_expression(lhs)?.is_truthy();
                let result = match op {
                    LogicalOperator::And => lhs && self.eval_expression(rhs)?.is_truthy(),
                    LogicalOperator::Or => lhs || self.eval_expression(rhs)?.is_truthy(),
                };
                Ok(Value::Boolean(result))
            }
            ExprType::Ternary(condition, then_expr, else_expr) => {
                if self.eval_expression(condition)?.is_truthy() {
                    self.eval_expression(then_expr)
                } else {
                    self.eval_expression(else_expr)
                }
            }
            ExprType::Elvis(lhs, rhs) => {
                let value = self.eval_expression(lhs)?;
                if value.is_truthy() {
                    Ok(value)
                } else {
                    self.eval_expression(rhs)
                }
            }
            ExprType::Assignment(var, value) => {
                let value = self.eval_expression(value)?;
                self.context.set(var.name(), value.clone());
                Ok(value)
            }
            ExprType::Get(target, property) => {
                if let Some(value) = self.lookup_dotted(expr) {
                    return Ok(value);
                }
                let target = self.eval_expression(target)?;
                self.get_property(&target, property.name())
            }
            ExprType::Index(target, key) => {
                let target = self.eval_expression(target)?;
                let key = self.eval_expression(key)?.render();
                self.get_property(&target, &key)
            }
            ExprType::Set(target, property, value) => {
                let target = self.eval_expression(target)?;
                let value = self.eval_expression(value)?;
                self.set_property(&target, property.name(), value)
            }
            ExprType::SetIndex(target, key, value) => {
                let target = self.eval_expression(target)?;
                let key = self.eval_expression(key)?.render();
                let value = self.eval_expression(value)?;
                self.set_property(&target, &key, value)
            }
            ExprType::MethodCall(target, method, args) => {
                let target = self.eval_expression(target)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval_expression(arg))
                    .collect::<EvalResult<Vec<_>>>()?;
                invoke(self.resolver, &target, method.name(), Access::call(&args), args)
                    .map_err(|err| err.at(method.span))
            }
            ExprType::FunctionCall(builtin, args) => {
                let arg = match args.first() {
                    Some(arg) => self.eval_expression(arg)?,
                    None => Value::Null,
                };
                call_builtin(*builtin, arg, self.resolver)
            }
        }
    }

    fn lookup_variable(&self, name: &str) -> EvalResult<Value> {
        match self.context.get_ref(name) {
            Some(value) => Ok(value.clone()),
            None if self.arithmetic.is_strict() => Err(EvalError::new(
                EvalErrorKind::UndefinedVariable(name.to_owned()),
            )),
            None => Ok(Value::Null),
        }
    }

    /// Dotted names such as `a.b.c` may be bound as a whole when `a` is not.
    fn lookup_dotted(&self, expr: &Expr) -> Option<Value> {
        let path = expr.dotted_path()?;
        let root = path.split('.').next()?;
        if self.context.has(root) {
            return None;
        }
        let value = self.context.get_ref(&path).cloned();
        if value.is_some() {
            trace!("resolved dotted variable `{}`", path);
        }
        value
    }

    fn get_property(&self, target: &Value, name: &str) -> EvalResult<Value> {
        invoke(self.resolver, target, name, Access::Get, vec![])
    }

    fn set_property(&self, target: &Value, name: &str, value: Value) -> EvalResult<Value> {
        let access = Access::Set(value.kind());
        invoke(self.resolver, target, name, access, vec![value.clone()])?;
        Ok(value)
    }
}
