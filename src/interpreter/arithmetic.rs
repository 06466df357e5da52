use super::errors::{EvalError, EvalErrorKind, EvalResult};
use super::value::{same_object, Value};
use crate::frontend::operator::{InfixOperator, PrefixOperator};

use regex::Regex;
use std::cmp::Ordering;

/// Operand after numeric coercion.
#[derive(Debug, PartialEq, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(n) => n,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Number::Int(n) => Value::Integer(n),
            Number::Float(n) => Value::Float(n),
        }
    }
}

/// Operator semantics shared by every evaluation of an engine.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Arithmetic {
    strict: bool,
}

impl Arithmetic {
    pub fn new(strict: bool) -> Self {
        Arithmetic { strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn apply_infix(&self, op: InfixOperator, lhs: Value, rhs: Value) -> EvalResult<Value> {
        match op {
            InfixOperator::Add => self.add(lhs, rhs),
            InfixOperator::Subtract => self.numeric_binop(op, &lhs, &rhs, i64::checked_sub, |a, b| a - b),
            InfixOperator::Multiply => self.numeric_binop(op, &lhs, &rhs, i64::checked_mul, |a, b| a * b),
            InfixOperator::Divide | InfixOperator::Modulo => self.divide(op, &lhs, &rhs),
            InfixOperator::EqualTo => Ok(Value::Boolean(self.equals(&lhs, &rhs))),
            InfixOperator::NotEqualTo => Ok(Value::Boolean(!self.equals(&lhs, &rhs))),
            InfixOperator::GreaterThan
            | InfixOperator::GreaterEq
            | InfixOperator::LessThan
            | InfixOperator::LessEq => {
                // Unordered operands (NaN) satisfy no relation.
                let result = self.compare(op, &lhs, &rhs)?.map_or(false, |ordering| match op {
                    InfixOperator::GreaterThan => ordering == Ordering::Greater,
                    InfixOperator::GreaterEq => ordering != Ordering::Less,
                    InfixOperator::LessThan => ordering == Ordering::Less,
                    _ => ordering != Ordering::Greater,
                });
                Ok(Value::Boolean(result))
            }
            InfixOperator::Matches => matches_pattern(&lhs, &rhs).map(Value::Boolean),
            InfixOperator::NotMatches => matches_pattern(&lhs, &rhs).map(|m| Value::Boolean(!m)),
            InfixOperator::BitwiseAnd | InfixOperator::BitwiseOr | InfixOperator::BitwiseXor => {
                match (&lhs, &rhs) {
                    (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(match op {
                        InfixOperator::BitwiseAnd => a & b,
                        InfixOperator::BitwiseOr => a | b,
                        _ => a ^ b,
                    })),
                    _ => Err(illegal_infix(op, &lhs, &rhs)),
                }
            }
        }
    }

    pub fn apply_prefix(&self, op: PrefixOperator, value: Value) -> EvalResult<Value> {
        match op {
            PrefixOperator::LogicalNot => Ok(Value::Boolean(!value.is_truthy())),
            PrefixOperator::BitwiseNot => match value {
                Value::Integer(n) => Ok(Value::Integer(!n)),
                other => Err(illegal_prefix(op, &other)),
            },
            PrefixOperator::Negate => match self.to_number(&value)? {
                Some(Number::Int(n)) => Ok(n
                    .checked_neg()
                    .map_or(Value::Float(-(n as f64)), Value::Integer)),
                Some(Number::Float(n)) => Ok(Value::Float(-n)),
                None => Err(illegal_prefix(op, &value)),
            },
        }
    }

    /// Script-level `==`. Never fails; incomparable values are unequal.
    pub fn equals(&self, lhs: &Value, rhs: &Value) -> bool {
        match (lhs, rhs) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::String(_), Value::String(_)) => lhs.render() == rhs.render(),
            (Value::String(_), _) | (_, Value::String(_)) => {
                match (parse_number(lhs), parse_number(rhs)) {
                    (Some(a), Some(b)) => numbers_equal(a, b),
                    _ => lhs.render() == rhs.render(),
                }
            }
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
                lhs.as_float() == rhs.as_float()
            }
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => same_object(a, b),
            _ => false,
        }
    }

    /// Ordering for `< <= > >=`: lexicographic between strings, numeric when
    /// both sides are numbers or numeric strings. `None` when a float
    /// operand is NaN.
    pub fn compare(
        &self,
        op: InfixOperator,
        lhs: &Value,
        rhs: &Value,
    ) -> EvalResult<Option<Ordering>> {
        if let (Value::String(a), Value::String(b)) = (lhs, rhs) {
            return Ok(Some(a.cmp(b)));
        }
        if lhs.is_null() || rhs.is_null() {
            return Err(illegal_infix(op, lhs, rhs));
        }

        match (self.to_number(lhs)?, self.to_number(rhs)?) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => Ok(Some(a.cmp(&b))),
            (Some(a), Some(b)) => Ok(a.as_f64().partial_cmp(&b.as_f64())),
            _ => Err(illegal_infix(op, lhs, rhs)),
        }
    }

    fn add(&self, lhs: Value, rhs: Value) -> EvalResult<Value> {
        let has_string = matches!(lhs, Value::String(_)) || matches!(rhs, Value::String(_));
        if !has_string {
            return self.numeric_binop(InfixOperator::Add, &lhs, &rhs, i64::checked_add, |a, b| a + b);
        }

        match (parse_number(&lhs), parse_number(&rhs)) {
            (Some(a), Some(b)) => Ok(combine(a, b, i64::checked_add, |a, b| a + b)),
            _ => Ok(Value::String(lhs.render() + &rhs.render())),
        }
    }

    fn divide(&self, op: InfixOperator, lhs: &Value, rhs: &Value) -> EvalResult<Value> {
        let (a, b) = self.numeric_operands(op, lhs, rhs)?;
        let is_modulo = op == InfixOperator::Modulo;

        match (a, b) {
            (Number::Int(_), Number::Int(0)) => Err(EvalError::new(EvalErrorKind::Arithmetic(
                format!("{} by zero", if is_modulo { "modulo" } else { "division" }),
            ))),
            (Number::Int(a), Number::Int(b)) => {
                let result = if is_modulo {
                    a.checked_rem(b)
                } else {
                    a.checked_div(b)
                };
                Ok(result.map_or_else(
                    || Value::Float(float_divide(is_modulo, a as f64, b as f64)),
                    Value::Integer,
                ))
            }
            (a, b) => Ok(Value::Float(float_divide(is_modulo, a.as_f64(), b.as_f64()))),
        }
    }

    fn numeric_binop<I, F>(
        &self,
        op: InfixOperator,
        lhs: &Value,
        rhs: &Value,
        int_op: I,
        float_op: F,
    ) -> EvalResult<Value>
    where
        I: Fn(i64, i64) -> Option<i64>,
        F: Fn(f64, f64) -> f64,
    {
        let (a, b) = self.numeric_operands(op, lhs, rhs)?;
        Ok(combine(a, b, int_op, float_op))
    }

    fn numeric_operands(
        &self,
        op: InfixOperator,
        lhs: &Value,
        rhs: &Value,
    ) -> EvalResult<(Number, Number)> {
        match (self.to_number(lhs)?, self.to_number(rhs)?) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(illegal_infix(op, lhs, rhs)),
        }
    }

    /// Numeric view of an operand. Null counts as zero unless strict.
    fn to_number(&self, value: &Value) -> EvalResult<Option<Number>> {
        match value {
            Value::Null if self.strict => Err(type_error("null operand in strict mode".to_owned())),
            Value::Null => Ok(Some(Number::Int(0))),
            other => Ok(parse_number(other)),
        }
    }
}

fn numbers_equal(a: Number, b: Number) -> bool {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x == y,
        (a, b) => a.as_f64() == b.as_f64(),
    }
}

fn parse_number(value: &Value) -> Option<Number> {
    match value {
        Value::Integer(n) => Some(Number::Int(*n)),
        Value::Float(n) => Some(Number::Float(*n)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Number::Int)
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|n| n.is_finite()).map(Number::Float))
        }
        _ => None,
    }
}

/// Integer result when both operands are integers and the result fits,
/// float otherwise.
fn combine<I, F>(a: Number, b: Number, int_op: I, float_op: F) -> Value
where
    I: Fn(i64, i64) -> Option<i64>,
    F: Fn(f64, f64) -> f64,
{
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => int_op(x, y)
            .map_or_else(|| Value::Float(float_op(x as f64, y as f64)), Value::Integer),
        (a, b) => Number::Float(float_op(a.as_f64(), b.as_f64())).into_value(),
    }
}

fn float_divide(is_modulo: bool, a: f64, b: f64) -> f64 {
    if is_modulo {
        a % b
    } else {
        a / b
    }
}

fn matches_pattern(lhs: &Value, rhs: &Value) -> EvalResult<bool> {
    let pattern = rhs
        .as_str()
        .ok_or_else(|| type_error(format!("pattern must be a string, found {}", rhs.type_name())))?;
    let regex = Regex::new(&format!("^(?:{})$", pattern))
        .map_err(|e| type_error(format!("invalid pattern: {}", e)))?;
    Ok(regex.is_match(&lhs.render()))
}

fn type_error(message: String) -> EvalError {
    EvalError::new(EvalErrorKind::Type(message))
}

fn illegal_infix(op: InfixOperator, lhs: &Value, rhs: &Value) -> EvalError {
    type_error(format!(
        "cannot apply `{}` to {} and {}",
        op.symbol(),
        lhs.type_name(),
        rhs.type_name()
    ))
}

fn illegal_prefix(op: PrefixOperator, value: &Value) -> EvalError {
    type_error(format!("cannot apply `{}` to {}", op.symbol(), value.type_name()))
}
