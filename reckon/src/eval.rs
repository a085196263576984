//! Expression interpreter
//!
//! Walks the AST against an [`EvalContext`]. Every arithmetic result is
//! checked: dividing by zero and producing infinities or NaN are errors,
//! never values.

use crate::ast::{BinOp, Expr, UnaryOp};
use reckon_core::{EvalError, Value};
use reckon_plugin::EvalContext;

/// Stateless tree-walking interpreter
#[derive(Debug, Default, Clone, Copy)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    pub fn eval_expr(&self, expr: &Expr, ctx: &EvalContext) -> Result<Value, EvalError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Text(s) => Ok(Value::Text(s.clone())),
            Expr::Variable(name) => ctx.get_var(name).map(Value::Number),
            Expr::Unary(op, inner) => {
                let v = self.eval_expr(inner, ctx)?;
                self.eval_unary_op(*op, v)
            }
            Expr::Binary(left, op, right) => {
                let l = self.eval_expr(left, ctx)?;
                let r = self.eval_expr(right, ctx)?;
                self.eval_binary_op(l, *op, r)
            }
            Expr::Call(name, args) => {
                let evaluated = args
                    .iter()
                    .map(|a| self.eval_expr(a, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                match ctx.registry.call_function(name, &evaluated, ctx)? {
                    Value::Number(n) => finite(n),
                    other => Ok(other),
                }
            }
        }
    }

    fn eval_binary_op(&self, left: Value, op: BinOp, right: Value) -> Result<Value, EvalError> {
        let l = operand(op.symbol(), "left", &left)?;
        let r = operand(op.symbol(), "right", &right)?;

        match op {
            BinOp::Add => finite(l + r),
            BinOp::Sub => finite(l - r),
            BinOp::Mul => finite(l * r),
            BinOp::Div => {
                if r == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                finite(l / r)
            }
            BinOp::Mod => {
                if r == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                finite(l % r)
            }
            BinOp::Pow => {
                if l == 0.0 && r < 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                if l < 0.0 && r.fract() != 0.0 {
                    return Err(EvalError::domain("negative base with non-integer exponent"));
                }
                finite(l.powf(r))
            }
        }
    }

    fn eval_unary_op(&self, op: UnaryOp, value: Value) -> Result<Value, EvalError> {
        let n = operand(match op { UnaryOp::Neg => "-", UnaryOp::Plus => "+" }, "operand", &value)?;
        match op {
            UnaryOp::Neg => Ok(Value::Number(-n)),
            UnaryOp::Plus => Ok(Value::Number(n)),
        }
    }
}

fn operand(op: &str, side: &str, value: &Value) -> Result<f64, EvalError> {
    value
        .as_number()
        .ok_or_else(|| EvalError::arg_type(op, side, "Number", value.type_name()))
}

fn finite(n: f64) -> Result<Value, EvalError> {
    if n.is_finite() {
        Ok(Value::Number(n))
    } else {
        Err(EvalError::NonFinite)
    }
}
