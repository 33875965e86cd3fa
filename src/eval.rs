// ABOUTME: The reducer: atomicity checks and single/full-step evaluation

use crate::env::Bound;
use crate::error::LambdaError;
use crate::expr::Expression;

/// Parameters controlling how far and how aggressively reduction proceeds.
#[derive(Debug, Clone)]
pub struct EvalContext {
    pub bound: Bound,
    /// When false, unary/binary operators are left unevaluated even if their
    /// operands are concrete.
    pub eval_ops: bool,
    /// When true, `evaluate` performs a single reduction step instead of
    /// reducing until no further step is possible.
    pub eval_step: bool,
    /// When true, a free variable or a non-callable application target is an
    /// error; when false, such expressions are returned unchanged.
    pub force_eval: bool,
}

impl Default for EvalContext {
    fn default() -> Self {
        EvalContext {
            bound: Bound::new(),
            eval_ops: true,
            eval_step: false,
            force_eval: true,
        }
    }
}

/// True floor division, rounding toward negative infinity (matching `//` in
/// the reference interpreter this was modeled on). `i64::div_euclid` is not
/// equivalent: it rounds toward zero for negative divisors, not toward
/// negative infinity, so it cannot be substituted here.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if (r != 0) && ((r < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

/// Whether further reduction could still change `expr`'s shape.
pub fn is_atomic(expr: &Expression, ctx: &EvalContext) -> bool {
    match expr {
        Expression::Integer { .. } => true,
        Expression::Argument { .. } => true,
        Expression::Function { .. } => true,
        Expression::Variable { name, .. } => !ctx.bound.contains(name),
        Expression::List { items, .. } => items.iter().all(|item| is_atomic(item, ctx)),
        Expression::UnaryOp { op, argument, .. } => {
            is_atomic(argument, ctx) && !unary_applies(*op, argument)
        }
        Expression::BinaryOp { op, lhs, rhs, .. } => {
            is_atomic(lhs, ctx) && is_atomic(rhs, ctx) && !binary_applies(*op, lhs, rhs)
        }
        Expression::Application { target, value } => {
            is_atomic(target, ctx) && is_atomic(value, ctx) && !matches!(**target, Expression::Function { .. })
        }
    }
}

fn unary_applies(op: char, argument: &Expression) -> bool {
    op == '-' && matches!(argument, Expression::Integer { .. })
}

fn binary_applies(op: char, lhs: &Expression, rhs: &Expression) -> bool {
    matches!(op, '+' | '-' | '*' | '/')
        && matches!(lhs, Expression::Integer { .. })
        && matches!(rhs, Expression::Integer { .. })
}

/// Reduce `expr` one step (`ctx.eval_step`) or fully (default), per `ctx`.
///
/// `Variable` operands of a `List`, `UnaryOp`, or `BinaryOp` are always routed
/// through `evaluate` regardless of their own atomicity, even though a bare
/// free `Variable` reports itself atomic. This mirrors the reference
/// interpreter's own evaluation order and is why a statement's outermost
/// expression still gets one unconditional `evaluate` call before the
/// atomicity loop begins (see the driver in `main`).
pub fn evaluate(expr: &Expression, ctx: &EvalContext) -> Result<Expression, LambdaError> {
    match expr {
        Expression::Integer { .. } | Expression::Argument { .. } | Expression::Function { .. } => {
            Ok(expr.clone())
        }

        Expression::Variable { name, token } => {
            if let Some(value) = ctx.bound.get(name) {
                if ctx.eval_step {
                    Ok(value.clone())
                } else {
                    evaluate(value, ctx)
                }
            } else if ctx.force_eval {
                Err(LambdaError::name(
                    token.location(),
                    format!("name '{name}' is not bound"),
                ))
            } else {
                Ok(expr.clone())
            }
        }

        Expression::List { items, token } => {
            let mut evaluated = Vec::with_capacity(items.len());
            for item in items {
                let reduced = if is_atomic(item, ctx) && !matches!(item, Expression::Variable { .. }) {
                    item.clone()
                } else {
                    evaluate(item, ctx)?
                };
                let progressed = reduced != *item;
                evaluated.push(reduced);
                if ctx.eval_step && progressed {
                    evaluated.extend(items[evaluated.len()..].iter().cloned());
                    return Ok(Expression::List {
                        items: evaluated,
                        token: token.clone(),
                    });
                }
            }
            Ok(Expression::List {
                items: evaluated,
                token: token.clone(),
            })
        }

        Expression::UnaryOp { op, argument, token } => {
            let reduced_argument = if is_atomic(argument, ctx)
                && !matches!(**argument, Expression::Variable { .. })
            {
                (**argument).clone()
            } else {
                let stepped = evaluate(argument, ctx)?;
                if ctx.eval_step {
                    return Ok(Expression::UnaryOp {
                        op: *op,
                        argument: Box::new(stepped),
                        token: token.clone(),
                    });
                }
                stepped
            };

            if !ctx.eval_ops {
                return Ok(Expression::UnaryOp {
                    op: *op,
                    argument: Box::new(reduced_argument),
                    token: token.clone(),
                });
            }

            match (*op, &reduced_argument) {
                ('-', Expression::Integer { value, token: int_tok }) => Ok(Expression::Integer {
                    value: -value,
                    token: int_tok.clone(),
                }),
                _ if ctx.force_eval => Err(LambdaError::type_error(
                    token.location(),
                    format!("operator '{op}' is not defined for this operand"),
                )),
                _ => Ok(Expression::UnaryOp {
                    op: *op,
                    argument: Box::new(reduced_argument),
                    token: token.clone(),
                }),
            }
        }

        Expression::BinaryOp { op, lhs, rhs, token } => {
            let reduce_operand = |operand: &Expression| -> Result<(Expression, bool), LambdaError> {
                if is_atomic(operand, ctx) && !matches!(operand, Expression::Variable { .. }) {
                    Ok((operand.clone(), false))
                } else {
                    Ok((evaluate(operand, ctx)?, true))
                }
            };

            let (reduced_lhs, lhs_progressed) = reduce_operand(lhs)?;
            if ctx.eval_step && lhs_progressed {
                return Ok(Expression::BinaryOp {
                    op: *op,
                    lhs: Box::new(reduced_lhs),
                    rhs: rhs.clone(),
                    token: token.clone(),
                });
            }

            let (reduced_rhs, rhs_progressed) = reduce_operand(rhs)?;
            if ctx.eval_step && rhs_progressed {
                return Ok(Expression::BinaryOp {
                    op: *op,
                    lhs: Box::new(reduced_lhs),
                    rhs: Box::new(reduced_rhs),
                    token: token.clone(),
                });
            }

            if !ctx.eval_ops {
                return Ok(Expression::BinaryOp {
                    op: *op,
                    lhs: Box::new(reduced_lhs),
                    rhs: Box::new(reduced_rhs),
                    token: token.clone(),
                });
            }

            match (*op, &reduced_lhs, &reduced_rhs) {
                ('+', Expression::Integer { value: a, .. }, Expression::Integer { value: b, .. }) => {
                    Ok(Expression::Integer { value: a + b, token: token.clone() })
                }
                ('-', Expression::Integer { value: a, .. }, Expression::Integer { value: b, .. }) => {
                    Ok(Expression::Integer { value: a - b, token: token.clone() })
                }
                ('*', Expression::Integer { value: a, .. }, Expression::Integer { value: b, .. }) => {
                    Ok(Expression::Integer { value: a * b, token: token.clone() })
                }
                ('/', Expression::Integer { value: a, .. }, Expression::Integer { value: b, .. }) => {
                    if *b == 0 {
                        Err(LambdaError::value(token.location(), "division by zero"))
                    } else {
                        Ok(Expression::Integer { value: floor_div(*a, *b), token: token.clone() })
                    }
                }
                _ if ctx.force_eval => Err(LambdaError::type_error(
                    token.location(),
                    format!("operator '{op}' is not defined for these operands"),
                )),
                _ => Ok(Expression::BinaryOp {
                    op: *op,
                    lhs: Box::new(reduced_lhs),
                    rhs: Box::new(reduced_rhs),
                    token: token.clone(),
                }),
            }
        }

        Expression::Application { target, value } => {
            let reduced_target = if is_atomic(target, ctx) {
                (**target).clone()
            } else {
                let stepped = evaluate(target, ctx)?;
                if ctx.eval_step {
                    return Ok(Expression::Application {
                        target: Box::new(stepped),
                        value: value.clone(),
                    });
                }
                stepped
            };

            let reduced_value = if is_atomic(value, ctx) {
                (**value).clone()
            } else {
                let stepped = evaluate(value, ctx)?;
                if ctx.eval_step {
                    return Ok(Expression::Application {
                        target: Box::new(reduced_target),
                        value: Box::new(stepped),
                    });
                }
                stepped
            };

            if let Expression::Function { .. } = &reduced_target {
                let substituted = reduced_target.substitute_argument(&reduced_value);
                if ctx.eval_step {
                    Ok(substituted)
                } else {
                    evaluate(&substituted, ctx)
                }
            } else if ctx.force_eval {
                Err(LambdaError::value(
                    reduced_target.token().location(),
                    format!("'{reduced_target}' is not applicable"),
                ))
            } else {
                Ok(Expression::Application {
                    target: Box::new(reduced_target),
                    value: Box::new(reduced_value),
                })
            }
        }
    }
}
