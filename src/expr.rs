// ABOUTME: The expression tree and substitution rules at the heart of the reducer

use crate::lexer::Token;
use std::fmt;

/// A lambda parameter name, distinguished syntactically from a free `Variable`
/// by whether it was in scope (the parser's argument stack) at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    pub name: String,
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Integer {
        value: i64,
        token: Token,
    },
    /// A name that was free (not a lambda parameter in scope) when parsed.
    Variable {
        name: String,
        token: Token,
    },
    /// A name that referred to an enclosing lambda's parameter when parsed.
    Argument {
        name: String,
        token: Token,
    },
    Function {
        argument: Arg,
        body: Box<Expression>,
        token: Token,
    },
    Application {
        target: Box<Expression>,
        value: Box<Expression>,
    },
    UnaryOp {
        op: char,
        argument: Box<Expression>,
        token: Token,
    },
    BinaryOp {
        op: char,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
        token: Token,
    },
    List {
        items: Vec<Expression>,
        token: Token,
    },
}

impl Expression {
    /// Build the application of `self` to `argument`, left-associating juxtaposition.
    pub fn apply_argument(self, argument: Expression) -> Expression {
        Expression::Application {
            target: Box::new(self),
            value: Box::new(argument),
        }
    }

    /// Non-capture-avoiding substitution of a free variable named `old` by `new`.
    ///
    /// `Function` bodies are only descended into when `old` does not name the
    /// function's own parameter: a nested binder of the same name shadows the
    /// outer one and the substitution stops there, exactly as the reference
    /// interpreter this behavior is modeled on does. No renaming is performed,
    /// so a substitution that introduces a name already bound nearby can change
    /// which binder a variable refers to; this is accepted, not a defect.
    pub fn substitute(&self, old: &str, new: &Expression) -> Expression {
        match self {
            Expression::Integer { .. } => self.clone(),
            Expression::Variable { .. } => self.clone(),
            Expression::Argument { name, .. } => {
                if name == old {
                    new.clone()
                } else {
                    self.clone()
                }
            }
            Expression::Function { argument, body, token } => {
                if argument.name == old {
                    self.clone()
                } else {
                    Expression::Function {
                        argument: argument.clone(),
                        body: Box::new(body.substitute(old, new)),
                        token: token.clone(),
                    }
                }
            }
            Expression::Application { target, value } => Expression::Application {
                target: Box::new(target.substitute(old, new)),
                value: Box::new(value.substitute(old, new)),
            },
            Expression::UnaryOp { op, argument, token } => Expression::UnaryOp {
                op: *op,
                argument: Box::new(argument.substitute(old, new)),
                token: token.clone(),
            },
            Expression::BinaryOp { op, lhs, rhs, token } => Expression::BinaryOp {
                op: *op,
                lhs: Box::new(lhs.substitute(old, new)),
                rhs: Box::new(rhs.substitute(old, new)),
                token: token.clone(),
            },
            Expression::List { items, token } => Expression::List {
                items: items.iter().map(|item| item.substitute(old, new)).collect(),
                token: token.clone(),
            },
        }
    }

    /// Apply a `Function`'s body substitution for one call: replace its parameter
    /// with `argument` throughout the body (subject to the shadowing rule above).
    pub fn substitute_argument(&self, argument: &Expression) -> Expression {
        match self {
            Expression::Function { argument: param, body, .. } => {
                body.substitute(&param.name, argument)
            }
            other => other.clone(),
        }
    }

    pub fn token(&self) -> &Token {
        match self {
            Expression::Integer { token, .. }
            | Expression::Variable { token, .. }
            | Expression::Argument { token, .. }
            | Expression::Function { token, .. }
            | Expression::UnaryOp { token, .. }
            | Expression::BinaryOp { token, .. }
            | Expression::List { token, .. } => token,
            Expression::Application { target, .. } => target.token(),
        }
    }
}

/// Mirrors the printing contract: a variable, argument, list, or non-negative
/// integer prints bare; everything else is wrapped in parentheses unless its
/// own rendering already starts with one.
fn bracket_str(e: &Expression) -> String {
    match e {
        Expression::Variable { .. } | Expression::Argument { .. } | Expression::List { .. } => {
            e.to_string()
        }
        Expression::Integer { value, .. } if *value >= 0 => e.to_string(),
        _ => {
            let s = e.to_string();
            if s.starts_with('(') {
                s
            } else {
                format!("({s})")
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Integer { value, .. } => write!(f, "{value}"),
            Expression::Variable { name, .. } => write!(f, "{name}"),
            Expression::Argument { name, .. } => write!(f, "{name}"),
            Expression::Function { argument, body, .. } => {
                write!(f, "(\\{}. {})", argument.name, body)
            }
            Expression::Application { target, value } => {
                write!(f, "({} {})", bracket_str(target), bracket_str(value))
            }
            Expression::UnaryOp { op, argument, .. } => {
                write!(f, "{op}{}", bracket_str(argument))
            }
            Expression::BinaryOp { op, lhs, rhs, .. } => {
                write!(f, "{} {op} {}", bracket_str(lhs), bracket_str(rhs))
            }
            Expression::List { items, .. } => {
                let rendered: Vec<String> = items.iter().map(|item| item.to_string()).collect();
                write!(f, "[{}]", rendered.join(","))
            }
        }
    }
}
