// ABOUTME: End-to-end tests driving the lex -> parse -> evaluate pipeline

use lambda_calc::env::Bound;
use lambda_calc::error::{LambdaError, Location};
use lambda_calc::eval::{evaluate, is_atomic, EvalContext};
use lambda_calc::expr::Expression;
use lambda_calc::lexer::lex;
use lambda_calc::parser::{parse, ParseContext, Statement};

/// Run one statement of source to a fixed point under the default context and
/// return its final rendered form.
fn run(source: &str) -> String {
    let statements = lex(source).expect("lex failed");
    let mut pctx = ParseContext::new();
    let mut ctx = EvalContext::default();

    let mut last = None;
    for tokens in &statements {
        match parse(tokens, &mut pctx).expect("parse failed") {
            Statement::Binding { name, expr } => {
                let at = expr.token().location();
                ctx.bound.insert(name, expr, at).expect("bind failed");
            }
            Statement::Expr(expr) => {
                let mut current = expr;
                loop {
                    current = evaluate(&current, &ctx).expect("eval failed");
                    if is_atomic(&current, &ctx) {
                        break;
                    }
                }
                last = Some(current.to_string());
            }
        }
    }
    last.expect("source had no expression statement")
}

#[test]
fn test_beta_reduction_with_successor() {
    assert_eq!(run(r"(\x. x + 1) 4"), "5");
}

#[test]
fn test_constant_function_discards_second_argument() {
    assert_eq!(run(r"(\x. \y. x) 1 2"), "1");
}

#[test]
fn test_church_numeral_two_applications() {
    assert_eq!(run(r"(\f. \x. f (f x)) (\n. n + 1) 0"), "2");
}

#[test]
fn test_list_literal_renders_without_spaces() {
    assert_eq!(run("[1, 2, 3]"), "[1,2,3]");
}

#[test]
fn test_binding_then_application_in_later_statement() {
    assert_eq!(run("sq <- \\x. x * x\nsq 5"), "25");
}

/// Same as `run`, but evaluates under `--no-force-eval` so a free variable
/// left over after substitution is returned as-is instead of raising a
/// `NameError`.
fn run_lenient(source: &str) -> String {
    let statements = lex(source).expect("lex failed");
    let mut pctx = ParseContext::new();
    let mut ctx = EvalContext {
        force_eval: false,
        ..EvalContext::default()
    };

    let mut last = None;
    for tokens in &statements {
        match parse(tokens, &mut pctx).expect("parse failed") {
            Statement::Binding { name, expr } => {
                let at = expr.token().location();
                ctx.bound.insert(name, expr, at).expect("bind failed");
            }
            Statement::Expr(expr) => {
                let mut current = expr;
                loop {
                    current = evaluate(&current, &ctx).expect("eval failed");
                    if is_atomic(&current, &ctx) {
                        break;
                    }
                }
                last = Some(current.to_string());
            }
        }
    }
    last.expect("source had no expression statement")
}

#[test]
fn test_shadowing_inner_lambda_wins() {
    assert_eq!(run_lenient(r"(\x. x) y"), "y");
    assert_eq!(run_lenient(r"(\x. \x. x) a b"), "b");
}

#[test]
fn test_floor_division_rounds_down() {
    assert_eq!(run("-7 / 2"), "-4");
    assert_eq!(run("7 / 2"), "3");
}

#[test]
fn test_binding_isolation_rejects_rebinding() {
    let statements = lex("a <- 1\nb <- a + 1\na <- 2").unwrap();
    let mut pctx = ParseContext::new();
    let mut ctx = EvalContext::default();

    for (i, tokens) in statements.iter().enumerate() {
        let statement = parse(tokens, &mut pctx).unwrap();
        match statement {
            Statement::Binding { name, expr } => {
                let at = expr.token().location();
                let result = ctx.bound.insert(name, expr, at);
                if i == 2 {
                    assert!(matches!(result, Err(LambdaError::NameError { .. })));
                    return;
                }
                result.unwrap();
            }
            Statement::Expr(_) => panic!("expected a binding"),
        }
    }
    panic!("rebinding of 'a' should have failed");
}

#[test]
fn test_binding_isolation_values_after_full_reduction() {
    let statements = lex("a <- 1\nb <- a + 1").unwrap();
    let mut pctx = ParseContext::new();
    let mut ctx = EvalContext::default();

    for tokens in &statements {
        match parse(tokens, &mut pctx).unwrap() {
            Statement::Binding { name, expr } => {
                let at = expr.token().location();
                ctx.bound.insert(name, expr, at).unwrap();
            }
            Statement::Expr(_) => panic!("expected a binding"),
        }
    }

    let b = ctx.bound.get("b").unwrap().clone();
    let reduced = evaluate(&b, &ctx).unwrap();
    assert_eq!(reduced, Expression::Integer { value: 2, token: reduced.token().clone() });
}

#[test]
fn test_unbalanced_brackets_reported_as_syntax_error() {
    let err = lex("(x").unwrap_err();
    assert!(matches!(err, LambdaError::SyntaxError { .. }));
}

#[test]
fn test_free_variable_under_force_eval_is_name_error() {
    let statements = lex("z").unwrap();
    let mut pctx = ParseContext::new();
    let expr = match parse(&statements[0], &mut pctx).unwrap() {
        Statement::Expr(e) => e,
        Statement::Binding { .. } => unreachable!(),
    };
    let ctx = EvalContext::default();
    let err = evaluate(&expr, &ctx).unwrap_err();
    assert!(matches!(err, LambdaError::NameError { .. }));
}

#[test]
fn test_eval_step_reaches_same_fixed_point_as_big_step() {
    let source = r"(\f. \x. f (f x)) (\n. n + 1) 0";

    let statements = lex(source).unwrap();
    let mut pctx = ParseContext::new();
    let expr = match parse(&statements[0], &mut pctx).unwrap() {
        Statement::Expr(e) => e,
        Statement::Binding { .. } => unreachable!(),
    };

    let big_step_ctx = EvalContext::default();
    let mut big = expr.clone();
    loop {
        big = evaluate(&big, &big_step_ctx).unwrap();
        if is_atomic(&big, &big_step_ctx) {
            break;
        }
    }

    let step_ctx = EvalContext { eval_step: true, ..EvalContext::default() };
    let mut small = expr;
    let mut steps = 0;
    loop {
        small = evaluate(&small, &step_ctx).unwrap();
        steps += 1;
        assert!(steps < 1000, "did not converge");
        if is_atomic(&small, &big_step_ctx) {
            break;
        }
    }

    assert_eq!(big, small);
}

#[test]
fn test_bound_struct_directly() {
    let mut bound = Bound::new();
    let five = Expression::Integer {
        value: 5,
        token: lambda_calc::lexer::Token {
            source: "5".into(),
            token_type: lambda_calc::lexer::TokenType::Int,
            line: 1,
            col: 1,
        },
    };
    bound.insert("x".into(), five, Location::new(1, 1)).unwrap();
    assert!(bound.contains("x"));
}
