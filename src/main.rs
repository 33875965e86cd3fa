mod config;
mod env;
mod error;
mod eval;
mod expr;
mod lexer;
mod parser;

use clap::Parser;
use env::Bound;
use error::LambdaError;
use eval::{evaluate, is_atomic, EvalContext};
use expr::Expression;
use lexer::lex;
use parser::{parse, ParseContext, Statement};
use std::path::PathBuf;

/// A small lambda calculus interpreter with integer arithmetic and lists
#[derive(Parser, Debug)]
#[command(name = "lambda-calc")]
#[command(version = config::VERSION)]
#[command(about = "A small lambda calculus interpreter with integer arithmetic and lists")]
struct CliArgs {
    /// Source file to execute
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Print the parsed form of each statement before its result
    #[arg(long = "output-raw")]
    output_raw: bool,

    /// Leave free variables and non-callable applications unreduced instead of erroring
    #[arg(long = "no-force-eval")]
    no_force_eval: bool,

    /// Leave arithmetic and list operators unevaluated
    #[arg(long = "no-eval-ops")]
    no_eval_ops: bool,

    /// Print every individual reduction step instead of only the final form
    #[arg(long = "eval-step")]
    eval_step: bool,

    /// Allow lambdas to take more than one parameter (`\a b. e`)
    #[arg(long = "allow-multi-args")]
    allow_multi_args: bool,
}

const KNOWN_FLAGS: &[&str] = &[
    "--output-raw",
    "--no-force-eval",
    "--no-eval-ops",
    "--eval-step",
    "--allow-multi-args",
];

/// clap's derived `ArgAction::SetTrue` silently tolerates a flag being passed
/// more than once; the CLI contract requires that to be a usage error, so the
/// raw argv is checked for repeats before clap ever sees it.
fn check_no_duplicate_flags(raw_args: &[String]) -> Result<(), LambdaError> {
    let mut seen: Vec<&str> = Vec::new();
    for arg in raw_args {
        if KNOWN_FLAGS.contains(&arg.as_str()) {
            if seen.contains(&arg.as_str()) {
                return Err(LambdaError::usage(format!("flag '{arg}' specified more than once")));
            }
            seen.push(arg.as_str());
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    check_no_duplicate_flags(&raw_args)?;
    let args = CliArgs::parse();
    run(&args)?;
    Ok(())
}

fn run(args: &CliArgs) -> Result<(), LambdaError> {
    let source = std::fs::read_to_string(&args.file).map_err(|e| {
        LambdaError::usage(format!("cannot read file {}: {e}", args.file.display()))
    })?;

    let statements = lex(&source)?;
    let multi_statement = statements.len() > 1;

    let mut pctx = ParseContext::with_multi_args(args.allow_multi_args);
    let mut ctx = EvalContext {
        bound: Bound::new(),
        eval_ops: !args.no_eval_ops,
        eval_step: args.eval_step,
        force_eval: !args.no_force_eval,
    };

    for (index, tokens) in statements.iter().enumerate() {
        match parse(tokens, &mut pctx)? {
            Statement::Binding { name, expr } => {
                let at = expr.token().location();
                ctx.bound.insert(name, expr, at)?;
            }
            Statement::Expr(expr) => {
                if multi_statement {
                    println!("*** Statement #{}", index + 1);
                }
                run_statement(&expr, &ctx, args.output_raw)?;
            }
        }
    }

    Ok(())
}

/// Drive one statement's expression to a fixed point under `ctx`, printing the
/// transcript required by `output_raw`/`ctx.eval_step`.
fn run_statement(expr: &Expression, ctx: &EvalContext, output_raw: bool) -> Result<(), LambdaError> {
    let show_raw = output_raw || ctx.eval_step;
    if show_raw {
        println!("{}", strip_outer_parens_once(&expr.to_string()));
    }

    let mut current = expr.clone();
    if ctx.eval_step {
        loop {
            current = evaluate(&current, ctx)?;
            println!(" -> {}", strip_outer_parens_once(&current.to_string()));
            if is_atomic(&current, ctx) {
                break;
            }
        }
        return Ok(());
    }

    loop {
        current = evaluate(&current, ctx)?;
        if is_atomic(&current, ctx) {
            break;
        }
    }

    let rendered = strip_outer_parens_once(&current.to_string());
    if show_raw {
        println!(" -> {rendered}");
    } else {
        println!("{rendered}");
    }
    Ok(())
}

/// Strip a single matching outer pair of parentheses, if the whole string is
/// wrapped in exactly one. Unlike a repeated strip, this only ever removes
/// the one layer the printing contract calls for.
fn strip_outer_parens_once(s: &str) -> String {
    if !s.starts_with('(') || !s.ends_with(')') {
        return s.to_string();
    }

    let mut depth = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return if i == s.len() - 1 {
                        s[1..s.len() - 1].to_string()
                    } else {
                        s.to_string()
                    };
                }
            }
            _ => {}
        }
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_outer_parens_once_removes_single_pair() {
        assert_eq!(strip_outer_parens_once("(\\x. x + 1) 4"), "(\\x. x + 1) 4");
        assert_eq!(strip_outer_parens_once("((\\x. x + 1) 4)"), "(\\x. x + 1) 4");
    }

    #[test]
    fn test_strip_outer_parens_once_leaves_bare_atom() {
        assert_eq!(strip_outer_parens_once("5"), "5");
    }

    #[test]
    fn test_strip_outer_parens_once_leaves_sibling_groups() {
        assert_eq!(strip_outer_parens_once("(a)(b)"), "(a)(b)");
    }

    #[test]
    fn test_strip_outer_parens_once_does_not_strip_twice() {
        assert_eq!(strip_outer_parens_once("((5))"), "(5)");
    }

    #[test]
    fn test_duplicate_flag_is_usage_error() {
        let args: Vec<String> = vec!["--output-raw".into(), "--output-raw".into()];
        let err = check_no_duplicate_flags(&args).unwrap_err();
        assert!(matches!(err, LambdaError::UsageError { .. }));
    }

    #[test]
    fn test_distinct_flags_are_accepted() {
        let args: Vec<String> = vec!["--output-raw".into(), "--eval-step".into()];
        assert!(check_no_duplicate_flags(&args).is_ok());
    }
}
