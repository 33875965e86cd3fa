// ABOUTME: Recursive-descent parser turning one statement's tokens into an expression

use crate::error::{LambdaError, Location};
use crate::expr::{Arg, Expression};
use crate::lexer::{Token, TokenType};

/// A parsed top-level statement: either a `name <- expr` binding or a bare
/// expression to reduce and print.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Binding { name: String, expr: Expression },
    Expr(Expression),
}

/// Parser state that outlives a single statement: the stack of lambda
/// parameter names currently in scope, and whether multi-parameter lambdas
/// (`\a b. e`) are permitted at all.
pub struct ParseContext {
    args: Vec<String>,
    pub multi_args: bool,
}

impl ParseContext {
    pub fn new() -> Self {
        ParseContext {
            args: Vec::new(),
            multi_args: false,
        }
    }

    pub fn with_multi_args(multi_args: bool) -> Self {
        ParseContext {
            args: Vec::new(),
            multi_args,
        }
    }

    fn is_arg(&self, name: &str) -> bool {
        self.args.iter().any(|a| a == name)
    }

    fn push_arg(&mut self, name: String) {
        self.args.push(name);
    }

    fn pop_arg(&mut self) {
        self.args.pop();
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new()
    }
}

struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
}

fn token_type_name(tt: TokenType) -> &'static str {
    match tt {
        TokenType::Dot => "'.'",
        TokenType::Lambda => "'\\'",
        TokenType::Comma => "','",
        TokenType::Arrow => "'<-'",
        TokenType::Variable => "a variable",
        TokenType::Constant => "a constant",
        TokenType::Int => "an integer",
        TokenType::LParen => "'('",
        TokenType::RParen => "')'",
        TokenType::LSquare => "'['",
        TokenType::RSquare => "']'",
        TokenType::Plus => "'+'",
        TokenType::Minus => "'-'",
        TokenType::Star => "'*'",
        TokenType::Slash => "'/'",
        TokenType::Colon => "':'",
    }
}

fn describe_types(types: &[TokenType]) -> String {
    types
        .iter()
        .map(|t| token_type_name(*t))
        .collect::<Vec<_>>()
        .join(" or ")
}

fn op_char(tt: TokenType) -> char {
    match tt {
        TokenType::Plus => '+',
        TokenType::Minus => '-',
        TokenType::Star => '*',
        TokenType::Slash => '/',
        TokenType::Colon => ':',
        _ => unreachable!("only binary-operator tokens are passed here"),
    }
}

impl<'a> TokenStream<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        TokenStream { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_type(&self) -> Option<TokenType> {
        self.peek().map(|t| t.token_type)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn here(&self) -> Location {
        match self.peek() {
            Some(t) => t.location(),
            None => self
                .tokens
                .last()
                .map(|t| t.location())
                .unwrap_or_else(|| Location::new(1, 1)),
        }
    }

    fn expect(&mut self, types: &[TokenType]) -> Result<Token, LambdaError> {
        match self.peek() {
            Some(t) if types.contains(&t.token_type) => Ok(self.advance()),
            Some(t) => Err(LambdaError::expected(
                t.location(),
                &describe_types(types),
                &t.source,
            )),
            None => Err(LambdaError::expected(
                self.here(),
                &describe_types(types),
                "end of input",
            )),
        }
    }
}

const JUXTAPOSITION_STOPS: &[TokenType] = &[
    TokenType::RParen,
    TokenType::RSquare,
    TokenType::Comma,
    TokenType::Dot,
    TokenType::Arrow,
    TokenType::Plus,
    TokenType::Minus,
    TokenType::Star,
    TokenType::Slash,
    TokenType::Colon,
];

const BINARY_OPS: &[TokenType] = &[
    TokenType::Plus,
    TokenType::Minus,
    TokenType::Star,
    TokenType::Slash,
    TokenType::Colon,
];

fn parse_function(stream: &mut TokenStream, ctx: &mut ParseContext) -> Result<Expression, LambdaError> {
    let lambda_tok = stream.expect(&[TokenType::Lambda])?;

    let first = stream.expect(&[TokenType::Variable])?;
    let mut params = vec![Arg {
        name: first.source.clone(),
        token: first.clone(),
    }];
    ctx.push_arg(first.source.clone());

    loop {
        if matches!(stream.peek_type(), Some(TokenType::Dot)) {
            stream.advance();
            break;
        }
        if !ctx.multi_args {
            return Err(LambdaError::syntax(
                stream.here(),
                "multiple lambda parameters require multi-arg support to be enabled",
            ));
        }
        let var_tok = stream.expect(&[TokenType::Variable])?;
        params.push(Arg {
            name: var_tok.source.clone(),
            token: var_tok.clone(),
        });
        ctx.push_arg(var_tok.source.clone());
    }

    let body = parse_expression(stream, ctx)?;
    for _ in &params {
        ctx.pop_arg();
    }

    let mut body_opt = Some(body);
    let mut func: Option<Expression> = None;
    while let Some(param) = params.pop() {
        let inner = match func.take() {
            Some(f) => f,
            None => body_opt.take().expect("body consumed exactly once"),
        };
        func = Some(Expression::Function {
            argument: param,
            body: Box::new(inner),
            token: lambda_tok.clone(),
        });
    }
    Ok(func.expect("at least one parameter was parsed"))
}

fn parse_list(stream: &mut TokenStream, ctx: &mut ParseContext, open: Token) -> Result<Expression, LambdaError> {
    if matches!(stream.peek_type(), Some(TokenType::RSquare)) {
        stream.advance();
        return Ok(Expression::List {
            items: Vec::new(),
            token: open,
        });
    }

    let mut items = vec![parse_expression(stream, ctx)?];
    while matches!(stream.peek_type(), Some(TokenType::Comma)) {
        stream.advance();
        items.push(parse_expression(stream, ctx)?);
    }
    stream.expect(&[TokenType::RSquare])?;
    Ok(Expression::List { items, token: open })
}

fn parse_primary(stream: &mut TokenStream, ctx: &mut ParseContext) -> Result<Expression, LambdaError> {
    let Some(tok) = stream.peek() else {
        return Err(LambdaError::expected(stream.here(), "an expression", "end of input"));
    };

    match tok.token_type {
        TokenType::Lambda => parse_function(stream, ctx),

        TokenType::Variable => {
            let tok = stream.advance();
            if ctx.is_arg(&tok.source) {
                Ok(Expression::Argument {
                    name: tok.source.clone(),
                    token: tok,
                })
            } else {
                Ok(Expression::Variable {
                    name: tok.source.clone(),
                    token: tok,
                })
            }
        }

        TokenType::Int => {
            let tok = stream.advance();
            let value: i64 = tok.source.parse().map_err(|_| {
                LambdaError::syntax(tok.location(), format!("invalid integer literal '{}'", tok.source))
            })?;
            Ok(Expression::Integer { value, token: tok })
        }

        TokenType::Minus => {
            let minus_tok = stream.advance();
            if matches!(stream.peek_type(), Some(TokenType::Int)) {
                let int_tok = stream.advance();
                let value: i64 = int_tok.source.parse().map_err(|_| {
                    LambdaError::syntax(int_tok.location(), format!("invalid integer literal '{}'", int_tok.source))
                })?;
                Ok(Expression::Integer { value: -value, token: int_tok })
            } else {
                let argument = parse_unit(stream, ctx, true)?;
                Ok(Expression::UnaryOp {
                    op: '-',
                    argument: Box::new(argument),
                    token: minus_tok,
                })
            }
        }

        TokenType::LParen => {
            stream.advance();
            let inner = parse_expression(stream, ctx)?;
            stream.expect(&[TokenType::RParen])?;
            Ok(inner)
        }

        TokenType::LSquare => {
            let open = stream.advance();
            parse_list(stream, ctx, open)
        }

        _ => Err(LambdaError::expected(tok.location(), "an expression", &tok.source)),
    }
}

/// Parse one unit; when `allow_args` is set, also consume any juxtaposed
/// units as left-associative function applications (`f x y` = `(f x) y`).
/// Juxtaposition only happens at the outermost unit of an expression: a unit
/// parsed as an application's argument is parsed with `allow_args = false`.
fn parse_unit(stream: &mut TokenStream, ctx: &mut ParseContext, allow_args: bool) -> Result<Expression, LambdaError> {
    let mut expr = parse_primary(stream, ctx)?;

    if allow_args {
        loop {
            if stream.eof() {
                break;
            }
            if let Some(tt) = stream.peek_type() {
                if JUXTAPOSITION_STOPS.contains(&tt) {
                    break;
                }
            }
            let argument = parse_unit(stream, ctx, false)?;
            expr = expr.apply_argument(argument);
        }
    }

    Ok(expr)
}

/// Parse a full expression: a unit (with trailing applications), optionally
/// followed by a binary operator and a right-hand expression. Binary
/// operators are right-associative by construction (the RHS is itself a
/// full `parse_expression`).
fn parse_expression(stream: &mut TokenStream, ctx: &mut ParseContext) -> Result<Expression, LambdaError> {
    let lhs = parse_unit(stream, ctx, true)?;

    match stream.peek_type() {
        None => Ok(lhs),
        Some(TokenType::RParen) | Some(TokenType::RSquare) | Some(TokenType::Comma) => Ok(lhs),
        Some(tt) if BINARY_OPS.contains(&tt) => {
            let op_tok = stream.advance();
            let rhs = parse_expression(stream, ctx)?;
            Ok(Expression::BinaryOp {
                op: op_char(tt),
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                token: op_tok,
            })
        }
        Some(_) => {
            let tok = stream.peek().unwrap();
            Err(LambdaError::expected(tok.location(), "an operator or end of statement", &tok.source))
        }
    }
}

/// Parse one statement's tokens. Recognizes the `name <- expr` binding form
/// by looking for `Variable Arrow` at the very start; anything else is parsed
/// as a bare expression. Fails if tokens remain once the statement's grammar
/// production is exhausted.
pub fn parse(tokens: &[Token], ctx: &mut ParseContext) -> Result<Statement, LambdaError> {
    let mut stream = TokenStream::new(tokens);

    let is_binding = matches!(tokens.first().map(|t| t.token_type), Some(TokenType::Variable))
        && matches!(tokens.get(1).map(|t| t.token_type), Some(TokenType::Arrow));

    let statement = if is_binding {
        let name_tok = stream.advance();
        stream.advance();
        let expr = parse_expression(&mut stream, ctx)?;
        Statement::Binding { name: name_tok.source, expr }
    } else {
        Statement::Expr(parse_expression(&mut stream, ctx)?)
    };

    if !stream.eof() {
        let tok = stream.peek().unwrap();
        return Err(LambdaError::expected(tok.location(), "end of statement", &tok.source));
    }

    Ok(statement)
}
