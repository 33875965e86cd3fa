// ABOUTME: Lexer module turning source text into per-statement token lists

use crate::error::{LambdaError, Location};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Dot,
    Lambda,
    Comma,
    Arrow,
    Variable,
    /// Reserved for future symbolic constants; the lexer never currently produces one.
    Constant,
    Int,
    LParen,
    RParen,
    LSquare,
    RSquare,
    Plus,
    Minus,
    Star,
    Slash,
    Colon,
}

/// A single lexeme together with its source location. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub source: String,
    pub token_type: TokenType,
    pub line: usize,
    pub col: usize,
}

impl Token {
    fn new(source: impl Into<String>, token_type: TokenType, line: usize, col: usize) -> Self {
        Token {
            source: source.into(),
            token_type,
            line,
            col,
        }
    }

    pub fn location(&self) -> Location {
        Location::new(self.line, self.col)
    }
}

/// Multi-character symbols are listed before any symbol they prefix, so the longest
/// match wins (`<-` must be tried before a lone `-`).
const SYMBOLS: &[(&str, TokenType)] = &[
    ("<-", TokenType::Arrow),
    (".", TokenType::Dot),
    ("\\", TokenType::Lambda),
    (",", TokenType::Comma),
    ("(", TokenType::LParen),
    (")", TokenType::RParen),
    ("[", TokenType::LSquare),
    ("]", TokenType::RSquare),
    ("+", TokenType::Plus),
    ("-", TokenType::Minus),
    ("*", TokenType::Star),
    ("/", TokenType::Slash),
    (":", TokenType::Colon),
];

fn expected_closer(opener: TokenType) -> TokenType {
    match opener {
        TokenType::LParen => TokenType::RParen,
        TokenType::LSquare => TokenType::RSquare,
        _ => unreachable!("only brackets are pushed onto the bracket stack"),
    }
}

fn bracket_name(token_type: TokenType) -> &'static str {
    match token_type {
        TokenType::LParen => "(",
        TokenType::RParen => ")",
        TokenType::LSquare => "[",
        TokenType::RSquare => "]",
        _ => unreachable!(),
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    statements: Vec<Vec<Token>>,
    current: Vec<Token>,
    brackets: Vec<TokenType>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            statements: Vec::new(),
            current: Vec::new(),
            brackets: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.pos];
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        c
    }

    fn here(&self) -> Location {
        Location::new(self.line, self.col)
    }

    fn end_statement(&mut self) -> Result<(), LambdaError> {
        if !self.brackets.is_empty() {
            return Err(LambdaError::syntax(self.here(), "unbalanced brackets"));
        }
        if !self.current.is_empty() {
            self.statements.push(std::mem::take(&mut self.current));
        }
        Ok(())
    }

    fn push_bracket_open(&mut self, token_type: TokenType) {
        self.brackets.push(token_type);
    }

    fn push_bracket_close(&mut self, token: &Token) -> Result<(), LambdaError> {
        let Some(opener) = self.brackets.pop() else {
            return Err(LambdaError::syntax(
                token.location(),
                format!(
                    "unexpected '{}' (no opening bracket found)",
                    bracket_name(token.token_type)
                ),
            ));
        };

        if expected_closer(opener) != token.token_type {
            return Err(LambdaError::syntax(
                token.location(),
                format!(
                    "mismatching brackets: expected '{}', got '{}'",
                    bracket_name(expected_closer(opener)),
                    bracket_name(token.token_type)
                ),
            ));
        }

        Ok(())
    }

    fn lex_symbol(&mut self) -> Option<Token> {
        for (symbol, token_type) in SYMBOLS {
            if self.matches(symbol) {
                let (line, col) = (self.line, self.col);
                for _ in 0..symbol.chars().count() {
                    self.advance();
                }
                return Some(Token::new(*symbol, *token_type, line, col));
            }
        }
        None
    }

    fn matches(&self, symbol: &str) -> bool {
        symbol
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn lex_variable(&mut self) -> Token {
        let (line, col) = (self.line, self.col);
        let mut source = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_lowercase()) {
            source.push(self.advance());
        }
        Token::new(source, TokenType::Variable, line, col)
    }

    fn lex_int(&mut self) -> Token {
        let (line, col) = (self.line, self.col);
        let mut source = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            source.push(self.advance());
        }
        Token::new(source, TokenType::Int, line, col)
    }

    fn run(mut self) -> Result<Vec<Vec<Token>>, LambdaError> {
        while let Some(c) = self.peek() {
            if c == '\n' {
                self.advance();
                self.end_statement()?;
                continue;
            }

            if c == '\r' && self.peek_at(1) == Some('\n') {
                self.advance();
                self.advance();
                self.end_statement()?;
                continue;
            }

            if c == ';' {
                self.advance();
                self.end_statement()?;
                continue;
            }

            if c == '#' {
                while matches!(self.peek(), Some(c) if c != '\n') {
                    self.advance();
                }
                continue;
            }

            if c.is_whitespace() {
                self.advance();
                continue;
            }

            if let Some(token) = self.lex_symbol() {
                match token.token_type {
                    TokenType::LParen | TokenType::LSquare => {
                        self.push_bracket_open(token.token_type)
                    }
                    TokenType::RParen | TokenType::RSquare => self.push_bracket_close(&token)?,
                    _ => {}
                }
                self.current.push(token);
                continue;
            }

            if c.is_ascii_lowercase() {
                let token = self.lex_variable();
                self.current.push(token);
                continue;
            }

            if c.is_ascii_digit() {
                let token = self.lex_int();
                self.current.push(token);
                continue;
            }

            return Err(LambdaError::syntax(
                self.here(),
                format!("unexpected character '{c}'"),
            ));
        }

        self.end_statement()?;
        Ok(self.statements)
    }
}

/// Transform source text into one token list per statement.
///
/// Statements are separated by newlines (`\n` or `\r\n`) or `;`; consecutive
/// separators never produce empty statements. `#` starts a comment running to
/// end of line. Bracket balance is checked at every statement boundary.
pub fn lex(source: &str) -> Result<Vec<Vec<Token>>, LambdaError> {
    Lexer::new(source).run()
}
