//! Nom-based tokenizer for infix formulas.
//!
//! Splits formula text into parentheses, the four arithmetic operators,
//! double literals and bare variables. Whitespace only separates tokens.
//! Anything else is reported as an invalid token.

use std::fmt;
use std::hash::{Hash, Hasher};

use nom::{
    branch::alt,
    bytes::complete::{take_till1, take_while},
    character::complete::{char, digit0, digit1, one_of, satisfy},
    combinator::{map, opt, recognize},
    sequence::{pair, tuple},
    IResult,
};

use crate::error::FormulaFormatError;

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    /// `+` and `-`
    pub fn is_additive(self) -> bool {
        matches!(self, Operator::Add | Operator::Sub)
    }

    /// `*` and `/`
    pub fn is_multiplicative(self) -> bool {
        matches!(self, Operator::Mul | Operator::Div)
    }
}

/// A single formula token.
///
/// Number literals are always finite and non-negative, so comparing them
/// by value agrees with comparing their canonical text.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LeftParen,
    RightParen,
    Operator(Operator),
    Number(f64),
    Variable(String),
}

impl Token {
    /// Numbers and variables
    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Variable(_))
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Token::Operator(op) => op.hash(state),
            Token::Number(n) => n.to_bits().hash(state),
            Token::Variable(name) => name.hash(state),
            Token::LeftParen | Token::RightParen => {}
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Operator(op) => write!(f, "{}", op.symbol()),
            // Shortest text that parses back to the same double
            Token::Number(n) => write!(f, "{}", n),
            Token::Variable(name) => write!(f, "{}", name),
        }
    }
}

/// Returns true if `s` is a letter or underscore followed by letters, digits or underscores
pub fn is_variable(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Tokenizer over a borrowed formula string
pub struct Lexer<'a> {
    input: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Tokenize the entire input
    pub fn tokenize(&self) -> Result<Vec<Token>, FormulaFormatError> {
        let mut tokens = Vec::new();
        let mut rest = skip_whitespace(self.input);

        while !rest.is_empty() {
            let position = tokens.len() + 1;
            match parse_token(rest) {
                Ok((remaining, RawToken::Number(text))) => {
                    let value: f64 = text.parse().map_err(|_| invalid(text, position))?;
                    if !value.is_finite() {
                        return Err(invalid(text, position));
                    }
                    tokens.push(Token::Number(value));
                    rest = remaining;
                }
                Ok((remaining, RawToken::Ready(token))) => {
                    tokens.push(token);
                    rest = remaining;
                }
                Err(_) => {
                    let bad = invalid_run(rest);
                    return Err(invalid(bad, position));
                }
            }
            rest = skip_whitespace(rest);
        }

        Ok(tokens)
    }
}

fn invalid(text: &str, position: usize) -> FormulaFormatError {
    FormulaFormatError::InvalidToken {
        token: text.to_string(),
        position,
    }
}

enum RawToken<'a> {
    Number(&'a str),
    Ready(Token),
}

fn skip_whitespace(input: &str) -> &str {
    input.trim_start_matches(char::is_whitespace)
}

/// The unrecognized run starting at `input`, up to the next separator
fn invalid_run(input: &str) -> &str {
    let result: IResult<&str, &str> =
        take_till1(|c: char| c.is_whitespace() || "()+-*/".contains(c))(input);
    match result {
        Ok((_, run)) => run,
        Err(_) => &input[..input.chars().next().map_or(0, char::len_utf8)],
    }
}

fn parse_token(input: &str) -> IResult<&str, RawToken<'_>> {
    alt((
        map(char('('), |_| RawToken::Ready(Token::LeftParen)),
        map(char(')'), |_| RawToken::Ready(Token::RightParen)),
        map(parse_operator, |op| RawToken::Ready(Token::Operator(op))),
        map(parse_variable, |name| {
            RawToken::Ready(Token::Variable(name.to_string()))
        }),
        map(parse_number, RawToken::Number),
    ))(input)
}

fn parse_operator(input: &str) -> IResult<&str, Operator> {
    map(one_of("+-*/"), |c| match c {
        '+' => Operator::Add,
        '-' => Operator::Sub,
        '*' => Operator::Mul,
        _ => Operator::Div,
    })(input)
}

/// `[a-zA-Z_][a-zA-Z_0-9]*`
fn parse_variable(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

/// `(\d+\.\d* | \.\d+ | \d+)([eE][+-]?\d+)?`
fn parse_number(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    ))(input)
}
