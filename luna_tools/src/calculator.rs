//! Calc-kun: arithmetic without `eval`.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/") unary)*
//! unary   := ("+" | "-") unary | power
//! power   := primary (("^" | "**") unary)?
//! primary := number | "(" expr ")"
//! ```
//!
//! Power binds tighter than a leading sign and is right-associative, so
//! `-2^2 = -4` and `2^3^2 = 512`. Commas are read as thousands separators.
//!
//! Input longer than `MAX_LEN` characters or nested deeper than `MAX_DEPTH`
//! is refused before it can exhaust the stack.

use thiserror::Error;
use tracing::info;

use crate::ToolResult;

const ALLOWED: &str = "0123456789+-*/().,^ ";
const MAX_LEN: usize = 1024;
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("unsupported character '{0}'")]
    UnsupportedChar(char),

    #[error("empty expression")]
    Empty,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected '{0}'")]
    Unexpected(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,

    #[error("expression is longer than {0} characters")]
    TooLong(usize),

    #[error("expression is nested deeper than {0} levels")]
    TooDeep(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Pow,
    LParen,
    RParen,
}

impl Token {
    fn describe(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Plus => "+".into(),
            Self::Minus => "-".into(),
            Self::Star => "*".into(),
            Self::Slash => "/".into(),
            Self::Pow => "^".into(),
            Self::LParen => "(".into(),
            Self::RParen => ")".into(),
        }
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token>, CalcError> {
    if let Some(bad) = expression.chars().find(|c| !ALLOWED.contains(*c)) {
        return Err(CalcError::UnsupportedChar(bad));
    }

    let chars: Vec<char> = expression.chars().filter(|c| *c != ',').collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' => {}
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),
            '/' => tokens.push(Token::Slash),
            '^' => tokens.push(Token::Pow),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::Pow);
                    i += 1;
                } else {
                    tokens.push(Token::Star);
                }
            }
            _ => {
                let start = i;
                while i + 1 < chars.len() && (chars[i + 1].is_ascii_digit() || chars[i + 1] == '.')
                {
                    i += 1;
                }
                let literal: String = chars[start..=i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| CalcError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
        }
        i += 1;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    /// All recursion in the grammar goes through here.
    fn unary(&mut self) -> Result<f64, CalcError> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64, CalcError> {
        let base = self.primary()?;
        if self.peek() == Some(Token::Pow) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, CalcError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(CalcError::Unexpected(other.describe())),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some(other) => Err(CalcError::Unexpected(other.describe())),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    if expression.chars().count() > MAX_LEN {
        return Err(CalcError::TooLong(MAX_LEN));
    }

    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(CalcError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    if let Some(extra) = parser.peek() {
        return Err(CalcError::Unexpected(extra.describe()));
    }
    if !value.is_finite() {
        return Err(CalcError::NonFinite);
    }

    // Avoid printing "-0".
    Ok(if value == 0.0 { 0.0 } else { value })
}

pub(crate) fn run(expression: &str) -> ToolResult {
    info!("Calc-kun calculating '{expression}'");

    match evaluate(expression) {
        Ok(value) => ToolResult::success(format!(
            "Yay! Calc-kun computed it! ✨ {expression} = {value} 🌟 Luna hopes that's helpful!"
        )),
        Err(CalcError::UnsupportedChar(_)) => ToolResult::error(
            "Waaah! Calc-kun says that expression has some scary characters! Luna only accepts numbers and basic math operators (+, -, *, /, **, parentheses)! 😊",
        )
        .with_error_type("unsupported_character"),
        Err(e) => ToolResult::error(format!(
            "Ooh! Calc-kun got confused! Maybe check the math expression? Error: {e} But Luna believes in you! 💖"
        ))
        .with_error_type("calculation_error"),
    }
}
