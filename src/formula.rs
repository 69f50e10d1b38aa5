//! Small formulas over named variables
//!
//! Map names and obstruction counts are given on the command line as
//! expressions such as `map_METHOD` or `WIDTH*HEIGHT*0.1`. Names are
//! produced by plain substitution ([render_template]); counts by an
//! arithmetic evaluator ([evaluate]) supporting numbers, variables,
//! parentheses, `+ - * / // % **` with the usual precedence and the
//! functions `int`, `round`, `floor`, `ceil`, `abs`, `min` and `max`.

use std::collections::BTreeMap;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use itertools::Itertools;

use crate::error::{MapCreatorError, Result};

/// Value bound to a variable
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// Variables visible to a formula
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    values: BTreeMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, builder style
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// Replace every occurrence of each variable name by its value
///
/// Longer names are substituted first, so `WIDTH` inside `WIDTH2` is
/// left alone when both are bound.
pub fn render_template(template: &str, bindings: &Bindings) -> String {
    let names = bindings
        .values
        .keys()
        .sorted_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)))
        .collect_vec();

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    'outer: while !rest.is_empty() {
        for name in &names {
            if !name.is_empty() && rest.starts_with(name.as_str()) {
                out.push_str(&bindings.values[*name].to_string());
                rest = &rest[name.len()..];
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

/// Evaluate an arithmetic expression
pub fn evaluate(expression: &str, bindings: &Bindings) -> Result<f64> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
        bindings,
    };
    let value = parser.expression()?;
    match parser.tokens.next() {
        None => Ok(value),
        Some(token) => Err(formula_error(format!("unexpected `{}` in `{}`", token, expression))),
    }
}

/// Evaluate an expression to a cell count, truncating toward zero
pub fn evaluate_count(expression: &str, bindings: &Bindings) -> Result<usize> {
    let value = evaluate(expression, bindings)?;
    if !value.is_finite() {
        return Err(formula_error(format!("`{}` is not finite", expression)));
    }
    let value = value.trunc();
    if value < 0.0 {
        return Err(formula_error(format!(
            "`{}` evaluates to negative count {}",
            expression, value
        )));
    }
    Ok(value as usize)
}

fn formula_error(message: String) -> MapCreatorError {
    MapCreatorError::Formula(message)
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    Power,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::DoubleSlash => write!(f, "//"),
            Token::Percent => write!(f, "%"),
            Token::Power => write!(f, "**"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<Chars> = expression.chars().peekable();
    while let Some(&c) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut literal: String = chars
                    .peeking_take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '_')
                    .filter(|c| *c != '_')
                    .collect();
                if let Some(e) = chars.next_if(|c| *c == 'e' || *c == 'E') {
                    literal.push(e);
                    if let Some(sign) = chars.next_if(|c| *c == '+' || *c == '-') {
                        literal.push(sign);
                    }
                    literal.extend(chars.peeking_take_while(|c| c.is_ascii_digit()));
                }
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| formula_error(format!("invalid number `{}`", literal)))?;
                tokens.push(Token::Number(number));
                continue;
            }
            c if c.is_alphabetic() || c == '_' => {
                let ident: String = chars
                    .peeking_take_while(|c| c.is_alphanumeric() || *c == '_')
                    .collect();
                tokens.push(Token::Ident(ident));
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '*' | '/' => {
                chars.next();
                if chars.peek() == Some(&c) {
                    chars.next();
                    tokens.push(if c == '*' {
                        Token::Power
                    } else {
                        Token::DoubleSlash
                    });
                } else {
                    tokens.push(if c == '*' { Token::Star } else { Token::Slash });
                }
                continue;
            }
            other => return Err(formula_error(format!("unexpected character `{}`", other))),
        };
        chars.next();
        tokens.push(token);
    }
    Ok(tokens)
}

/// Recursive descent over
///
/// ```text
/// expression := term (("+" | "-") term)*
/// term       := unary (("*" | "/" | "//" | "%") unary)*
/// unary      := ("+" | "-") unary | power
/// power      := atom ("**" unary)?
/// atom       := number | name | name "(" arguments ")" | "(" expression ")"
/// ```
struct Parser<'a> {
    tokens: Peekable<std::vec::IntoIter<Token>>,
    bindings: &'a Bindings,
}

impl<'a> Parser<'a> {
    fn expression(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        loop {
            match self.tokens.peek() {
                Some(Token::Plus) => {
                    self.tokens.next();
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.tokens.next();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.unary()?;
        loop {
            let op = match self.tokens.peek() {
                Some(op @ (Token::Star | Token::Slash | Token::DoubleSlash | Token::Percent)) => {
                    op.clone()
                }
                _ => return Ok(value),
            };
            self.tokens.next();
            let rhs = self.unary()?;
            if op != Token::Star && rhs == 0.0 {
                return Err(formula_error("division by zero".to_string()));
            }
            value = match op {
                Token::Star => value * rhs,
                Token::Slash => value / rhs,
                Token::DoubleSlash => (value / rhs).floor(),
                // Result takes the sign of the divisor
                _ => value - rhs * (value / rhs).floor(),
            };
        }
    }

    fn unary(&mut self) -> Result<f64> {
        match self.tokens.peek() {
            Some(Token::Minus) => {
                self.tokens.next();
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.tokens.next();
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64> {
        let base = self.atom()?;
        if self.tokens.peek() == Some(&Token::Power) {
            self.tokens.next();
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<f64> {
        match self.tokens.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                if self.tokens.peek() == Some(&Token::LParen) {
                    self.tokens.next();
                    let args = self.arguments()?;
                    call(&name, &args)
                } else {
                    self.variable(&name)
                }
            }
            Some(token) => Err(formula_error(format!("unexpected `{}`", token))),
            None => Err(formula_error("unexpected end of formula".to_string())),
        }
    }

    fn arguments(&mut self) -> Result<Vec<f64>> {
        let mut args = Vec::new();
        if self.tokens.peek() == Some(&Token::RParen) {
            self.tokens.next();
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            match self.tokens.next() {
                Some(Token::Comma) => (),
                Some(Token::RParen) => return Ok(args),
                Some(token) => return Err(formula_error(format!("unexpected `{}`", token))),
                None => return Err(formula_error("missing `)`".to_string())),
            }
        }
    }

    fn variable(&self, name: &str) -> Result<f64> {
        match self.bindings.get(name) {
            Some(Value::Integer(v)) => Ok(*v as f64),
            Some(Value::Real(v)) => Ok(*v),
            Some(Value::Text(_)) => Err(formula_error(format!(
                "variable `{}` is not a number",
                name
            ))),
            None => Err(formula_error(format!("unknown variable `{}`", name))),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.tokens.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(formula_error(format!(
                "expected `{}`, found `{}`",
                expected, token
            ))),
            None => Err(formula_error(format!("missing `{}`", expected))),
        }
    }
}

fn call(name: &str, args: &[f64]) -> Result<f64> {
    let single = |f: fn(f64) -> f64| match args {
        [x] => Ok(f(*x)),
        _ => Err(formula_error(format!("`{}` takes 1 argument, got {}", name, args.len()))),
    };
    match name {
        "int" => single(f64::trunc),
        "floor" => single(f64::floor),
        "ceil" => single(f64::ceil),
        "abs" => single(f64::abs),
        "round" => single(round_half_even),
        "min" | "max" if args.is_empty() => {
            Err(formula_error(format!("`{}` needs arguments", name)))
        }
        "min" => Ok(args.iter().copied().fold(f64::INFINITY, f64::min)),
        "max" => Ok(args.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        _ => Err(formula_error(format!("unknown function `{}`", name))),
    }
}

/// Round to nearest, ties to even
fn round_half_even(x: f64) -> f64 {
    let r = x.round();
    if (x - x.trunc()).abs() == 0.5 && r % 2.0 != 0.0 {
        r - x.signum()
    } else {
        r
    }
}
