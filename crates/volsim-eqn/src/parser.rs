//! Precedence-climbing parser producing an [`Expr`] tree.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary (('^' | '**') unary)?
//! primary := number | ident | ident '(' args ')' | '(' expr ')'
//! ```
//!
//! Putting `unary` below `power` makes `-a ^ 2` read as `-(a ^ 2)` while still
//! accepting `a ^ -2`.

use volsim_core::errors::{ErrorInfo, VolError};

use crate::lexer::{tokenize, Spanned, Token};

/// Deepest nesting of parentheses, calls, signs and exponents accepted.
pub(crate) const MAX_NESTING: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Ident(String),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

impl Expr {
    /// Collects identifiers in first-use order; function names are not identifiers.
    pub(crate) fn collect_idents(&self, out: &mut Vec<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Ident(name) => {
                if !out.iter().any(|seen| seen == name) {
                    out.push(name.clone());
                }
            }
            Expr::Neg(inner) => inner.collect_idents(out),
            Expr::Binary(_, lhs, rhs) => {
                lhs.collect_idents(out);
                rhs.collect_idents(out);
            }
            Expr::Call(_, args) => {
                for arg in args {
                    arg.collect_idents(out);
                }
            }
        }
    }
}

pub(crate) fn parse(text: &str) -> Result<Expr, VolError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        text,
    };
    let expr = parser.expr()?;
    if let Some((token, offset)) = parser.tokens.get(parser.pos) {
        return Err(parser.unexpected(token, *offset));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
    text: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn next(&mut self) -> Option<Spanned> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), VolError> {
        match self.next() {
            Some((token, _)) if token == expected => Ok(()),
            Some((token, offset)) => Err(self.unexpected(&token, offset)),
            None => Err(self.end_of_input(&expected.to_string())),
        }
    }

    fn unexpected(&self, token: &Token, offset: usize) -> VolError {
        VolError::Evaluation(
            ErrorInfo::new("unexpected-token", format!("unexpected `{token}`"))
                .with_context("offset", offset.to_string())
                .with_context("equation", self.text),
        )
    }

    fn end_of_input(&self, wanted: &str) -> VolError {
        VolError::Evaluation(
            ErrorInfo::new(
                "unexpected-end",
                format!("equation ended while expecting {wanted}"),
            )
            .with_context("equation", self.text),
        )
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, VolError>,
    ) -> Result<T, VolError> {
        if self.depth >= MAX_NESTING {
            return Err(VolError::Evaluation(
                ErrorInfo::new(
                    "nesting-too-deep",
                    format!("equation nests deeper than {MAX_NESTING} levels"),
                )
                .with_context("offset", self.offset().to_string())
                .with_context("equation", self.text),
            ));
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.text.len(), |(_, offset)| *offset)
    }

    fn expr(&mut self) -> Result<Expr, VolError> {
        let mut lhs = self.term()?;
        loop {
            let op = if self.eat(&Token::Plus) {
                BinOp::Add
            } else if self.eat(&Token::Minus) {
                BinOp::Sub
            } else {
                break;
            };
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, VolError> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.eat(&Token::Star) {
                BinOp::Mul
            } else if self.eat(&Token::Slash) {
                BinOp::Div
            } else {
                break;
            };
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, VolError> {
        if self.eat(&Token::Minus) {
            let inner = self.nested(Self::unary)?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        if self.eat(&Token::Plus) {
            return self.nested(Self::unary);
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, VolError> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            // right-associative: the exponent re-enters at `unary`
            let exponent = self.nested(Self::unary)?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, VolError> {
        match self.next() {
            Some((Token::Number(value), _)) => Ok(Expr::Number(value)),
            Some((Token::Ident(name), _)) => {
                if !self.eat(&Token::LParen) {
                    return Ok(Expr::Ident(name));
                }
                let args = self.nested(Self::call_args)?;
                Ok(Expr::Call(name, args))
            }
            Some((Token::LParen, _)) => self.nested(|parser| {
                let inner = parser.expr()?;
                parser.expect(Token::RParen)?;
                Ok(inner)
            }),
            Some((token, offset)) => Err(self.unexpected(&token, offset)),
            None => Err(self.end_of_input("an operand")),
        }
    }

    fn call_args(&mut self) -> Result<Vec<Expr>, VolError> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if !self.eat(&Token::Comma) {
                self.expect(Token::RParen)?;
                return Ok(args);
            }
        }
    }
}
