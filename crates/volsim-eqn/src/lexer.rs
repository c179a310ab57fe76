//! Tokeniser for equation text.

use std::fmt;

use volsim_core::errors::{ErrorInfo, VolError};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    // Delimiters & punctuation
    LParen,
    RParen,
    Comma,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Caret, // ^ and **

    Number(f64),
    Ident(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::Number(value) => write!(f, "{value}"),
            Token::Ident(name) => write!(f, "{name}"),
        }
    }
}

/// Token with its byte offset in the source text.
pub(crate) type Spanned = (Token, usize);

pub(crate) fn tokenize(text: &str) -> Result<Vec<Spanned>, VolError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        let start = pos;
        let token = match c {
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b',' => Token::Comma,
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'/' => Token::Slash,
            b'^' => Token::Caret,
            b'*' if bytes.get(pos + 1) == Some(&b'*') => {
                pos += 1;
                Token::Caret
            }
            b'*' => Token::Star,
            b'0'..=b'9' | b'.' => {
                pos = scan_number(bytes, pos);
                let literal = &text[start..pos];
                let value = literal.parse::<f64>().map_err(|_| {
                    VolError::Evaluation(
                        ErrorInfo::new("invalid-number", format!("malformed number `{literal}`"))
                            .with_context("offset", start.to_string()),
                    )
                })?;
                tokens.push((Token::Number(value), start));
                continue;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_')
                {
                    pos += 1;
                }
                tokens.push((Token::Ident(text[start..pos].to_string()), start));
                continue;
            }
            _ => {
                let ch = text[start..].chars().next().unwrap_or('?');
                return Err(VolError::Evaluation(
                    ErrorInfo::new("invalid-character", format!("unexpected character `{ch}`"))
                        .with_context("offset", start.to_string()),
                ));
            }
        };
        tokens.push((token, start));
        pos += 1;
    }

    Ok(tokens)
}

/// Scans `digits [. digits] [(e|E) [+|-] digits]` and returns the end offset.
fn scan_number(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
        pos += 1;
    }
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut probe = pos + 1;
        if probe < bytes.len() && (bytes[probe] == b'+' || bytes[probe] == b'-') {
            probe += 1;
        }
        if probe < bytes.len() && bytes[probe].is_ascii_digit() {
            pos = probe;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<Token> {
        tokenize(text).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn double_star_is_power() {
        assert_eq!(
            kinds("a ** 2"),
            vec![Token::Ident("a".into()), Token::Caret, Token::Number(2.0)]
        );
    }

    #[test]
    fn exponent_literals() {
        assert_eq!(kinds("1.5e-3"), vec![Token::Number(1.5e-3)]);
        // `e` without digits is an identifier, not an exponent
        assert_eq!(
            kinds("2e"),
            vec![Token::Number(2.0), Token::Ident("e".into())]
        );
    }

    #[test]
    fn rejects_unknown_characters() {
        let err = tokenize("a $ b").unwrap_err();
        assert_eq!(err.info().code, "invalid-character");
        assert_eq!(err.info().context["offset"], "2");
    }
}
