//! Lexical tokens

use crate::condition::ast::Literal;
use std::fmt;

/// Token kinds produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier,
    /// Run of `=`, `!`, `<`, `>`; the parser decides whether it is a valid operator
    Operator,
    Literal(Literal),
    And,
    Or,
    OpenParen,
    CloseParen,
    End,
}

/// A token with its exact source text and byte offset
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub position: usize,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a str, position: usize) -> Self {
        Self {
            kind,
            text,
            position,
        }
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        matches!(self.kind, TokenKind::End)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::End => write!(f, "end of input"),
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
            TokenKind::Literal(_) => write!(f, "literal {}", self.text),
            _ => write!(f, "'{}'", self.text),
        }
    }
}
