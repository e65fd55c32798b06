//! Recursive-descent condition parser
//!
//! ```text
//! expr       := or_expr
//! or_expr    := and_expr ( "or" and_expr )*
//! and_expr   := comparison ( "and" comparison )*
//! comparison := "(" expr ")" | identifier operator literal
//! ```

use crate::condition::ast::{Expression, LogicalOp, Operator};
use crate::condition::lexer::tokenize;
use crate::condition::token::{Token, TokenKind};
use crate::config::{EngineConfig, MAX_DEPTH_LIMIT};
use crate::error::{ConditionError, Result, SyntaxError};

/// Parse a condition string into an AST using the default limits
pub fn parse(source: &str) -> Result<Expression> {
    parse_with_config(source, &EngineConfig::default())
}

/// Parse a condition string into an AST
pub fn parse_with_config(source: &str, config: &EngineConfig) -> Result<Expression> {
    tracing::trace!(source, "parsing condition");

    if source.len() > config.max_source_len {
        return Err(ConditionError::SourceTooLong {
            len: source.len(),
            max: config.max_source_len,
        });
    }

    let result = tokenize(source)
        .map_err(ConditionError::from)
        .and_then(|tokens| Parser::new(&tokens, config.max_depth).parse());

    if let Err(ref error) = result {
        tracing::debug!(source, %error, "condition rejected");
    }
    result
}

/// Parse an already tokenized condition; the token slice must end with `End`
pub fn parse_tokens(tokens: &[Token<'_>]) -> Result<Expression> {
    Parser::new(tokens, EngineConfig::default().max_depth).parse()
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    /// Current parenthesis nesting
    depth: usize,
    max_depth: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(tokens: &'t [Token<'a>], max_depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            // Configs reach here unvalidated
            max_depth: max_depth.min(MAX_DEPTH_LIMIT),
        }
    }

    fn parse(mut self) -> Result<Expression> {
        let expr = self.parse_or()?;

        let next = self.peek()?;
        if !next.is_end() {
            let expected = if matches!(next.kind, TokenKind::CloseParen) {
                "matching '('"
            } else {
                "'and', 'or' or end of input"
            };
            return Err(self.unexpected(expected));
        }
        Ok(expr)
    }

    fn peek(&self) -> Result<&'t Token<'a>> {
        self.tokens.get(self.pos).ok_or_else(|| {
            let position = self.tokens.last().map_or(0, |t| t.position + t.text.len());
            SyntaxError {
                position,
                expected: "more tokens".to_string(),
                found: "end of token stream".to_string(),
            }
            .into()
        })
    }

    fn advance(&mut self) -> Result<&'t Token<'a>> {
        let token = self.peek()?;
        self.pos += 1;
        Ok(token)
    }

    fn unexpected(&self, expected: &str) -> ConditionError {
        match self.tokens.get(self.pos) {
            Some(token) => SyntaxError {
                position: token.position,
                expected: expected.to_string(),
                found: token.to_string(),
            }
            .into(),
            None => SyntaxError {
                position: 0,
                expected: expected.to_string(),
                found: "end of token stream".to_string(),
            }
            .into(),
        }
    }

    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;
        while matches!(self.peek()?.kind, TokenKind::Or) {
            let position = self.advance()?.position;
            let right = self.parse_and()?;
            left = self.join(left, LogicalOp::Or, right, position)?;
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_comparison()?;
        while matches!(self.peek()?.kind, TokenKind::And) {
            let position = self.advance()?.position;
            let right = self.parse_comparison()?;
            left = self.join(left, LogicalOp::And, right, position)?;
        }
        Ok(left)
    }

    /// Build a connective node, enforcing the tree height limit
    fn join(
        &self,
        left: Expression,
        kind: LogicalOp,
        right: Expression,
        position: usize,
    ) -> Result<Expression> {
        let node = Expression::connective(left, kind, right);
        if node.height() > self.max_depth {
            return Err(ConditionError::NestingTooDeep {
                max_depth: self.max_depth,
                position,
            });
        }
        Ok(node)
    }

    fn parse_comparison(&mut self) -> Result<Expression> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::OpenParen => self.parse_group(),
            TokenKind::Identifier => {
                let id = self.advance()?.text.to_string();
                let operator = self.parse_operator()?;
                let value = match &self.peek()?.kind {
                    TokenKind::Literal(literal) => literal.clone(),
                    _ => return Err(self.unexpected("literal value")),
                };
                self.pos += 1;
                Ok(Expression::comparison(id, operator, value))
            }
            _ => Err(self.unexpected("identifier or '('")),
        }
    }

    fn parse_group(&mut self) -> Result<Expression> {
        let open = self.advance()?;
        if self.depth >= self.max_depth {
            return Err(ConditionError::NestingTooDeep {
                max_depth: self.max_depth,
                position: open.position,
            });
        }

        self.depth += 1;
        let inner = self.parse_or()?;
        self.depth -= 1;

        if !matches!(self.peek()?.kind, TokenKind::CloseParen) {
            let expected = format!("')' to close '(' at position {}", open.position);
            return Err(self.unexpected(&expected));
        }
        self.pos += 1;
        Ok(inner)
    }

    fn parse_operator(&mut self) -> Result<Operator> {
        let token = self.peek()?;
        let operator = match token.kind {
            TokenKind::Operator => Operator::from_symbol(token.text),
            _ => None,
        };

        match operator {
            Some(op) => {
                self.pos += 1;
                Ok(op)
            }
            None => Err(self.unexpected("comparison operator (==, !=, <, <=, >, >=)")),
        }
    }
}
