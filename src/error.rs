//! Error types for the campaign condition engine

use crate::condition::{Operator, ValueKind};
use thiserror::Error;

/// Malformed token in a condition source string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character {found:?} at position {position}")]
    UnexpectedChar { position: usize, found: char },

    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("malformed numeric literal {text:?} at position {position}")]
    MalformedNumber { position: usize, text: String },
}

impl LexError {
    /// Byte offset in the source where the error was detected
    pub fn position(&self) -> usize {
        match self {
            LexError::UnexpectedChar { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::MalformedNumber { position, .. } => *position,
        }
    }
}

/// Grammar violation found while building the syntax tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("syntax error at position {position}: expected {expected}, found {found}")]
pub struct SyntaxError {
    pub position: usize,
    pub expected: String,
    pub found: String,
}

/// Bound value and literal cannot be compared with the given operator.
///
/// Raised during evaluation only; the evaluator turns it into
/// [`TriState::Indeterminate`](crate::condition::TriState::Indeterminate).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot compare {left} {operator} {right}")]
pub struct ComparisonError {
    pub operator: Operator,
    pub left: ValueKind,
    pub right: ValueKind,
}

/// Main error type for the condition engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Nesting deeper than {max_depth} at position {position}")]
    NestingTooDeep { max_depth: usize, position: usize },

    #[error("Condition source is {len} bytes, limit is {max}")]
    SourceTooLong { len: usize, max: usize },

    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("Invalid binding for {id}: {reason}")]
    InvalidBinding { id: String, reason: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl ConditionError {
    /// True for errors raised while turning source text into a tree
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ConditionError::Lex(_)
                | ConditionError::Syntax(_)
                | ConditionError::NestingTooDeep { .. }
                | ConditionError::SourceTooLong { .. }
        )
    }
}

/// Result type alias for the condition engine
pub type Result<T> = std::result::Result<T, ConditionError>;
