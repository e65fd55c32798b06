//! Abstract Syntax Tree for condition expressions

use crate::condition::value::{Number, ValueKind};
use std::cmp::Ordering;
use std::fmt;

/// Parsed condition expression.
///
/// Immutable once built; share it behind an `Arc` for concurrent evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Leaf test like `q1 == 1`
    Comparison(Comparison),
    /// Two sub-expressions joined by `and` / `or`
    Connective(Connective),
}

/// `identifier operator literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub id: String,
    pub operator: Operator,
    pub value: Literal,
}

/// `left and right` / `left or right`
#[derive(Debug, Clone, PartialEq)]
pub struct Connective {
    pub left: Box<Expression>,
    pub kind: LogicalOp,
    pub right: Box<Expression>,
}

/// Logical connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal (==)
    Equal,
    /// Not equal (!=)
    NotEqual,
    /// Less than (<)
    Less,
    /// Less than or equal (<=)
    LessEqual,
    /// Greater than (>)
    Greater,
    /// Greater than or equal (>=)
    GreaterEqual,
}

/// Literal on the right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(Number),
    String(String),
    Boolean(bool),
}

impl Expression {
    pub fn comparison(id: impl Into<String>, operator: Operator, value: Literal) -> Self {
        Expression::Comparison(Comparison {
            id: id.into(),
            operator,
            value,
        })
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::connective(left, LogicalOp::And, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::connective(left, LogicalOp::Or, right)
    }

    pub fn connective(left: Expression, kind: LogicalOp, right: Expression) -> Self {
        Expression::Connective(Connective {
            left: Box::new(left),
            kind,
            right: Box::new(right),
        })
    }

    /// Height of the tree; a single comparison has height 1
    pub fn height(&self) -> usize {
        match self {
            Expression::Comparison(_) => 1,
            Expression::Connective(c) => 1 + c.left.height().max(c.right.height()),
        }
    }
}

impl LogicalOp {
    /// Binding strength; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            LogicalOp::Or => 1,
            LogicalOp::And => 2,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
        }
    }
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::Less,
        Operator::LessEqual,
        Operator::Greater,
        Operator::GreaterEqual,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
        }
    }

    /// Exact match against the six operator symbols
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        Operator::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// `==` and `!=`
    #[inline]
    pub fn is_equality(&self) -> bool {
        matches!(self, Operator::Equal | Operator::NotEqual)
    }

    /// Whether `left.cmp(right) == ordering` satisfies this operator
    #[inline]
    pub fn matches(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::Less => ordering == Ordering::Less,
            Operator::LessEqual => ordering != Ordering::Greater,
            Operator::Greater => ordering == Ordering::Greater,
            Operator::GreaterEqual => ordering != Ordering::Less,
        }
    }
}

impl Literal {
    pub fn kind(&self) -> ValueKind {
        match self {
            Literal::Number(_) => ValueKind::Number,
            Literal::String(_) => ValueKind::String,
            Literal::Boolean(_) => ValueKind::Boolean,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::String(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        _ => write!(f, "{}", c)?,
                    }
                }
                f.write_str("\"")
            }
        }
    }
}
