//! Value domain and comparison semantics
//!
//! Bound values come from recorded survey responses, literals come from the
//! parsed condition. The two sides may not share a declared type, so every
//! comparison goes through [`compare`], which holds the whole coercion table.

use crate::condition::ast::{Literal, Operator};
use crate::error::ComparisonError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Lexical form of a numeric literal: optional sign, digits, optional fraction
static NUMERIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?[0-9]+(\.[0-9]+)?$").expect("numeric pattern is a valid regex")
});

/// Integer or decimal number
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Decimal(f64),
}

impl Number {
    /// Parse text that is exactly a numeric literal.
    ///
    /// Integers too large for `i64` become decimals. Anything else
    /// (`"1.2.3"`, `"inf"`, `"3."`, empty) is rejected.
    pub fn parse(text: &str) -> Option<Number> {
        let text = text.trim();
        if !NUMERIC_PATTERN.is_match(text) {
            return None;
        }

        if !text.contains('.') {
            if let Ok(i) = text.parse::<i64>() {
                return Some(Number::Integer(i));
            }
        }

        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Number::Decimal)
    }

    #[inline]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Integer(i) => i as f64,
            Number::Decimal(f) => f,
        }
    }

    /// Numeric ordering; exact for two integers
    pub fn compare(&self, other: &Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }

    /// `0` and `1` are boolean-coercible, nothing else is
    pub fn as_bool(&self) -> Option<bool> {
        match self.compare(&Number::Integer(0)) {
            Some(Ordering::Equal) => Some(false),
            _ => match self.compare(&Number::Integer(1)) {
                Some(Ordering::Equal) => Some(true),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Decimal(d) => {
                // Keep the decimal point so the text lexes back as a decimal
                let text = d.to_string();
                if text.contains('.') {
                    f.write_str(&text)
                } else {
                    write!(f, "{}.0", text)
                }
            }
        }
    }
}

/// Runtime value bound to an identifier in the binding environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Number(Number),
    String(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(Number::Integer(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(Number::Integer(v.into()))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(Number::Decimal(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// Closed set of value kinds shared by literals and bound values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    String,
    Boolean,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Number => write!(f, "number"),
            ValueKind::String => write!(f, "string"),
            ValueKind::Boolean => write!(f, "boolean"),
        }
    }
}

/// Both sides of a comparison after coercion into one domain
enum Operands<'a> {
    Numeric(Number, Number),
    Text(Cow<'a, str>, Cow<'a, str>),
    Boolean(bool, bool),
}

fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Coercion table. `None` means the pair has no common domain for `op`.
fn coerce<'a>(value: &'a Value, op: Operator, literal: &'a Literal) -> Option<Operands<'a>> {
    match (value, literal) {
        (Value::Number(l), Literal::Number(r)) => Some(Operands::Numeric(*l, *r)),
        (Value::String(l), Literal::String(r)) => {
            Some(Operands::Text(Cow::Borrowed(l), Cow::Borrowed(r)))
        }

        // Numeric coercion first; equality falls back to the textual form
        (Value::String(s), Literal::Number(r)) => match Number::parse(s) {
            Some(l) => Some(Operands::Numeric(l, *r)),
            None if op.is_equality() => {
                Some(Operands::Text(Cow::Borrowed(s), Cow::Owned(r.to_string())))
            }
            None => None,
        },
        (Value::Number(l), Literal::String(s)) => match Number::parse(s) {
            Some(r) => Some(Operands::Numeric(*l, r)),
            None if op.is_equality() => {
                Some(Operands::Text(Cow::Owned(l.to_string()), Cow::Borrowed(s)))
            }
            None => None,
        },

        // Same shape for booleans: `"yes" == true` is simply false
        (Value::Boolean(l), Literal::Boolean(r)) => Some(Operands::Boolean(*l, *r)),
        (Value::String(s), Literal::Boolean(r)) => match parse_bool(s) {
            Some(l) => Some(Operands::Boolean(l, *r)),
            None if op.is_equality() => {
                Some(Operands::Text(Cow::Borrowed(s), Cow::Owned(r.to_string())))
            }
            None => None,
        },
        (Value::Number(n), Literal::Boolean(r)) => n.as_bool().map(|l| Operands::Boolean(l, *r)),
        (Value::Boolean(l), Literal::String(s)) => match parse_bool(s) {
            Some(r) => Some(Operands::Boolean(*l, r)),
            None if op.is_equality() => {
                Some(Operands::Text(Cow::Owned(l.to_string()), Cow::Borrowed(s)))
            }
            None => None,
        },

        (Value::Boolean(_), Literal::Number(_)) => None,
    }
}

/// Compare a bound value (left) against a literal (right) with `op`
pub fn compare(value: &Value, op: Operator, literal: &Literal) -> Result<bool, ComparisonError> {
    let error = || ComparisonError {
        operator: op,
        left: value.kind(),
        right: literal.kind(),
    };

    match coerce(value, op, literal).ok_or_else(error)? {
        Operands::Numeric(l, r) => l.compare(&r).map(|ord| op.matches(ord)).ok_or_else(error),
        Operands::Text(l, r) => Ok(op.matches(l.as_ref().cmp(r.as_ref()))),
        Operands::Boolean(l, r) => match op {
            Operator::Equal => Ok(l == r),
            Operator::NotEqual => Ok(l != r),
            _ => Err(error()),
        },
    }
}
