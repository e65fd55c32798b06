//! Tree traversal over condition expressions
//!
//! [`Expression`] is a closed sum type, so every traversal dispatches through
//! one exhaustive `match` in [`Expression::accept`] / [`Expression::accept_with`].
//! A new node kind fails to compile until every visitor handles it.

use crate::condition::ast::{Comparison, Connective, Expression, LogicalOp};
use crate::error::{ConditionError, Result};
use smallvec::SmallVec;
use std::fmt::Write;

/// Traversal that produces one result per node
pub trait Visitor {
    type Output;

    fn visit_comparison(&mut self, comparison: &Comparison) -> Self::Output;
    fn visit_connective(&mut self, connective: &Connective) -> Self::Output;
}

/// Traversal that threads a caller-supplied context through every node
pub trait ContextVisitor<C> {
    type Output;

    fn visit_comparison(&mut self, comparison: &Comparison, ctx: C) -> Self::Output;
    fn visit_connective(&mut self, connective: &Connective, ctx: C) -> Self::Output;
}

impl Expression {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expression::Comparison(c) => visitor.visit_comparison(c),
            Expression::Connective(c) => visitor.visit_connective(c),
        }
    }

    pub fn accept_with<C, V: ContextVisitor<C>>(&self, visitor: &mut V, ctx: C) -> V::Output {
        match self {
            Expression::Comparison(c) => visitor.visit_comparison(c, ctx),
            Expression::Connective(c) => visitor.visit_connective(c, ctx),
        }
    }

    /// Canonical source text; parses back to an equal tree
    pub fn pretty(&self) -> String {
        let mut printer = PrettyPrinter::default();
        self.accept(&mut printer);
        printer.into_string()
    }

    /// Number of comparison leaves
    pub fn leaf_count(&self) -> usize {
        self.accept(&mut LeafCounter)
    }

    /// Identifiers referenced by the expression, first occurrence order, no duplicates
    pub fn identifiers(&self) -> SmallVec<[String; 8]> {
        let mut collector = IdentifierCollector::default();
        self.accept(&mut collector);
        collector.into_ids()
    }

    /// Reject the expression if it names an identifier `is_known` does not accept
    pub fn check_references(&self, is_known: impl Fn(&str) -> bool) -> Result<()> {
        match self.identifiers().into_iter().find(|id| !is_known(id.as_str())) {
            Some(id) => Err(ConditionError::UnknownIdentifier(id)),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pretty())
    }
}

/// Renders an expression with the minimum parentheses needed to keep its shape
#[derive(Debug, Default)]
pub struct PrettyPrinter {
    out: String,
}

impl PrettyPrinter {
    pub fn into_string(self) -> String {
        self.out
    }

    fn child(&mut self, child: &Expression, parent: LogicalOp, is_right: bool) {
        let wrap = match child {
            Expression::Comparison(_) => false,
            // Same-kind nesting on the right only comes from explicit grouping
            Expression::Connective(c) => {
                c.kind.precedence() < parent.precedence() || (is_right && c.kind == parent)
            }
        };

        if wrap {
            self.out.push('(');
            child.accept(self);
            self.out.push(')');
        } else {
            child.accept(self);
        }
    }
}

impl Visitor for PrettyPrinter {
    type Output = ();

    fn visit_comparison(&mut self, comparison: &Comparison) {
        let _ = write!(
            self.out,
            "{} {} {}",
            comparison.id, comparison.operator, comparison.value
        );
    }

    fn visit_connective(&mut self, connective: &Connective) {
        self.child(&connective.left, connective.kind, false);
        let _ = write!(self.out, " {} ", connective.kind);
        self.child(&connective.right, connective.kind, true);
    }
}

/// Counts comparison leaves
pub struct LeafCounter;

impl Visitor for LeafCounter {
    type Output = usize;

    fn visit_comparison(&mut self, _comparison: &Comparison) -> usize {
        1
    }

    fn visit_connective(&mut self, connective: &Connective) -> usize {
        connective.left.accept(self) + connective.right.accept(self)
    }
}

/// Collects referenced identifiers
#[derive(Debug, Default)]
pub struct IdentifierCollector {
    ids: SmallVec<[String; 8]>,
}

impl IdentifierCollector {
    pub fn into_ids(self) -> SmallVec<[String; 8]> {
        self.ids
    }
}

impl Visitor for IdentifierCollector {
    type Output = ();

    fn visit_comparison(&mut self, comparison: &Comparison) {
        if !self.ids.iter().any(|id| *id == comparison.id) {
            self.ids.push(comparison.id.clone());
        }
    }

    fn visit_connective(&mut self, connective: &Connective) {
        connective.left.accept(self);
        connective.right.accept(self);
    }
}
