//! Condition parsing and evaluation module
//!
//! This module handles parsing skip/branch conditions like
//! `q1 == 1 and (q2 > 3 or q3 != "skip")` and evaluating them against the
//! answers recorded for one survey response.

mod ast;
pub mod cache;
mod evaluator;
pub mod lexer;
pub mod parser;
mod token;
mod value;
pub mod visitor;


pub use ast::*;
pub use cache::*;
pub use evaluator::*;
pub use lexer::*;
pub use parser::*;
pub use token::*;
pub use value::*;
pub use visitor::*;
