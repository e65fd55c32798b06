//! Campaign Condition Core - skip/branch logic engine for survey campaigns
//!
//! Campaign authors attach conditions such as
//! `q1 == 1 and (q2 > 3 or q3 != "skip")` to survey questions. This crate
//! parses them once into an immutable tree and evaluates that tree against
//! the answers of each response, yielding a three-valued [`TriState`]:
//! unanswered questions make a condition `Indeterminate` instead of guessing.
//!
//! ```
//! use campaign_condition_core::{evaluate, parse, Bindings, TriState};
//!
//! let condition = parse(r#"q1 == 1 and (q2 > 3 or q3 != "skip")"#).unwrap();
//!
//! let mut answers = Bindings::new();
//! answers.insert("q1", 1).insert("q3", "skip");
//! assert_eq!(evaluate(&condition, &answers), TriState::Indeterminate);
//!
//! answers.insert("q2", "4");
//! assert_eq!(evaluate(&condition, &answers), TriState::True);
//! ```

pub mod condition;
pub mod config;
pub mod error;

pub use condition::{
    check_condition, evaluate, get_or_parse, parse, parse_with_config, Bindings,
    ConditionCache, Environment, Expression, Literal, LogicalOp, Number, Operator, TriState,
    Value,
};
pub use config::EngineConfig;
pub use error::{ComparisonError, ConditionError, LexError, Result, SyntaxError};
