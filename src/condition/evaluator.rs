//! Condition evaluator
//!
//! Reduces an expression to a [`TriState`] against the answers recorded for
//! one survey response. Unanswered questions make a comparison
//! `Indeterminate`; `and` / `or` follow Kleene's three-valued logic.

use crate::condition::ast::{Comparison, Connective, Expression, LogicalOp};
use crate::condition::value::{self, Value};
use crate::condition::visitor::ContextVisitor;
use crate::error::{ConditionError, Result};
use ahash::AHashMap;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

/// Three-valued evaluation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriState {
    True,
    False,
    /// Not enough data to decide
    Indeterminate,
}

impl TriState {
    /// Kleene conjunction
    #[inline]
    pub fn and(self, other: TriState) -> TriState {
        match (self, other) {
            (TriState::False, _) | (_, TriState::False) => TriState::False,
            (TriState::True, TriState::True) => TriState::True,
            _ => TriState::Indeterminate,
        }
    }

    /// Kleene disjunction
    #[inline]
    pub fn or(self, other: TriState) -> TriState {
        match (self, other) {
            (TriState::True, _) | (_, TriState::True) => TriState::True,
            (TriState::False, TriState::False) => TriState::False,
            _ => TriState::Indeterminate,
        }
    }

    #[inline]
    pub fn is_true(self) -> bool {
        self == TriState::True
    }

    #[inline]
    pub fn is_false(self) -> bool {
        self == TriState::False
    }

    #[inline]
    pub fn is_indeterminate(self) -> bool {
        self == TriState::Indeterminate
    }

    /// `None` for `Indeterminate`
    pub fn to_option(self) -> Option<bool> {
        match self {
            TriState::True => Some(true),
            TriState::False => Some(false),
            TriState::Indeterminate => None,
        }
    }
}

impl From<bool> for TriState {
    fn from(b: bool) -> Self {
        if b {
            TriState::True
        } else {
            TriState::False
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriState::True => write!(f, "true"),
            TriState::False => write!(f, "false"),
            TriState::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

/// Binding environment: recorded value per question identifier
pub trait Environment {
    fn lookup(&self, id: &str) -> Option<&Value>;
}

impl<S: BuildHasher> Environment for HashMap<String, Value, S> {
    fn lookup(&self, id: &str) -> Option<&Value> {
        self.get(id)
    }
}

impl Environment for BTreeMap<String, Value> {
    fn lookup(&self, id: &str) -> Option<&Value> {
        self.get(id)
    }
}

/// Answers recorded for one survey response
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: AHashMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build bindings from a JSON object of answers.
    ///
    /// `null` means the question was not answered and is left unbound.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let object = json.as_object().ok_or_else(|| ConditionError::InvalidBinding {
            id: String::new(),
            reason: "bindings must be a JSON object".to_string(),
        })?;

        let mut bindings = Self::new();
        for (id, raw) in object {
            if raw.is_null() {
                continue;
            }
            let value: Value = serde_json::from_value(raw.clone()).map_err(|e| {
                ConditionError::InvalidBinding {
                    id: id.clone(),
                    reason: e.to_string(),
                }
            })?;
            bindings.insert(id.clone(), value);
        }
        Ok(bindings)
    }

    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(id.into(), value.into());
        self
    }

    pub fn remove(&mut self, id: &str) -> Option<Value> {
        self.values.remove(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Environment for Bindings {
    fn lookup(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Evaluate an expression against a binding environment
pub fn evaluate<E: Environment + ?Sized>(expr: &Expression, env: &E) -> TriState {
    expr.accept_with(&mut Evaluator, env)
}

/// Evaluator visitor; the environment travels as traversal context
pub struct Evaluator;

impl<'e, E: Environment + ?Sized> ContextVisitor<&'e E> for Evaluator {
    type Output = TriState;

    fn visit_comparison(&mut self, comparison: &Comparison, env: &'e E) -> TriState {
        let Some(bound) = env.lookup(&comparison.id) else {
            return TriState::Indeterminate;
        };

        match value::compare(bound, comparison.operator, &comparison.value) {
            Ok(result) => result.into(),
            Err(error) => {
                tracing::debug!(
                    id = %comparison.id,
                    %error,
                    "comparison downgraded to indeterminate"
                );
                TriState::Indeterminate
            }
        }
    }

    fn visit_connective(&mut self, connective: &Connective, env: &'e E) -> TriState {
        let left = connective.left.accept_with(self, env);

        // Short-circuit only when the left side alone decides the result
        match (connective.kind, left) {
            (LogicalOp::And, TriState::False) => TriState::False,
            (LogicalOp::Or, TriState::True) => TriState::True,
            (LogicalOp::And, _) => left.and(connective.right.accept_with(self, env)),
            (LogicalOp::Or, _) => left.or(connective.right.accept_with(self, env)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::parser::parse;

    fn eval(source: &str, bindings: &Bindings) -> TriState {
        evaluate(&parse(source).unwrap(), bindings)
    }

    #[test]
    fn test_simple_comparison() {
        let bindings: Bindings = [("q1", 10)].into_iter().collect();
        assert_eq!(eval("q1 > 5", &bindings), TriState::True);
        assert_eq!(eval("q1 < 5", &bindings), TriState::False);
    }

    #[test]
    fn test_missing_identifier_is_indeterminate() {
        assert_eq!(eval("q1 == 1", &Bindings::new()), TriState::Indeterminate);
    }

    #[test]
    fn test_and_short_circuit() {
        let bindings: Bindings = [("a", 2)].into_iter().collect();
        assert_eq!(eval("a == 1 and b == 2", &bindings), TriState::False);
    }

    #[test]
    fn test_indeterminate_propagation() {
        assert_eq!(
            eval("a == 1 or b == 2", &Bindings::new()),
            TriState::Indeterminate
        );

        let bindings: Bindings = [("a", 1)].into_iter().collect();
        assert_eq!(eval("a == 1 and b == 2", &bindings), TriState::Indeterminate);
    }

    #[test]
    fn test_indeterminate_left_resolved_by_right() {
        let bindings: Bindings = [("b", 2)].into_iter().collect();
        assert_eq!(eval("a == 1 and b == 3", &bindings), TriState::False);
        assert_eq!(eval("a == 1 or b == 2", &bindings), TriState::True);
        assert_eq!(eval("a == 1 and b == 2", &bindings), TriState::Indeterminate);
        assert_eq!(eval("a == 1 or b == 3", &bindings), TriState::Indeterminate);
    }

    #[test]
    fn test_or_condition() {
        let bindings: Bindings = [("chr", 3), ("int", 10)].into_iter().collect();
        assert_eq!(eval("chr > 5 or int > 5", &bindings), TriState::True);
        assert_eq!(eval("chr > 5 or int > 15", &bindings), TriState::False);
    }

    #[test]
    fn test_type_coercion() {
        let bindings: Bindings = [("a", "3")].into_iter().collect();
        assert_eq!(eval("a == 3", &bindings), TriState::True);

        let bindings: Bindings = [("a", "not-a-number")].into_iter().collect();
        assert_eq!(eval("a > 2", &bindings), TriState::Indeterminate);
    }

    #[test]
    fn test_comparison_error_does_not_abort_siblings() {
        let mut bindings = Bindings::new();
        bindings.insert("flag", true).insert("q2", 4);
        assert_eq!(eval("flag > false or q2 == 4", &bindings), TriState::True);
        assert_eq!(eval("flag > false and q2 == 5", &bindings), TriState::False);
    }

    #[test]
    fn test_complex_condition() {
        let mut bindings = Bindings::new();
        bindings.insert("q1", 1).insert("q3", "skip");
        let source = r#"q1 == 1 and (q2 > 3 or q3 != "skip")"#;
        assert_eq!(eval(source, &bindings), TriState::Indeterminate);

        bindings.insert("q2", 4);
        assert_eq!(eval(source, &bindings), TriState::True);

        bindings.insert("q1", 0);
        assert_eq!(eval(source, &bindings), TriState::False);
    }

    #[test]
    fn test_free_text_answer_equality_is_decided() {
        let bindings: Bindings = [("q", "yes")].into_iter().collect();
        assert_eq!(eval("q == 2", &bindings), TriState::False);
        assert_eq!(eval("q == true", &bindings), TriState::False);
        assert_eq!(eval("q != true", &bindings), TriState::True);
        assert_eq!(eval("q > 2", &bindings), TriState::Indeterminate);
    }

    #[test]
    fn test_std_maps_as_environment() {
        let ast = parse("q1 >= 2.5").unwrap();

        let mut map = HashMap::new();
        map.insert("q1".to_string(), Value::from(3));
        assert_eq!(evaluate(&ast, &map), TriState::True);

        let mut tree = BTreeMap::new();
        tree.insert("q1".to_string(), Value::from(2));
        assert_eq!(evaluate(&ast, &tree), TriState::False);
    }

    #[test]
    fn test_bindings_from_json() {
        let json = serde_json::json!({
            "q1": 3,
            "q2": "yes",
            "q3": true,
            "q4": null,
            "q5": 1.5,
        });
        let bindings = Bindings::from_json(&json).unwrap();
        assert_eq!(bindings.len(), 4);
        assert_eq!(bindings.lookup("q1"), Some(&Value::from(3)));
        assert_eq!(bindings.lookup("q4"), None);
        assert_eq!(bindings.lookup("q5"), Some(&Value::from(1.5)));
        assert_eq!(eval("q4 == 1", &bindings), TriState::Indeterminate);
    }

    #[test]
    fn test_bindings_from_json_rejects_nested_values() {
        let json = serde_json::json!({ "q1": [1, 2] });
        assert!(matches!(
            Bindings::from_json(&json),
            Err(ConditionError::InvalidBinding { ref id, .. }) if id == "q1"
        ));
        assert!(Bindings::from_json(&serde_json::json!([1])).is_err());
    }

    #[test]
    fn test_kleene_tables() {
        use TriState::*;
        let all = [True, False, Indeterminate];
        for a in all {
            assert_eq!(a.and(False), False);
            assert_eq!(a.or(True), True);
            assert_eq!(a.and(True), a);
            assert_eq!(a.or(False), a);
        }
        assert_eq!(Indeterminate.and(Indeterminate), Indeterminate);
        assert_eq!(Indeterminate.or(Indeterminate), Indeterminate);
    }

    #[test]
    fn test_tristate_helpers() {
        assert_eq!(TriState::from(true), TriState::True);
        assert_eq!(TriState::Indeterminate.to_option(), None);
        assert_eq!(TriState::False.to_option(), Some(false));
        assert!(TriState::Indeterminate.is_indeterminate());
        assert_eq!(TriState::Indeterminate.to_string(), "indeterminate");
    }
}
