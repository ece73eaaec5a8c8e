//! Declarative per-field validation.
//!
//! A [`Validator`] is an ordered list of rules. Every rule is evaluated, so a
//! single pass reports all violations at once instead of stopping at the first.

use serde::Serialize;

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

/// Outcome of running a [`Validator`] against an input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn has_violations(&self) -> bool {
        !self.0.is_empty()
    }

    /// Violations in rule declaration order.
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }
}

impl std::fmt::Display for Violations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect();
        write!(f, "{}", messages.join(", "))
    }
}

struct Rule<T> {
    field: &'static str,
    message: &'static str,
    check: fn(&T) -> bool,
}

/// Ordered rule set for inputs of type `T`.
pub struct Validator<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Validator<T> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Declare a rule. `check` returns `true` when the input is acceptable.
    pub fn rule(mut self, field: &'static str, message: &'static str, check: fn(&T) -> bool) -> Self {
        self.rules.push(Rule {
            field,
            message,
            check,
        });
        self
    }

    pub fn validate(&self, input: &T) -> Violations {
        Violations(
            self.rules
                .iter()
                .filter(|rule| !(rule.check)(input))
                .map(|rule| Violation {
                    field: rule.field,
                    message: rule.message.to_string(),
                })
                .collect(),
        )
    }
}

impl<T> Default for Validator<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Predicate helper: the string has at least one non-whitespace character.
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}
