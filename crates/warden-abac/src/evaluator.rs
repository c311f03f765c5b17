//! Condition evaluation.
//!
//! Pure comparison logic: given a condition's operator, the resolved actual
//! value, and the resolved operand, produce a boolean outcome. No I/O
//! happens here; template dereferencing runs before this point, and an
//! operand that failed to resolve arrives as [`ResolvedOperand::Unresolved`].
//!
//! Missing data never satisfies a positive comparison: a not-found actual
//! value fails every operator except `exists`/`not_exists`, and an
//! unresolved template operand fails the condition outright.

use regex::Regex;
use warden_types::AttributeValue;

use crate::condition::ConditionOperator;
use crate::resolver::Resolved;

// ============================================================================
// Inputs & Outcome
// ============================================================================

/// A condition operand after template dereferencing.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedOperand {
    Literal(AttributeValue),
    /// A template whose path did not resolve (missing attribute, or a
    /// malformed template path). Conditions over it evaluate false.
    Unresolved { path: String },
}

/// The outcome of evaluating one condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub matched: bool,
    /// Set when the condition failed for a reason worth surfacing in the
    /// trace: unresolved template, invalid regex pattern, ill-typed
    /// operand.
    pub warning: Option<String>,
}

impl Outcome {
    fn of(matched: bool) -> Self {
        Self {
            matched,
            warning: None,
        }
    }

    fn warn(matched: bool, warning: impl Into<String>) -> Self {
        Self {
            matched,
            warning: Some(warning.into()),
        }
    }

    fn negate(mut self) -> Self {
        self.matched = !self.matched;
        self
    }
}

// ============================================================================
// Evaluation
// ============================================================================

/// Evaluates one condition against a resolved actual value.
pub fn evaluate(
    operator: ConditionOperator,
    actual: &Resolved,
    operand: &ResolvedOperand,
) -> Outcome {
    // Existence operators only look at resolution and ignore the operand.
    match operator {
        ConditionOperator::Exists => return Outcome::of(actual.is_found()),
        ConditionOperator::NotExists => return Outcome::of(!actual.is_found()),
        _ => {}
    }

    let Some(actual) = actual.value() else {
        return Outcome::of(false);
    };

    let operand = match operand {
        ResolvedOperand::Literal(value) => value,
        ResolvedOperand::Unresolved { path } => {
            return Outcome::warn(false, format!("template `{{{{{path}}}}}` did not resolve"));
        }
    };

    match operator {
        ConditionOperator::Eq => Outcome::of(values_equal(actual, operand)),
        ConditionOperator::Ne => Outcome::of(!values_equal(actual, operand)),
        ConditionOperator::Gt => numeric_compare(actual, operand, |ord| ord.is_gt()),
        ConditionOperator::Lt => numeric_compare(actual, operand, |ord| ord.is_lt()),
        ConditionOperator::Gte => numeric_compare(actual, operand, |ord| ord.is_ge()),
        ConditionOperator::Lte => numeric_compare(actual, operand, |ord| ord.is_le()),
        ConditionOperator::In => membership(actual, operand),
        ConditionOperator::NotIn => membership(actual, operand).negate(),
        ConditionOperator::Regex => regex_match(actual, operand),
        ConditionOperator::Exists | ConditionOperator::NotExists => unreachable!(),
    }
}

/// Equality with numeric coercion: when both sides look numeric they compare
/// as numbers (`"3"` equals `3`), otherwise structurally.
#[allow(clippy::float_cmp)]
fn values_equal(a: &AttributeValue, b: &AttributeValue) -> bool {
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return x == y;
    }
    a == b
}

/// Order comparison; non-numeric sides make the condition false.
fn numeric_compare(
    actual: &AttributeValue,
    operand: &AttributeValue,
    accept: fn(std::cmp::Ordering) -> bool,
) -> Outcome {
    let (Some(a), Some(b)) = (actual.as_number(), operand.as_number()) else {
        return Outcome::of(false);
    };
    match a.partial_cmp(&b) {
        Some(ord) => Outcome::of(accept(ord)),
        // NaN on either side compares as nothing.
        None => Outcome::of(false),
    }
}

/// Membership in a list operand, element-wise with `eq` semantics.
fn membership(actual: &AttributeValue, operand: &AttributeValue) -> Outcome {
    let Some(items) = operand.as_list() else {
        return Outcome::warn(
            false,
            format!(
                "`in` operand is {}, expected a list",
                operand.type_name()
            ),
        );
    };
    Outcome::of(items.iter().any(|item| values_equal(actual, item)))
}

/// Pattern match over the actual value coerced to a string.
fn regex_match(actual: &AttributeValue, operand: &AttributeValue) -> Outcome {
    let Some(pattern) = operand.as_str() else {
        return Outcome::warn(
            false,
            format!(
                "regex pattern is {}, expected a string",
                operand.type_name()
            ),
        );
    };
    match Regex::new(pattern) {
        Ok(re) => Outcome::of(re.is_match(&actual.to_string())),
        Err(err) => Outcome::warn(false, format!("invalid regex pattern: {err}")),
    }
}

// ============================================================================
// Tests
// ============================================================================
