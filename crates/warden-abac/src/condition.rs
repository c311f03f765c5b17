//! Condition definitions.
//!
//! A condition is an operator plus an operand. Operands are either literal
//! values or template references: a `{{path}}` string that dereferences
//! another attribute of the same request at evaluation time, so a policy can
//! say `user.department eq {{resource.owner}}` without hardcoding either
//! side.

use serde::{Deserialize, Serialize};
use warden_types::AttributeValue;

// ============================================================================
// Operator
// ============================================================================

/// The closed set of condition operators.
///
/// Dispatch happens in a single `match` in the evaluator; adding an operator
/// is a compile-time-checked change, not a registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    /// Equal, with numeric coercion when both sides look numeric.
    Eq,
    /// Negation of `Eq`.
    Ne,
    /// Numerically greater than.
    Gt,
    /// Numerically less than.
    Lt,
    /// Numerically greater than or equal.
    Gte,
    /// Numerically less than or equal.
    Lte,
    /// Membership in a list operand.
    In,
    /// Negation of `In`.
    NotIn,
    /// The actual value, coerced to a string, matches the operand pattern.
    Regex,
    /// The attribute resolved to some value (null counts as present).
    Exists,
    /// Negation of `Exists`.
    NotExists,
}

impl std::fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConditionOperator::Eq => "eq",
            ConditionOperator::Ne => "ne",
            ConditionOperator::Gt => "gt",
            ConditionOperator::Lt => "lt",
            ConditionOperator::Gte => "gte",
            ConditionOperator::Lte => "lte",
            ConditionOperator::In => "in",
            ConditionOperator::NotIn => "not_in",
            ConditionOperator::Regex => "regex",
            ConditionOperator::Exists => "exists",
            ConditionOperator::NotExists => "not_exists",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Operand
// ============================================================================

/// A condition operand: a literal value, or a reference to another attribute
/// of the current request.
///
/// Template detection happens at the data boundary: a string literal shaped
/// `{{path}}` deserializes as `TemplateRef`, everything else as `Literal`.
/// Comparison logic never sees raw template strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(AttributeValue),
    /// The raw path inside the braces; parsed and resolved at evaluation
    /// time against the current request context.
    TemplateRef(String),
}

impl Operand {
    /// Classifies an attribute value, turning `{{path}}` strings into
    /// template references.
    pub fn from_value(value: AttributeValue) -> Self {
        if let AttributeValue::Str(s) = &value {
            if let Some(path) = template_path(s) {
                return Operand::TemplateRef(path);
            }
        }
        Operand::Literal(value)
    }

    pub fn literal(value: impl Into<AttributeValue>) -> Self {
        Operand::Literal(value.into())
    }

    pub fn template(path: impl Into<String>) -> Self {
        Operand::TemplateRef(path.into())
    }
}

impl Default for Operand {
    fn default() -> Self {
        Operand::Literal(AttributeValue::Null)
    }
}

impl Serialize for Operand {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Operand::Literal(value) => value.serialize(serializer),
            Operand::TemplateRef(path) => serializer.serialize_str(&format!("{{{{{path}}}}}")),
        }
    }
}

impl<'de> Deserialize<'de> for Operand {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = AttributeValue::deserialize(deserializer)?;
        Ok(Operand::from_value(value))
    }
}

/// Extracts the path from a `{{path}}` template string.
///
/// Returns `None` for anything that is not exactly one brace-wrapped,
/// non-empty path. Whitespace around the path is tolerated
/// (`{{ resource.owner }}`).
pub(crate) fn template_path(s: &str) -> Option<String> {
    let inner = s.strip_prefix("{{")?.strip_suffix("}}")?;
    let inner = inner.trim();
    if inner.is_empty() || inner.contains('{') || inner.contains('}') {
        return None;
    }
    Some(inner.to_string())
}

// ============================================================================
// Condition
// ============================================================================

/// One declarative check: operator plus operand.
///
/// The attribute being tested is named by the group map key of the policy
/// that carries the condition, not by the condition itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub operator: ConditionOperator,
    /// Ignored by `exists`/`not_exists`, which only look at resolution.
    #[serde(default)]
    pub value: Operand,
}

impl Condition {
    pub fn new(operator: ConditionOperator, value: Operand) -> Self {
        Self { operator, value }
    }

    /// A condition against a literal operand.
    pub fn literal(operator: ConditionOperator, value: impl Into<AttributeValue>) -> Self {
        Self::new(operator, Operand::literal(value))
    }

    /// A condition whose operand dereferences another attribute.
    pub fn template(operator: ConditionOperator, path: impl Into<String>) -> Self {
        Self::new(operator, Operand::template(path))
    }

    /// `exists`: the attribute resolves to some value.
    pub fn exists() -> Self {
        Self::new(ConditionOperator::Exists, Operand::default())
    }

    /// `not_exists`: the attribute does not resolve.
    pub fn not_exists() -> Self {
        Self::new(ConditionOperator::NotExists, Operand::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
