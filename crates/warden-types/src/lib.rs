//! # warden-types: Core types for Warden
//!
//! This crate contains shared types used across the Warden authorization
//! engine:
//! - Entity IDs ([`SubjectId`], [`ResourceId`], [`RoleId`], [`PermissionId`], [`PolicyId`])
//! - Attribute values ([`AttributeValue`])
//! - Attribute ownership ([`EntityType`])
//! - Collaborator failures ([`StoreError`])
//! - Cooperative cancellation ([`CancelToken`])

use std::{
    fmt::Display,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Entity IDs
// ============================================================================

/// Unique identifier for a subject (user or service account).
///
/// Issued by the identity layer; opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique identifier for a protected resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique identifier for a role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct RoleId(u64);

impl RoleId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RoleId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<RoleId> for u64 {
    fn from(id: RoleId) -> Self {
        id.0
    }
}

/// Unique identifier for a permission.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct PermissionId(u64);

impl PermissionId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for PermissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PermissionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<PermissionId> for u64 {
    fn from(id: PermissionId) -> Self {
        id.0
    }
}

/// Unique identifier for a policy.
///
/// The derived ordering is load-bearing: policies sharing a priority are
/// evaluated in ascending id order, so `PolicyId` comparisons decide
/// equal-priority ties.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct PolicyId(u64);

impl PolicyId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for PolicyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PolicyId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<PolicyId> for u64 {
    fn from(id: PolicyId) -> Self {
        id.0
    }
}

// ============================================================================
// Attribute Values
// ============================================================================

/// The kind of entity an attribute is attached to.
///
/// Subject and resource attributes are keyed by entity id in the attribute
/// store; environment attributes are supplied per-request by the caller and
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Subject,
    Resource,
    Environment,
}

impl Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Subject => write!(f, "subject"),
            EntityType::Resource => write!(f, "resource"),
            EntityType::Environment => write!(f, "environment"),
        }
    }
}

/// A typed attribute value.
///
/// The closed set of shapes an attribute (or a condition operand) can take.
/// Serialized untagged, so the JSON forms are the natural ones:
/// `"eng"`, `3`, `true`, `["a", "b"]`, `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Returns the numeric reading of this value, if it looks numeric.
    ///
    /// Numbers read as themselves; strings read as numbers when they parse
    /// as one (`"3"` reads as `3.0`). Everything else has no numeric
    /// reading. Comparison operators use this for the coercion rule of
    /// "both sides look numeric".
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Num(n) => Some(*n),
            AttributeValue::Str(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Returns the inner string for `Str` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the inner list for `List` values.
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// A short name for the value's shape, used in trace notes.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Null => "null",
            AttributeValue::Bool(_) => "bool",
            AttributeValue::Num(_) => "number",
            AttributeValue::Str(_) => "string",
            AttributeValue::List(_) => "list",
        }
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Null => write!(f, "null"),
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Num(n) => write!(f, "{n}"),
            AttributeValue::Str(s) => write!(f, "{s}"),
            AttributeValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Str(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Num(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Num(value as f64)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        AttributeValue::Num(f64::from(value))
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(values: Vec<T>) -> Self {
        AttributeValue::List(values.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Store Errors
// ============================================================================

/// Failure of a collaborator store (role, policy, or attribute store).
///
/// Store failures are never converted into allow/deny decisions: the engine
/// propagates them so the caller decides the user-visible outcome
/// (typically deny). Missing data is NOT an error; stores report it as an
/// absent value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store failed or is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backing store did not answer within the caller's deadline.
    #[error("store lookup timed out: {0}")]
    Timeout(String),
}

// ============================================================================
// Cancellation
// ============================================================================

/// Cooperative cancellation signal.
///
/// Cloned tokens share one flag. The engine checks the token between
/// evaluation phases and hands it into every store call, so a caller-side
/// timeout can stop a slow lookup from hanging an authorization check.
/// In-process stores may ignore it; network-backed adapters should poll it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_id_roundtrip() {
        let id = SubjectId::new("user-42");
        assert_eq!(id.as_str(), "user-42");
        assert_eq!(id.to_string(), "user-42");
        assert_eq!(SubjectId::from("user-42"), id);
    }

    #[test]
    fn test_policy_id_ordering() {
        // Ascending id is the equal-priority tie-break; the derived Ord
        // must follow the numeric value.
        assert!(PolicyId::new(1) < PolicyId::new(2));
        assert!(PolicyId::new(99) < PolicyId::new(100));
    }

    #[test]
    fn test_attribute_value_as_number() {
        assert_eq!(AttributeValue::Num(3.0).as_number(), Some(3.0));
        assert_eq!(AttributeValue::from("3").as_number(), Some(3.0));
        assert_eq!(AttributeValue::from(" 2.5 ").as_number(), Some(2.5));
        assert_eq!(AttributeValue::from("eng").as_number(), None);
        assert_eq!(AttributeValue::Bool(true).as_number(), None);
        assert_eq!(AttributeValue::Null.as_number(), None);
    }

    #[test]
    fn test_attribute_value_untagged_serde() {
        let cases = [
            (AttributeValue::Null, "null"),
            (AttributeValue::Bool(true), "true"),
            (AttributeValue::Num(3.0), "3.0"),
            (AttributeValue::from("eng"), "\"eng\""),
        ];
        for (value, json) in cases {
            assert_eq!(serde_json::to_string(&value).unwrap(), json);
            let back: AttributeValue = serde_json::from_str(json).unwrap();
            assert_eq!(back, value);
        }

        let list: AttributeValue = serde_json::from_str("[\"a\", 1]").unwrap();
        assert_eq!(
            list,
            AttributeValue::List(vec![AttributeValue::from("a"), AttributeValue::Num(1.0)])
        );
    }

    #[test]
    fn test_cancel_token_shared_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable("attribute store connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "store unavailable: attribute store connection refused"
        );
    }
}
