//! ABAC policy definitions.
//!
//! A policy carries four condition groups (subject, resource, action, and
//! environment), each a map from attribute path to condition. A conditional
//! policy matches when every condition in every non-empty group holds
//! (AND within a group, AND across groups; empty groups are vacuous). An
//! unconditional policy has no conditions and always matches. Lower
//! priority numbers are evaluated first.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use warden_types::{PolicyId, ResourceId, RoleId, SubjectId};

use crate::condition::Condition;

// ============================================================================
// Effect
// ============================================================================

/// The outcome a matching policy asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Grant access.
    Allow,
    /// Deny access.
    Deny,
}

impl Default for Effect {
    /// Defaults to `Deny` (safe default: deny unless explicitly allowed).
    fn default() -> Self {
        Self::Deny
    }
}

// ============================================================================
// Policy Kind
// ============================================================================

/// Whether a policy carries conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Matches when every condition in every non-empty group holds.
    Conditional,
    /// No conditions; always matches.
    Unconditional,
}

// ============================================================================
// Condition Groups
// ============================================================================

/// The four condition groups of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionGroup {
    Subject,
    Resource,
    Action,
    Environment,
}

impl std::fmt::Display for ConditionGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionGroup::Subject => write!(f, "subject_conditions"),
            ConditionGroup::Resource => write!(f, "resource_conditions"),
            ConditionGroup::Action => write!(f, "action_conditions"),
            ConditionGroup::Environment => write!(f, "environment_conditions"),
        }
    }
}

/// A path-keyed set of conditions. `BTreeMap` keeps evaluation (and the
/// trace it produces) in a deterministic order.
pub type ConditionMap = BTreeMap<String, Condition>;

// ============================================================================
// Policy
// ============================================================================

/// A malformed policy.
///
/// Policy errors are configuration errors: the engine records them in the
/// trace and treats the policy as non-matching without aborting the request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("policy {0} has an empty name")]
    EmptyName(PolicyId),

    #[error("policy {0} is unconditional but carries {1} condition(s)")]
    UnconditionalWithConditions(PolicyId, usize),
}

/// A named, prioritized rule combining condition groups with an effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub name: String,
    pub kind: PolicyKind,
    /// Evaluation priority. Lower values are evaluated first; ties are
    /// broken by ascending policy id.
    pub priority: i32,
    #[serde(default)]
    pub subject_conditions: ConditionMap,
    #[serde(default)]
    pub resource_conditions: ConditionMap,
    #[serde(default)]
    pub action_conditions: ConditionMap,
    #[serde(default)]
    pub environment_conditions: ConditionMap,
    pub effect: Effect,
}

impl Policy {
    /// Creates a conditional policy with no conditions yet; add them with
    /// the `with_*_condition` builders.
    pub fn conditional(
        id: PolicyId,
        name: impl Into<String>,
        priority: i32,
        effect: Effect,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: PolicyKind::Conditional,
            priority,
            subject_conditions: ConditionMap::new(),
            resource_conditions: ConditionMap::new(),
            action_conditions: ConditionMap::new(),
            environment_conditions: ConditionMap::new(),
            effect,
        }
    }

    /// Creates an unconditional policy: all groups empty, always matches.
    pub fn unconditional(
        id: PolicyId,
        name: impl Into<String>,
        priority: i32,
        effect: Effect,
    ) -> Self {
        Self {
            kind: PolicyKind::Unconditional,
            ..Self::conditional(id, name, priority, effect)
        }
    }

    /// Adds a condition on a subject attribute (builder pattern).
    pub fn with_subject_condition(mut self, path: impl Into<String>, cond: Condition) -> Self {
        self.subject_conditions.insert(path.into(), cond);
        self
    }

    /// Adds a condition on a resource attribute (builder pattern).
    pub fn with_resource_condition(mut self, path: impl Into<String>, cond: Condition) -> Self {
        self.resource_conditions.insert(path.into(), cond);
        self
    }

    /// Adds a condition on the action verb (builder pattern).
    pub fn with_action_condition(mut self, path: impl Into<String>, cond: Condition) -> Self {
        self.action_conditions.insert(path.into(), cond);
        self
    }

    /// Adds a condition on an environment attribute (builder pattern).
    pub fn with_environment_condition(mut self, path: impl Into<String>, cond: Condition) -> Self {
        self.environment_conditions.insert(path.into(), cond);
        self
    }

    /// The groups in evaluation order, paired with their conditions.
    pub fn condition_groups(&self) -> [(ConditionGroup, &ConditionMap); 4] {
        [
            (ConditionGroup::Subject, &self.subject_conditions),
            (ConditionGroup::Resource, &self.resource_conditions),
            (ConditionGroup::Action, &self.action_conditions),
            (ConditionGroup::Environment, &self.environment_conditions),
        ]
    }

    /// Total condition count across all groups.
    pub fn condition_count(&self) -> usize {
        self.condition_groups()
            .iter()
            .map(|(_, conditions)| conditions.len())
            .sum()
    }

    /// Checks the policy's structural invariants.
    ///
    /// The one invariant a typed policy can still violate is kind
    /// consistency: an unconditional policy must carry no conditions.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.name.trim().is_empty() {
            return Err(PolicyError::EmptyName(self.id));
        }
        if self.kind == PolicyKind::Unconditional {
            let count = self.condition_count();
            if count > 0 {
                return Err(PolicyError::UnconditionalWithConditions(self.id, count));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Policy Assignment
// ============================================================================

/// The scope a policy is bound to.
///
/// A policy participates in a request when any of its assignments covers the
/// request: globally, via the subject, via a role the subject holds, or via
/// the resource. A policy with no assignment and not marked global is inert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "id")]
pub enum PolicyScope {
    Global,
    Subject(SubjectId),
    Role(RoleId),
    Resource(ResourceId),
}

/// Binds a policy to a scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyAssignment {
    pub policy_id: PolicyId,
    #[serde(flatten)]
    pub scope: PolicyScope,
}

impl PolicyAssignment {
    pub fn new(policy_id: PolicyId, scope: PolicyScope) -> Self {
        Self { policy_id, scope }
    }

    pub fn global(policy_id: PolicyId) -> Self {
        Self::new(policy_id, PolicyScope::Global)
    }
}

// ============================================================================
// Tests
// ============================================================================
