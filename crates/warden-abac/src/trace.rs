//! Evaluation trace.
//!
//! Every condition evaluated during one authorization request appends an
//! entry, whether it matched or not, so a decision can be explained and
//! audited after the fact. Configuration errors (malformed paths, invalid
//! policies) are recorded with an error entry instead of aborting the
//! request.

use serde::{Deserialize, Serialize};
use warden_types::{AttributeValue, PolicyId};

use crate::condition::ConditionOperator;
use crate::policy::ConditionGroup;

/// One evaluated condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionTrace {
    pub policy_id: PolicyId,
    pub group: ConditionGroup,
    /// The attribute path the condition was keyed under.
    pub path: String,
    pub operator: ConditionOperator,
    /// The resolved attribute value; `None` means the attribute was not
    /// found.
    pub actual: Option<AttributeValue>,
    pub matched: bool,
    /// Evaluation warning (unresolved template, invalid regex pattern).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// A policy that could not be evaluated at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyErrorTrace {
    pub policy_id: PolicyId,
    /// What was wrong: a malformed condition path or an invalid policy
    /// definition. The policy was treated as non-matching.
    pub error: String,
}

/// An entry in the evaluation trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEntry {
    Condition(ConditionTrace),
    PolicyError(PolicyErrorTrace),
}

impl TraceEntry {
    pub fn policy_id(&self) -> PolicyId {
        match self {
            TraceEntry::Condition(c) => c.policy_id,
            TraceEntry::PolicyError(e) => e.policy_id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TraceEntry::PolicyError(_))
    }
}

/// The ordered trace of one authorization request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationTrace {
    entries: Vec<TraceEntry>,
}

impl EvaluationTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_condition(&mut self, entry: ConditionTrace) {
        self.entries.push(TraceEntry::Condition(entry));
    }

    pub fn push_policy_error(&mut self, policy_id: PolicyId, error: impl Into<String>) {
        self.entries.push(TraceEntry::PolicyError(PolicyErrorTrace {
            policy_id,
            error: error.into(),
        }));
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<TraceEntry> {
        self.entries
    }
}
