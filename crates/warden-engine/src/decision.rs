//! Authorization decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_abac::policy::Effect;
use warden_abac::trace::{EvaluationTrace, TraceEntry};
use warden_types::PolicyId;

/// Which layer produced the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// The RBAC baseline decided (no policy matched, or none applied).
    Rbac,
    /// A matching ABAC policy decided.
    Abac,
}

/// The outcome of one authorization request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub effect: Effect,
    pub source: DecisionSource,
    /// The policy that decided, or `None` when the RBAC baseline did.
    pub matched_policy_id: Option<PolicyId>,
    /// Every condition evaluated on the way to this decision, in order.
    pub trace: Vec<TraceEntry>,
    pub decided_at: DateTime<Utc>,
}

impl Decision {
    pub(crate) fn rbac(allowed: bool, trace: EvaluationTrace) -> Self {
        Self {
            effect: if allowed { Effect::Allow } else { Effect::Deny },
            source: DecisionSource::Rbac,
            matched_policy_id: None,
            trace: trace.into_entries(),
            decided_at: Utc::now(),
        }
    }

    pub(crate) fn abac(effect: Effect, policy_id: PolicyId, trace: EvaluationTrace) -> Self {
        Self {
            effect,
            source: DecisionSource::Abac,
            matched_policy_id: Some(policy_id),
            trace: trace.into_entries(),
            decided_at: Utc::now(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.effect == Effect::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rbac_decision_has_no_policy() {
        let decision = Decision::rbac(true, EvaluationTrace::new());
        assert!(decision.is_allowed());
        assert_eq!(decision.source, DecisionSource::Rbac);
        assert_eq!(decision.matched_policy_id, None);

        let denied = Decision::rbac(false, EvaluationTrace::new());
        assert!(!denied.is_allowed());
    }

    #[test]
    fn test_abac_decision_names_the_policy() {
        let decision = Decision::abac(Effect::Deny, PolicyId::new(7), EvaluationTrace::new());
        assert!(!decision.is_allowed());
        assert_eq!(decision.source, DecisionSource::Abac);
        assert_eq!(decision.matched_policy_id, Some(PolicyId::new(7)));
    }

    #[test]
    fn test_decision_json_shape() {
        // The wire shape the HTTP layer maps to:
        // {effect, source, matched_policy_id, trace, decided_at}
        let decision = Decision::abac(Effect::Allow, PolicyId::new(3), EvaluationTrace::new());
        let json = serde_json::to_value(&decision).unwrap();

        assert_eq!(json["effect"], "allow");
        assert_eq!(json["source"], "abac");
        assert_eq!(json["matched_policy_id"], 3);
        assert!(json["trace"].is_array());
        assert!(json["decided_at"].is_string());

        let rbac = serde_json::to_value(Decision::rbac(false, EvaluationTrace::new())).unwrap();
        assert_eq!(rbac["effect"], "deny");
        assert_eq!(rbac["source"], "rbac");
        assert!(rbac["matched_policy_id"].is_null());
    }
}
