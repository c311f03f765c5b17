//! Policy matching.
//!
//! Decides whether one policy matches one request: every condition in every
//! non-empty group must hold (AND within a group, AND across groups; empty
//! groups are vacuously satisfied; unconditional policies match outright).
//!
//! Every condition evaluated appends one trace entry whether it matched or
//! not, so failed matches stay auditable. A malformed condition path is a
//! configuration error: it short-circuits this policy as non-matching,
//! records an error entry, and leaves the rest of the request untouched.

use tracing::{debug, warn};
use warden_types::{CancelToken, StoreError};

use crate::condition::{Condition, Operand};
use crate::evaluator::{self, ResolvedOperand};
use crate::path::AttributePath;
use crate::policy::{Policy, PolicyKind};
use crate::resolver::{AttributeResolver, RequestContext, Resolved};
use crate::store::AttributeStore;
use crate::trace::{ConditionTrace, EvaluationTrace};

/// Matches policies against a request context.
pub struct PolicyMatcher<'a> {
    resolver: AttributeResolver<'a>,
}

impl<'a> PolicyMatcher<'a> {
    pub fn new(store: &'a dyn AttributeStore) -> Self {
        Self {
            resolver: AttributeResolver::new(store),
        }
    }

    /// Returns whether the policy matches the request.
    ///
    /// All conditions are evaluated (no early exit on the first failure) so
    /// the trace explains the whole policy, not just its first mismatch.
    pub fn matches(
        &self,
        policy: &Policy,
        ctx: &RequestContext<'_>,
        trace: &mut EvaluationTrace,
        cancel: &CancelToken,
    ) -> Result<bool, StoreError> {
        if policy.kind == PolicyKind::Unconditional {
            debug!(policy = %policy.id, "unconditional policy matches");
            return Ok(true);
        }

        let mut all_matched = true;
        for (group, conditions) in policy.condition_groups() {
            for (raw_path, condition) in conditions {
                let path = match AttributePath::parse(raw_path) {
                    Ok(path) => path,
                    Err(err) => {
                        warn!(
                            policy = %policy.id,
                            path = %raw_path,
                            error = %err,
                            "malformed condition path; policy treated as non-matching"
                        );
                        trace.push_policy_error(
                            policy.id,
                            format!("malformed condition path `{raw_path}`: {err}"),
                        );
                        return Ok(false);
                    }
                };

                let actual = self.resolver.resolve(ctx, &path, cancel)?;
                let operand = self.resolve_operand(condition, ctx, cancel)?;
                let outcome = evaluator::evaluate(condition.operator, &actual, &operand);

                trace.push_condition(ConditionTrace {
                    policy_id: policy.id,
                    group,
                    path: raw_path.clone(),
                    operator: condition.operator,
                    actual: actual.into_value(),
                    matched: outcome.matched,
                    warning: outcome.warning,
                });

                if !outcome.matched {
                    all_matched = false;
                }
            }
        }

        debug!(policy = %policy.id, matched = all_matched, "evaluated conditional policy");
        Ok(all_matched)
    }

    /// Dereferences a template operand against the current request context.
    ///
    /// A template that cannot be resolved (malformed path or missing
    /// attribute) yields [`ResolvedOperand::Unresolved`], which the
    /// evaluator turns into a condition failure rather than an error.
    fn resolve_operand(
        &self,
        condition: &Condition,
        ctx: &RequestContext<'_>,
        cancel: &CancelToken,
    ) -> Result<ResolvedOperand, StoreError> {
        match &condition.value {
            Operand::Literal(value) => Ok(ResolvedOperand::Literal(value.clone())),
            Operand::TemplateRef(raw) => {
                let Ok(path) = AttributePath::parse(raw) else {
                    return Ok(ResolvedOperand::Unresolved { path: raw.clone() });
                };
                match self.resolver.resolve(ctx, &path, cancel)? {
                    Resolved::Value(value) => Ok(ResolvedOperand::Literal(value)),
                    Resolved::NotFound => Ok(ResolvedOperand::Unresolved { path: raw.clone() }),
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
