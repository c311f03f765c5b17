//! The decision engine.
//!
//! Combines the RBAC baseline with the prioritized ABAC policy set,
//! first-applicable: the RBAC verdict is computed up front as the fallback,
//! candidate policies are evaluated in (priority, id) order, and the first
//! match decides. When nothing matches, the fallback stands. Per-policy
//! configuration errors are contained to the offending policy and recorded
//! in the trace; only store failure, an invalid request, or caller
//! cancellation fail the whole check.

use std::sync::Arc;

use tracing::{info, warn};
use warden_abac::matcher::PolicyMatcher;
use warden_abac::selector::PolicySelector;
use warden_abac::store::{AttributeStore, PolicyStore};
use warden_abac::trace::EvaluationTrace;
use warden_rbac::baseline::{BaselineChecker, PermissionCache};
use warden_rbac::store::RoleStore;
use warden_types::{CancelToken, RoleId};

use crate::decision::Decision;
use crate::error::{EngineError, Result};
use crate::request::AuthorizationRequest;

/// The authorization decision engine.
///
/// Holds no per-request state: one engine serves arbitrarily many
/// concurrent requests, and decisions are invariant to arrival order. The
/// only shared mutable structure is the RBAC permission cache inside the
/// baseline checker.
pub struct Engine {
    baseline: BaselineChecker,
    policy_store: Arc<dyn PolicyStore>,
    attribute_store: Arc<dyn AttributeStore>,
}

impl Engine {
    pub fn new(
        role_store: Arc<dyn RoleStore>,
        policy_store: Arc<dyn PolicyStore>,
        attribute_store: Arc<dyn AttributeStore>,
    ) -> Self {
        Self {
            baseline: BaselineChecker::new(role_store),
            policy_store,
            attribute_store,
        }
    }

    /// The RBAC permission cache, for wiring push-based invalidation into
    /// the role store (see [`warden_rbac::store::RoleChangeListener`]).
    pub fn permission_cache(&self) -> Arc<PermissionCache> {
        self.baseline.cache()
    }

    /// Authorizes a request.
    pub fn authorize(&self, request: &AuthorizationRequest) -> Result<Decision> {
        self.authorize_with_cancel(request, &CancelToken::new())
    }

    /// Authorizes a request under a caller-owned cancellation token.
    ///
    /// The token is checked between evaluation phases and handed into every
    /// store call; cancellation surfaces as [`EngineError::Cancelled`],
    /// never as an allow or deny.
    pub fn authorize_with_cancel(
        &self,
        request: &AuthorizationRequest,
        cancel: &CancelToken,
    ) -> Result<Decision> {
        request.validate()?;
        ensure_live(cancel)?;

        // The baseline verdict is the fallback for the whole request.
        let grants = self.baseline.grants_for(&request.subject_id, cancel)?;
        let baseline_allowed = grants.allows(&request.resource_type, &request.action);
        let roles: Vec<RoleId> = grants.roles().collect();
        ensure_live(cancel)?;

        let ctx = request.context();
        let candidates = PolicySelector::new(&*self.policy_store).select(&ctx, &roles, cancel)?;

        let mut trace = EvaluationTrace::new();
        let matcher = PolicyMatcher::new(&*self.attribute_store);

        for policy in &candidates {
            ensure_live(cancel)?;

            // An invalid policy definition is contained: trace it, skip it,
            // keep evaluating the remaining candidates.
            if let Err(err) = policy.validate() {
                warn!(policy = %policy.id, error = %err, "skipping invalid policy");
                trace.push_policy_error(policy.id, err.to_string());
                continue;
            }

            if matcher.matches(policy, &ctx, &mut trace, cancel)? {
                info!(
                    subject = %request.subject_id,
                    action = %request.action,
                    resource_type = %request.resource_type,
                    policy = %policy.id,
                    effect = ?policy.effect,
                    "authorization decided by policy"
                );
                return Ok(Decision::abac(policy.effect, policy.id, trace));
            }
        }

        info!(
            subject = %request.subject_id,
            action = %request.action,
            resource_type = %request.resource_type,
            allowed = baseline_allowed,
            candidates = candidates.len(),
            "authorization fell through to RBAC baseline"
        );
        Ok(Decision::rbac(baseline_allowed, trace))
    }
}

fn ensure_live(cancel: &CancelToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(EngineError::Cancelled);
    }
    Ok(())
}
