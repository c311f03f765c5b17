//! Policy selection.
//!
//! Determines which policies participate in a request and in what order:
//! the union of globally-assigned policies, policies assigned to the
//! subject, to any role the subject holds, and to the resource,
//! de-duplicated by id and sorted ascending by priority with ascending id
//! as the tie-break. The resulting order doubles as the first-applicable
//! resolution order, so it must be total and deterministic.

use std::collections::BTreeMap;

use tracing::debug;
use warden_types::{CancelToken, PolicyId, RoleId, StoreError};

use crate::policy::Policy;
use crate::resolver::RequestContext;
use crate::store::PolicyStore;

/// Selects and orders candidate policies for a request.
pub struct PolicySelector<'a> {
    store: &'a dyn PolicyStore,
}

impl<'a> PolicySelector<'a> {
    pub fn new(store: &'a dyn PolicyStore) -> Self {
        Self { store }
    }

    /// Returns the request's candidate policies in evaluation order.
    ///
    /// `roles` are the roles the subject currently holds; the caller
    /// supplies them so a single role lookup serves both the RBAC baseline
    /// and policy selection.
    pub fn select(
        &self,
        ctx: &RequestContext<'_>,
        roles: &[RoleId],
        cancel: &CancelToken,
    ) -> Result<Vec<Policy>, StoreError> {
        // A policy reachable through several assignment paths must appear
        // once; keying by id de-duplicates as we union.
        let mut candidates: BTreeMap<PolicyId, Policy> = BTreeMap::new();

        for policy in self.store.global_policies(cancel)? {
            candidates.entry(policy.id).or_insert(policy);
        }
        for policy in self.store.policies_for_subject(ctx.subject, cancel)? {
            candidates.entry(policy.id).or_insert(policy);
        }
        for role in roles {
            for policy in self.store.policies_for_role(*role, cancel)? {
                candidates.entry(policy.id).or_insert(policy);
            }
        }
        if let Some(resource) = ctx.resource {
            for policy in self.store.policies_for_resource(resource, cancel)? {
                candidates.entry(policy.id).or_insert(policy);
            }
        }

        let mut ordered: Vec<Policy> = candidates.into_values().collect();
        ordered.sort_by_key(|policy| (policy.priority, policy.id));

        debug!(
            subject = %ctx.subject,
            candidates = ordered.len(),
            "selected candidate policies"
        );
        Ok(ordered)
    }
}

// ============================================================================
// Tests
// ============================================================================
