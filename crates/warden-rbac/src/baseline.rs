//! RBAC baseline checking.
//!
//! The baseline answers "do the subject's roles grant this (resource type,
//! action)?" independent of attributes. Effective permissions are cached per
//! subject and invalidated by push when roles or assignments mutate.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;
use warden_types::{CancelToken, RoleId, StoreError, SubjectId};

use crate::permissions::PermissionSet;
use crate::store::{RoleChangeListener, RoleStore};

// ============================================================================
// Subject Grants
// ============================================================================

/// A subject's effective grants at one point in time: the roles held and
/// the union of permission keys across them.
#[derive(Debug, Clone)]
pub struct SubjectGrants {
    roles: BTreeSet<RoleId>,
    permissions: Arc<PermissionSet>,
}

impl SubjectGrants {
    /// Returns whether the grants cover the given (resource type, action).
    pub fn allows(&self, resource_type: &str, action: &str) -> bool {
        self.permissions.allows(resource_type, action)
    }

    /// The roles the subject held when this snapshot was computed.
    pub fn roles(&self) -> impl Iterator<Item = RoleId> + '_ {
        self.roles.iter().copied()
    }

    pub fn permission_count(&self) -> usize {
        self.permissions.len()
    }
}

// ============================================================================
// Permission Cache
// ============================================================================

/// Per-subject cache of effective permissions.
///
/// Reads proceed concurrently; invalidation takes the write lock, so a
/// write is mutually exclusive with reads of the same entry. Invalidation
/// is pushed synchronously from the role store on mutation, never
/// time-based, so neither stale elevation nor stale revocation can
/// outlive the mutation that caused it.
#[derive(Default)]
pub struct PermissionCache {
    entries: RwLock<HashMap<SubjectId, SubjectGrants>>,
}

impl PermissionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, subject: &SubjectId) -> Option<SubjectGrants> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(subject)
            .cloned()
    }

    fn put(&self, subject: SubjectId, grants: SubjectGrants) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subject, grants);
    }

    /// Drops the cached grants for one subject.
    pub fn invalidate_subject(&self, subject: &SubjectId) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(subject);
    }

    /// Drops the cached grants of every subject holding the given role.
    pub fn invalidate_role(&self, role: RoleId) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, grants| !grants.roles.contains(&role));
    }

    /// Drops everything.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RoleChangeListener for PermissionCache {
    fn subject_changed(&self, subject: &SubjectId) {
        self.invalidate_subject(subject);
    }

    fn role_changed(&self, role: RoleId) {
        self.invalidate_role(role);
    }
}

// ============================================================================
// Baseline Checker
// ============================================================================

/// Computes the RBAC baseline verdict for authorization requests.
pub struct BaselineChecker {
    store: Arc<dyn RoleStore>,
    cache: Arc<PermissionCache>,
}

impl BaselineChecker {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self {
            store,
            cache: Arc::new(PermissionCache::new()),
        }
    }

    /// The cache, for registering as a change listener on the role store.
    pub fn cache(&self) -> Arc<PermissionCache> {
        Arc::clone(&self.cache)
    }

    /// Returns the subject's effective grants, computing and caching them
    /// on first use.
    pub fn grants_for(
        &self,
        subject: &SubjectId,
        cancel: &CancelToken,
    ) -> Result<SubjectGrants, StoreError> {
        if let Some(grants) = self.cache.get(subject) {
            return Ok(grants);
        }

        let roles = self.store.roles_for_subject(subject, cancel)?;
        let mut role_ids = BTreeSet::new();
        let mut permissions = PermissionSet::empty();
        for role in &roles {
            role_ids.insert(role.id);
            for permission in self.store.permissions_for_role(role.id, cancel)? {
                permissions.grant(permission.key());
            }
        }

        let grants = SubjectGrants {
            roles: role_ids,
            permissions: Arc::new(permissions),
        };
        debug!(
            subject = %subject,
            roles = grants.roles.len(),
            permissions = grants.permission_count(),
            "computed effective permissions"
        );
        self.cache.put(subject.clone(), grants.clone());
        Ok(grants)
    }

    /// Returns whether the subject's roles grant `action` on `resource_type`.
    pub fn check_baseline(
        &self,
        subject: &SubjectId,
        resource_type: &str,
        action: &str,
        cancel: &CancelToken,
    ) -> Result<bool, StoreError> {
        Ok(self.grants_for(subject, cancel)?.allows(resource_type, action))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Permission;
    use crate::roles::Role;
    use crate::store::InMemoryRoleStore;
    use warden_types::PermissionId;

    fn fixture() -> (Arc<InMemoryRoleStore>, BaselineChecker) {
        let store = Arc::new(InMemoryRoleStore::new());
        store.insert_permission(Permission::new(PermissionId::new(1), "env_var", "read"));
        store.insert_permission(Permission::new(PermissionId::new(2), "env_var", "write"));
        store.insert_permission(Permission::new(PermissionId::new(3), "release", "approve"));
        store.insert_role(
            Role::system(RoleId::new(1), "viewer").with_permission(PermissionId::new(1)),
        );
        store.insert_role(
            Role::system(RoleId::new(2), "developer")
                .with_permission(PermissionId::new(1))
                .with_permission(PermissionId::new(2)),
        );
        store.assign_role("alice", RoleId::new(1));

        let checker = BaselineChecker::new(store.clone() as Arc<dyn RoleStore>);
        store.add_listener(checker.cache());
        (store, checker)
    }

    #[test]
    fn test_baseline_grants_and_denies() {
        let (_store, checker) = fixture();
        let cancel = CancelToken::new();
        let alice = SubjectId::from("alice");

        assert!(checker
            .check_baseline(&alice, "env_var", "read", &cancel)
            .unwrap());
        assert!(!checker
            .check_baseline(&alice, "env_var", "write", &cancel)
            .unwrap());
        assert!(!checker
            .check_baseline(&alice, "release", "approve", &cancel)
            .unwrap());
    }

    #[test]
    fn test_unknown_subject_has_no_grants() {
        let (_store, checker) = fixture();
        assert!(!checker
            .check_baseline(
                &SubjectId::from("nobody"),
                "env_var",
                "read",
                &CancelToken::new()
            )
            .unwrap());
    }

    #[test]
    fn test_union_across_roles() {
        let (store, checker) = fixture();
        let cancel = CancelToken::new();
        let alice = SubjectId::from("alice");
        store.assign_role("alice", RoleId::new(2));

        let grants = checker.grants_for(&alice, &cancel).unwrap();
        assert!(grants.allows("env_var", "read"));
        assert!(grants.allows("env_var", "write"));
        assert_eq!(grants.roles().count(), 2);
    }

    #[test]
    fn test_assignment_mutation_invalidates_cache() {
        let (store, checker) = fixture();
        let cancel = CancelToken::new();
        let alice = SubjectId::from("alice");

        assert!(!checker
            .check_baseline(&alice, "env_var", "write", &cancel)
            .unwrap());

        // Granting the developer role must be visible immediately.
        store.assign_role("alice", RoleId::new(2));
        assert!(checker
            .check_baseline(&alice, "env_var", "write", &cancel)
            .unwrap());

        // And revoking it must be visible immediately too.
        store.unassign_role(&alice, RoleId::new(2));
        assert!(!checker
            .check_baseline(&alice, "env_var", "write", &cancel)
            .unwrap());
    }

    #[test]
    fn test_role_permission_mutation_invalidates_holders() {
        let (store, checker) = fixture();
        let cancel = CancelToken::new();
        let alice = SubjectId::from("alice");

        assert!(checker
            .check_baseline(&alice, "env_var", "read", &cancel)
            .unwrap());
        assert_eq!(checker.cache().len(), 1);

        // Stripping the viewer role's permissions drops alice's cache entry.
        store
            .replace_role_permissions(RoleId::new(1), BTreeSet::new())
            .unwrap();
        assert!(checker.cache().is_empty());
        assert!(!checker
            .check_baseline(&alice, "env_var", "read", &cancel)
            .unwrap());
    }

    #[test]
    fn test_invalidate_role_only_touches_holders() {
        let (store, checker) = fixture();
        let cancel = CancelToken::new();
        store.assign_role("bob", RoleId::new(2));

        checker
            .grants_for(&SubjectId::from("alice"), &cancel)
            .unwrap();
        checker
            .grants_for(&SubjectId::from("bob"), &cancel)
            .unwrap();
        assert_eq!(checker.cache().len(), 2);

        // alice holds role 1, bob holds role 2; invalidating role 2 must
        // leave alice's entry alone.
        checker.cache().invalidate_role(RoleId::new(2));
        assert_eq!(checker.cache().len(), 1);
    }
}
