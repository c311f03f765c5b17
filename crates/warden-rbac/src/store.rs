//! Role/permission store collaborator interface.
//!
//! The engine reads roles and permissions through [`RoleStore`]; persistence
//! lives outside the core. [`InMemoryRoleStore`] is the reference
//! implementation, used as the test fixture and for embedded deployments.

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::info;
use warden_types::{CancelToken, PermissionId, RoleId, StoreError, SubjectId};

use crate::permissions::Permission;
use crate::roles::{Role, RoleAssignment};

/// Read interface over roles, permissions, and role assignments.
///
/// Implementations own retries and timeouts; the engine surfaces a
/// [`StoreError`] to the caller instead of retrying. The [`CancelToken`]
/// carries the caller's cancellation into slow lookups.
pub trait RoleStore: Send + Sync {
    /// Returns every role currently held by the subject.
    fn roles_for_subject(
        &self,
        subject: &SubjectId,
        cancel: &CancelToken,
    ) -> Result<Vec<Role>, StoreError>;

    /// Returns the permissions granted by a role.
    ///
    /// Unknown roles resolve to an empty set, not an error: a dangling
    /// assignment must not fail the whole authorization check.
    fn permissions_for_role(
        &self,
        role: RoleId,
        cancel: &CancelToken,
    ) -> Result<Vec<Permission>, StoreError>;
}

/// Notification hook for role/permission mutations.
///
/// The baseline checker's permission cache registers itself here so that
/// invalidation is pushed synchronously with the mutation, never
/// time-based.
pub trait RoleChangeListener: Send + Sync {
    /// A role assignment changed for this subject.
    fn subject_changed(&self, subject: &SubjectId);

    /// A role's permission set changed, or the role was deleted.
    fn role_changed(&self, role: RoleId);
}

/// Administrative mutation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleAdminError {
    /// System roles ship with the platform and cannot be deleted.
    #[error("role `{name}` ({id}) is a system role and cannot be deleted")]
    SystemRoleProtected { id: RoleId, name: String },

    /// The role does not exist.
    #[error("unknown role {0}")]
    UnknownRole(RoleId),
}

#[derive(Default)]
struct RoleStoreInner {
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
    assignments: HashMap<SubjectId, BTreeSet<RoleId>>,
}

/// In-memory [`RoleStore`] with push-based change notification.
#[derive(Default)]
pub struct InMemoryRoleStore {
    inner: RwLock<RoleStoreInner>,
    listeners: RwLock<Vec<std::sync::Arc<dyn RoleChangeListener>>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means a writer panicked mid-mutation; the maps
    // themselves stay structurally valid, so recover the guard.
    fn read_inner(&self) -> RwLockReadGuard<'_, RoleStoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, RoleStoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a listener for role/permission mutations.
    pub fn add_listener(&self, listener: std::sync::Arc<dyn RoleChangeListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn insert_permission(&self, permission: Permission) {
        let mut inner = self.write_inner();
        inner.permissions.insert(permission.id, permission);
    }

    pub fn insert_role(&self, role: Role) {
        let id = role.id;
        {
            let mut inner = self.write_inner();
            inner.roles.insert(id, role);
        }
        self.notify_role_changed(id);
    }

    /// Replaces a role's permission set (full replace, no partial patch).
    pub fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permissions: BTreeSet<PermissionId>,
    ) -> Result<(), RoleAdminError> {
        {
            let mut inner = self.write_inner();
            let role = inner
                .roles
                .get_mut(&role_id)
                .ok_or(RoleAdminError::UnknownRole(role_id))?;
            role.replace_permissions(permissions);
        }
        self.notify_role_changed(role_id);
        Ok(())
    }

    /// Deletes a role and every assignment pointing at it.
    ///
    /// Refuses system roles.
    pub fn delete_role(&self, role_id: RoleId) -> Result<(), RoleAdminError> {
        {
            let mut inner = self.write_inner();
            let role = inner
                .roles
                .get(&role_id)
                .ok_or(RoleAdminError::UnknownRole(role_id))?;
            if role.is_system {
                return Err(RoleAdminError::SystemRoleProtected {
                    id: role_id,
                    name: role.name.clone(),
                });
            }
            inner.roles.remove(&role_id);
            for held in inner.assignments.values_mut() {
                held.remove(&role_id);
            }
        }
        info!(role = %role_id, "role deleted");
        self.notify_role_changed(role_id);
        Ok(())
    }

    pub fn assign_role(&self, subject: impl Into<SubjectId>, role_id: RoleId) {
        let subject = subject.into();
        {
            let mut inner = self.write_inner();
            inner
                .assignments
                .entry(subject.clone())
                .or_default()
                .insert(role_id);
        }
        self.notify_subject_changed(&subject);
    }

    pub fn unassign_role(&self, subject: &SubjectId, role_id: RoleId) {
        {
            let mut inner = self.write_inner();
            if let Some(held) = inner.assignments.get_mut(subject) {
                held.remove(&role_id);
            }
        }
        self.notify_subject_changed(subject);
    }

    /// Every current subject-to-role binding, for administrative listing.
    pub fn assignments(&self) -> Vec<RoleAssignment> {
        let inner = self.read_inner();
        inner
            .assignments
            .iter()
            .flat_map(|(subject, held)| {
                held.iter()
                    .map(|role_id| RoleAssignment::new(subject.clone(), *role_id))
            })
            .collect()
    }

    fn notify_subject_changed(&self, subject: &SubjectId) {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener.subject_changed(subject);
        }
    }

    fn notify_role_changed(&self, role: RoleId) {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener.role_changed(role);
        }
    }
}

impl RoleStore for InMemoryRoleStore {
    fn roles_for_subject(
        &self,
        subject: &SubjectId,
        _cancel: &CancelToken,
    ) -> Result<Vec<Role>, StoreError> {
        let inner = self.read_inner();
        let Some(held) = inner.assignments.get(subject) else {
            return Ok(Vec::new());
        };
        Ok(held
            .iter()
            .filter_map(|id| inner.roles.get(id).cloned())
            .collect())
    }

    fn permissions_for_role(
        &self,
        role: RoleId,
        _cancel: &CancelToken,
    ) -> Result<Vec<Permission>, StoreError> {
        let inner = self.read_inner();
        let Some(role) = inner.roles.get(&role) else {
            return Ok(Vec::new());
        };
        Ok(role
            .permissions
            .iter()
            .filter_map(|id| inner.permissions.get(id).cloned())
            .collect())
    }
}
