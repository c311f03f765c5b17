//! Role definitions for the RBAC baseline.
//!
//! A role names a set of permissions. Subjects hold any number of roles;
//! their effective permissions are the union across all held roles.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use warden_types::{PermissionId, RoleId, SubjectId};

/// A named bundle of permissions.
///
/// Identity is immutable after creation; the permission set is mutable by
/// full replacement. System roles (`is_system`) ship with the platform and
/// cannot be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub permissions: BTreeSet<PermissionId>,
    pub is_system: bool,
}

impl Role {
    /// Creates an administrator-defined role with no permissions.
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            permissions: BTreeSet::new(),
            is_system: false,
        }
    }

    /// Creates a platform-defined role that cannot be deleted.
    pub fn system(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            permissions: BTreeSet::new(),
            is_system: true,
        }
    }

    /// Adds a permission (builder pattern).
    pub fn with_permission(mut self, permission: PermissionId) -> Self {
        self.permissions.insert(permission);
        self
    }

    /// Replaces the whole permission set.
    ///
    /// Partial patches are not supported: role permissions are versioned by
    /// full replacement only.
    pub fn replace_permissions(&mut self, permissions: BTreeSet<PermissionId>) {
        self.permissions = permissions;
    }

    pub fn has_permission(&self, permission: PermissionId) -> bool {
        self.permissions.contains(&permission)
    }
}

/// A subject-to-role binding.
///
/// Many-to-many: one subject may hold several roles and one role may be
/// held by several subjects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub subject_id: SubjectId,
    pub role_id: RoleId,
}

impl RoleAssignment {
    pub fn new(subject_id: impl Into<SubjectId>, role_id: RoleId) -> Self {
        Self {
            subject_id: subject_id.into(),
            role_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_builder() {
        let role = Role::new(RoleId::new(1), "release-manager")
            .with_permission(PermissionId::new(10))
            .with_permission(PermissionId::new(11));

        assert_eq!(role.name, "release-manager");
        assert!(!role.is_system);
        assert!(role.has_permission(PermissionId::new(10)));
        assert!(!role.has_permission(PermissionId::new(12)));
    }

    #[test]
    fn test_system_role_flag() {
        let role = Role::system(RoleId::new(1), "admin");
        assert!(role.is_system);
    }

    #[test]
    fn test_replace_permissions_is_full_replace() {
        let mut role = Role::new(RoleId::new(1), "viewer").with_permission(PermissionId::new(1));

        role.replace_permissions([PermissionId::new(2), PermissionId::new(3)].into());

        assert!(!role.has_permission(PermissionId::new(1)));
        assert!(role.has_permission(PermissionId::new(2)));
        assert!(role.has_permission(PermissionId::new(3)));
    }
}
