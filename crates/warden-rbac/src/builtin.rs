//! Built-in roles and permissions.
//!
//! The platform ships four standing roles over its resource types. They are
//! system roles (cannot be deleted); administrators may define further roles
//! alongside them.
//!
//! | Role      | env_var              | release          | audit_log    | policy            |
//! |-----------|----------------------|------------------|--------------|-------------------|
//! | viewer    | read                 | read             | —            | read              |
//! | developer | read, write, reveal  | read, write      | —            | read              |
//! | auditor   | read                 | read             | read, export | read              |
//! | admin     | all                  | all              | all          | all               |

use crate::permissions::Permission;
use crate::roles::Role;
use crate::store::InMemoryRoleStore;

/// Resource types the platform protects.
pub mod resource_type {
    pub const ENV_VAR: &str = "env_var";
    pub const RELEASE: &str = "release";
    pub const AUDIT_LOG: &str = "audit_log";
    pub const POLICY: &str = "policy";
}

/// Action verbs.
pub mod action {
    pub const READ: &str = "read";
    pub const WRITE: &str = "write";
    pub const DELETE: &str = "delete";
    /// Decrypt and display a secret value.
    pub const REVEAL: &str = "reveal";
    pub const EXPORT: &str = "export";
    pub const APPROVE: &str = "approve";
}

/// Permission ids, stable across installs.
pub mod permission_id {
    use warden_types::PermissionId;

    pub const ENV_VAR_READ: PermissionId = PermissionId::new(1);
    pub const ENV_VAR_WRITE: PermissionId = PermissionId::new(2);
    pub const ENV_VAR_DELETE: PermissionId = PermissionId::new(3);
    pub const ENV_VAR_REVEAL: PermissionId = PermissionId::new(4);
    pub const ENV_VAR_EXPORT: PermissionId = PermissionId::new(5);
    pub const RELEASE_READ: PermissionId = PermissionId::new(6);
    pub const RELEASE_WRITE: PermissionId = PermissionId::new(7);
    pub const RELEASE_APPROVE: PermissionId = PermissionId::new(8);
    pub const AUDIT_LOG_READ: PermissionId = PermissionId::new(9);
    pub const AUDIT_LOG_EXPORT: PermissionId = PermissionId::new(10);
    pub const POLICY_READ: PermissionId = PermissionId::new(11);
    pub const POLICY_WRITE: PermissionId = PermissionId::new(12);
    pub const POLICY_DELETE: PermissionId = PermissionId::new(13);
}

/// Role ids, stable across installs.
pub mod role_id {
    use warden_types::RoleId;

    pub const ADMIN: RoleId = RoleId::new(1);
    pub const DEVELOPER: RoleId = RoleId::new(2);
    pub const VIEWER: RoleId = RoleId::new(3);
    pub const AUDITOR: RoleId = RoleId::new(4);
}

/// The full built-in permission catalogue.
pub fn permissions() -> Vec<Permission> {
    use permission_id as pid;
    use resource_type as rt;

    vec![
        Permission::new(pid::ENV_VAR_READ, rt::ENV_VAR, action::READ),
        Permission::new(pid::ENV_VAR_WRITE, rt::ENV_VAR, action::WRITE),
        Permission::new(pid::ENV_VAR_DELETE, rt::ENV_VAR, action::DELETE),
        Permission::new(pid::ENV_VAR_REVEAL, rt::ENV_VAR, action::REVEAL),
        Permission::new(pid::ENV_VAR_EXPORT, rt::ENV_VAR, action::EXPORT),
        Permission::new(pid::RELEASE_READ, rt::RELEASE, action::READ),
        Permission::new(pid::RELEASE_WRITE, rt::RELEASE, action::WRITE),
        Permission::new(pid::RELEASE_APPROVE, rt::RELEASE, action::APPROVE),
        Permission::new(pid::AUDIT_LOG_READ, rt::AUDIT_LOG, action::READ),
        Permission::new(pid::AUDIT_LOG_EXPORT, rt::AUDIT_LOG, action::EXPORT),
        Permission::new(pid::POLICY_READ, rt::POLICY, action::READ),
        Permission::new(pid::POLICY_WRITE, rt::POLICY, action::WRITE),
        Permission::new(pid::POLICY_DELETE, rt::POLICY, action::DELETE),
    ]
}

/// Administrator: every built-in permission.
pub fn admin() -> Role {
    let mut role = Role::system(role_id::ADMIN, "admin");
    for permission in permissions() {
        role = role.with_permission(permission.id);
    }
    role
}

/// Developer: manage and reveal environment variables, prepare releases.
pub fn developer() -> Role {
    use permission_id as pid;

    Role::system(role_id::DEVELOPER, "developer")
        .with_permission(pid::ENV_VAR_READ)
        .with_permission(pid::ENV_VAR_WRITE)
        .with_permission(pid::ENV_VAR_REVEAL)
        .with_permission(pid::RELEASE_READ)
        .with_permission(pid::RELEASE_WRITE)
        .with_permission(pid::POLICY_READ)
}

/// Viewer: read-only, no secret reveal.
pub fn viewer() -> Role {
    use permission_id as pid;

    Role::system(role_id::VIEWER, "viewer")
        .with_permission(pid::ENV_VAR_READ)
        .with_permission(pid::RELEASE_READ)
        .with_permission(pid::POLICY_READ)
}

/// Auditor: read-only plus the audit log.
pub fn auditor() -> Role {
    use permission_id as pid;

    Role::system(role_id::AUDITOR, "auditor")
        .with_permission(pid::AUDIT_LOG_READ)
        .with_permission(pid::AUDIT_LOG_EXPORT)
        .with_permission(pid::ENV_VAR_READ)
        .with_permission(pid::RELEASE_READ)
        .with_permission(pid::POLICY_READ)
}

/// All built-in roles.
pub fn roles() -> Vec<Role> {
    vec![admin(), developer(), viewer(), auditor()]
}

/// Seeds a store with the built-in catalogue.
pub fn install(store: &InMemoryRoleStore) {
    for permission in permissions() {
        store.insert_permission(permission);
    }
    for role in roles() {
        store.insert_role(role);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{RoleAdminError, RoleStore};
    use std::collections::HashSet;
    use warden_types::{CancelToken, SubjectId};

    #[test]
    fn test_permission_keys_are_unique() {
        let perms = permissions();
        let keys: HashSet<_> = perms.iter().map(Permission::key).collect();
        assert_eq!(keys.len(), perms.len());

        let ids: HashSet<_> = perms.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), perms.len());
    }

    #[test]
    fn test_admin_holds_everything() {
        let admin = admin();
        for permission in permissions() {
            assert!(
                admin.has_permission(permission.id),
                "admin missing {}:{}",
                permission.resource_type,
                permission.action
            );
        }
    }

    #[test]
    fn test_viewer_cannot_reveal() {
        let viewer = viewer();
        assert!(viewer.has_permission(permission_id::ENV_VAR_READ));
        assert!(!viewer.has_permission(permission_id::ENV_VAR_REVEAL));
        assert!(!viewer.has_permission(permission_id::ENV_VAR_WRITE));
    }

    #[test]
    fn test_auditor_owns_audit_log() {
        let auditor = auditor();
        assert!(auditor.has_permission(permission_id::AUDIT_LOG_READ));
        assert!(auditor.has_permission(permission_id::AUDIT_LOG_EXPORT));
        assert!(!auditor.has_permission(permission_id::ENV_VAR_WRITE));
    }

    #[test]
    fn test_builtin_roles_are_protected() {
        let store = InMemoryRoleStore::new();
        install(&store);

        for role in roles() {
            let err = store.delete_role(role.id).unwrap_err();
            assert!(matches!(err, RoleAdminError::SystemRoleProtected { .. }));
        }
    }

    #[test]
    fn test_install_wires_permission_lookup() {
        let store = InMemoryRoleStore::new();
        install(&store);
        store.assign_role("alice", role_id::DEVELOPER);

        let roles = store
            .roles_for_subject(&SubjectId::from("alice"), &CancelToken::new())
            .unwrap();
        assert_eq!(roles.len(), 1);

        let perms = store
            .permissions_for_role(role_id::DEVELOPER, &CancelToken::new())
            .unwrap();
        assert_eq!(perms.len(), 6);
    }
}
