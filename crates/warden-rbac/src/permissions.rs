//! Permission types for the RBAC baseline.
//!
//! A permission pairs a resource type with an action verb. Permissions are
//! administrator-defined data, unique per (resource type, action).

use serde::{Deserialize, Serialize};
use warden_types::PermissionId;

use std::collections::HashSet;
use std::fmt::Display;

/// A grantable permission: one action verb on one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    /// The type of resource this permission governs (e.g. `env_var`, `release`).
    pub resource_type: String,
    /// The action verb (e.g. `read`, `write`, `delete`, `reveal`).
    pub action: String,
}

impl Permission {
    pub fn new(
        id: PermissionId,
        resource_type: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            id,
            resource_type: resource_type.into(),
            action: action.into(),
        }
    }

    /// The lookup key this permission grants.
    pub fn key(&self) -> PermissionKey {
        PermissionKey::new(&self.resource_type, &self.action)
    }
}

/// The (resource type, action) pair a baseline check tests for.
///
/// Uniqueness of permissions is defined over this key, not the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionKey {
    pub resource_type: String,
    pub action: String,
}

impl PermissionKey {
    pub fn new(resource_type: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            action: action.into(),
        }
    }
}

impl Display for PermissionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.action)
    }
}

/// The effective permissions of a subject: the union across its roles.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    keys: HashSet<PermissionKey>,
}

impl PermissionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns whether the set grants the given (resource type, action).
    pub fn contains(&self, key: &PermissionKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns whether the set grants the given resource type and action.
    pub fn allows(&self, resource_type: &str, action: &str) -> bool {
        self.keys.contains(&PermissionKey::new(resource_type, action))
    }

    /// Adds a permission key to the set. Duplicate grants are no-ops.
    pub fn grant(&mut self, key: PermissionKey) {
        self.keys.insert(key);
    }

    /// Removes a permission key from the set.
    pub fn revoke(&mut self, key: &PermissionKey) {
        self.keys.remove(key);
    }

    /// Folds another set into this one (role union semantics).
    pub fn extend(&mut self, other: &PermissionSet) {
        self.keys.extend(other.keys.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PermissionKey> {
        self.keys.iter()
    }
}

impl FromIterator<PermissionKey> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = PermissionKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_key() {
        let perm = Permission::new(PermissionId::new(1), "env_var", "read");
        assert_eq!(perm.key(), PermissionKey::new("env_var", "read"));
        assert_eq!(perm.key().to_string(), "env_var:read");
    }

    #[test]
    fn test_permission_set_operations() {
        let mut set = PermissionSet::empty();
        assert!(!set.allows("env_var", "read"));

        set.grant(PermissionKey::new("env_var", "read"));
        assert!(set.allows("env_var", "read"));

        set.grant(PermissionKey::new("env_var", "read")); // Duplicate grant is no-op
        assert_eq!(set.len(), 1);

        set.grant(PermissionKey::new("env_var", "write"));
        assert!(set.allows("env_var", "write"));

        set.revoke(&PermissionKey::new("env_var", "read"));
        assert!(!set.allows("env_var", "read"));
        assert!(set.allows("env_var", "write"));
    }

    #[test]
    fn test_permission_set_union() {
        let mut a: PermissionSet = [
            PermissionKey::new("env_var", "read"),
            PermissionKey::new("release", "read"),
        ]
        .into_iter()
        .collect();
        let b: PermissionSet = [
            PermissionKey::new("env_var", "read"),
            PermissionKey::new("release", "approve"),
        ]
        .into_iter()
        .collect();

        a.extend(&b);
        assert_eq!(a.len(), 3);
        assert!(a.allows("release", "approve"));
    }

    #[test]
    fn test_same_action_different_resource_types() {
        let set: PermissionSet = [PermissionKey::new("env_var", "read")].into_iter().collect();
        assert!(set.allows("env_var", "read"));
        assert!(!set.allows("release", "read"));
    }
}
