//! Policy and attribute store collaborator interfaces.
//!
//! Persistence lives outside the core; the engine reads policies and
//! attributes through these traits. The in-memory implementations are the
//! reference fixtures, also usable for embedded deployments.

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use warden_types::{
    AttributeValue, CancelToken, EntityType, PolicyId, ResourceId, RoleId, StoreError, SubjectId,
};

use crate::policy::{Policy, PolicyAssignment, PolicyScope};

// ============================================================================
// Traits
// ============================================================================

/// Read interface over policies and their assignments.
///
/// Each accessor returns an unordered set; ordering is the selector's job.
/// Implementations own retries and timeouts: the engine never retries, it
/// surfaces [`StoreError`] to the caller.
pub trait PolicyStore: Send + Sync {
    /// Policies assigned globally (they participate in every request).
    fn global_policies(&self, cancel: &CancelToken) -> Result<Vec<Policy>, StoreError>;

    /// Policies assigned directly to the subject.
    fn policies_for_subject(
        &self,
        subject: &SubjectId,
        cancel: &CancelToken,
    ) -> Result<Vec<Policy>, StoreError>;

    /// Policies assigned to a role.
    fn policies_for_role(
        &self,
        role: RoleId,
        cancel: &CancelToken,
    ) -> Result<Vec<Policy>, StoreError>;

    /// Policies assigned to a resource.
    fn policies_for_resource(
        &self,
        resource: &ResourceId,
        cancel: &CancelToken,
    ) -> Result<Vec<Policy>, StoreError>;
}

/// Read interface over stored subject/resource attributes.
///
/// A missing entity or key is `Ok(None)`, not an error: absent data is a
/// normal evaluation outcome, store failure is not.
pub trait AttributeStore: Send + Sync {
    fn get_attribute(
        &self,
        entity: EntityType,
        entity_id: &str,
        key: &str,
        cancel: &CancelToken,
    ) -> Result<Option<AttributeValue>, StoreError>;
}

// ============================================================================
// In-memory policy store
// ============================================================================

#[derive(Default)]
struct PolicyStoreInner {
    policies: HashMap<PolicyId, Policy>,
    global: BTreeSet<PolicyId>,
    by_subject: HashMap<SubjectId, BTreeSet<PolicyId>>,
    by_role: HashMap<RoleId, BTreeSet<PolicyId>>,
    by_resource: HashMap<ResourceId, BTreeSet<PolicyId>>,
}

impl PolicyStoreInner {
    fn collect(&self, ids: Option<&BTreeSet<PolicyId>>) -> Vec<Policy> {
        let Some(ids) = ids else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| self.policies.get(id).cloned())
            .collect()
    }
}

/// In-memory [`PolicyStore`].
#[derive(Default)]
pub struct InMemoryPolicyStore {
    inner: RwLock<PolicyStoreInner>,
}

impl InMemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_inner(&self) -> RwLockReadGuard<'_, PolicyStoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, PolicyStoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or fully replaces a policy definition.
    ///
    /// Without an assignment the policy stays inert.
    pub fn insert_policy(&self, policy: Policy) {
        let mut inner = self.write_inner();
        inner.policies.insert(policy.id, policy);
    }

    /// Binds a policy to a scope.
    pub fn assign(&self, assignment: PolicyAssignment) {
        let mut inner = self.write_inner();
        let id = assignment.policy_id;
        match assignment.scope {
            PolicyScope::Global => {
                inner.global.insert(id);
            }
            PolicyScope::Subject(subject) => {
                inner.by_subject.entry(subject).or_default().insert(id);
            }
            PolicyScope::Role(role) => {
                inner.by_role.entry(role).or_default().insert(id);
            }
            PolicyScope::Resource(resource) => {
                inner.by_resource.entry(resource).or_default().insert(id);
            }
        }
    }

    /// Removes a policy and all of its assignments.
    pub fn remove_policy(&self, id: PolicyId) {
        let mut inner = self.write_inner();
        inner.policies.remove(&id);
        inner.global.remove(&id);
        for ids in inner.by_subject.values_mut() {
            ids.remove(&id);
        }
        for ids in inner.by_role.values_mut() {
            ids.remove(&id);
        }
        for ids in inner.by_resource.values_mut() {
            ids.remove(&id);
        }
    }
}

impl PolicyStore for InMemoryPolicyStore {
    fn global_policies(&self, _cancel: &CancelToken) -> Result<Vec<Policy>, StoreError> {
        let inner = self.read_inner();
        Ok(inner.collect(Some(&inner.global)))
    }

    fn policies_for_subject(
        &self,
        subject: &SubjectId,
        _cancel: &CancelToken,
    ) -> Result<Vec<Policy>, StoreError> {
        let inner = self.read_inner();
        Ok(inner.collect(inner.by_subject.get(subject)))
    }

    fn policies_for_role(
        &self,
        role: RoleId,
        _cancel: &CancelToken,
    ) -> Result<Vec<Policy>, StoreError> {
        let inner = self.read_inner();
        Ok(inner.collect(inner.by_role.get(&role)))
    }

    fn policies_for_resource(
        &self,
        resource: &ResourceId,
        _cancel: &CancelToken,
    ) -> Result<Vec<Policy>, StoreError> {
        let inner = self.read_inner();
        Ok(inner.collect(inner.by_resource.get(resource)))
    }
}

// ============================================================================
// In-memory attribute store
// ============================================================================

/// One stored attribute: a typed value attached to a subject or resource
/// under a dotted name.
///
/// Environment attributes are never stored; they arrive inline with each
/// request.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Attribute {
    pub entity_type: EntityType,
    pub entity_id: String,
    /// Dotted attribute name, e.g. `department` or `labels.region`.
    pub name: String,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn new(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

/// In-memory [`AttributeStore`].
///
/// Attributes are keyed by (entity type, entity id, dotted key).
#[derive(Default)]
pub struct InMemoryAttributeStore {
    attributes: RwLock<HashMap<(EntityType, String, String), AttributeValue>>,
}

impl InMemoryAttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a batch of attribute records.
    pub fn load(&self, attributes: impl IntoIterator<Item = Attribute>) {
        let mut map = self
            .attributes
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for attr in attributes {
            map.insert((attr.entity_type, attr.entity_id, attr.name), attr.value);
        }
    }

    pub fn set_attribute(
        &self,
        entity: EntityType,
        entity_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) {
        self.attributes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((entity, entity_id.into(), key.into()), value.into());
    }

    pub fn remove_attribute(&self, entity: EntityType, entity_id: &str, key: &str) {
        self.attributes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(entity, entity_id.to_string(), key.to_string()));
    }
}

impl AttributeStore for InMemoryAttributeStore {
    fn get_attribute(
        &self,
        entity: EntityType,
        entity_id: &str,
        key: &str,
        _cancel: &CancelToken,
    ) -> Result<Option<AttributeValue>, StoreError> {
        Ok(self
            .attributes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(entity, entity_id.to_string(), key.to_string()))
            .cloned())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Effect;

    fn policy(id: u64) -> Policy {
        Policy::unconditional(PolicyId::new(id), format!("p{id}"), 10, Effect::Allow)
    }

    #[test]
    fn test_unassigned_policy_is_inert() {
        let store = InMemoryPolicyStore::new();
        store.insert_policy(policy(1));

        let cancel = CancelToken::new();
        assert!(store.global_policies(&cancel).unwrap().is_empty());
        assert!(store
            .policies_for_subject(&SubjectId::from("alice"), &cancel)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_assignment_scopes() {
        let store = InMemoryPolicyStore::new();
        store.insert_policy(policy(1));
        store.insert_policy(policy(2));
        store.insert_policy(policy(3));
        store.insert_policy(policy(4));
        store.assign(PolicyAssignment::global(PolicyId::new(1)));
        store.assign(PolicyAssignment::new(
            PolicyId::new(2),
            PolicyScope::Subject(SubjectId::from("alice")),
        ));
        store.assign(PolicyAssignment::new(
            PolicyId::new(3),
            PolicyScope::Role(RoleId::new(7)),
        ));
        store.assign(PolicyAssignment::new(
            PolicyId::new(4),
            PolicyScope::Resource(ResourceId::from("db-url")),
        ));

        let cancel = CancelToken::new();
        assert_eq!(store.global_policies(&cancel).unwrap().len(), 1);
        assert_eq!(
            store
                .policies_for_subject(&SubjectId::from("alice"), &cancel)
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            store
                .policies_for_role(RoleId::new(7), &cancel)
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            store
                .policies_for_resource(&ResourceId::from("db-url"), &cancel)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_remove_policy_clears_assignments() {
        let store = InMemoryPolicyStore::new();
        store.insert_policy(policy(1));
        store.assign(PolicyAssignment::global(PolicyId::new(1)));
        store.assign(PolicyAssignment::new(
            PolicyId::new(1),
            PolicyScope::Subject(SubjectId::from("alice")),
        ));

        store.remove_policy(PolicyId::new(1));
        let cancel = CancelToken::new();
        assert!(store.global_policies(&cancel).unwrap().is_empty());
        assert!(store
            .policies_for_subject(&SubjectId::from("alice"), &cancel)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_attribute_batch_load() {
        let store = InMemoryAttributeStore::new();
        store.load([
            Attribute::new(EntityType::Subject, "alice", "department", "eng"),
            Attribute::new(EntityType::Resource, "db-url", "owner", "eng"),
        ]);

        let cancel = CancelToken::new();
        assert_eq!(
            store
                .get_attribute(EntityType::Subject, "alice", "department", &cancel)
                .unwrap(),
            Some(AttributeValue::from("eng"))
        );
        assert_eq!(
            store
                .get_attribute(EntityType::Resource, "db-url", "owner", &cancel)
                .unwrap(),
            Some(AttributeValue::from("eng"))
        );
    }

    #[test]
    fn test_attribute_store_lookup() {
        let store = InMemoryAttributeStore::new();
        store.set_attribute(EntityType::Subject, "alice", "department", "eng");

        let cancel = CancelToken::new();
        assert_eq!(
            store
                .get_attribute(EntityType::Subject, "alice", "department", &cancel)
                .unwrap(),
            Some(AttributeValue::from("eng"))
        );
        // Missing key and missing entity are both plain None.
        assert_eq!(
            store
                .get_attribute(EntityType::Subject, "alice", "clearance", &cancel)
                .unwrap(),
            None
        );
        assert_eq!(
            store
                .get_attribute(EntityType::Resource, "alice", "department", &cancel)
                .unwrap(),
            None
        );

        store.remove_attribute(EntityType::Subject, "alice", "department");
        assert_eq!(
            store
                .get_attribute(EntityType::Subject, "alice", "department", &cancel)
                .unwrap(),
            None
        );
    }
}
