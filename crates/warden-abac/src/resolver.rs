//! Attribute resolution.
//!
//! Resolves an [`AttributePath`] against one authorization request: subject
//! and resource attributes come from the attribute store, the action verb
//! and environment attributes come from the request itself. Missing data is
//! [`Resolved::NotFound`], never an error; only store failure is an error.

use std::collections::BTreeMap;

use warden_types::{AttributeValue, CancelToken, EntityType, ResourceId, StoreError, SubjectId};

use crate::path::{AttributePath, PathRoot};
use crate::store::AttributeStore;

/// The read-only view of one authorization request that attribute
/// resolution works against.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub subject: &'a SubjectId,
    /// `None` for resource-less actions; every `resource.*` lookup then
    /// resolves to not-found.
    pub resource: Option<&'a ResourceId>,
    pub action: &'a str,
    pub resource_type: &'a str,
    /// Environment attributes supplied inline by the caller (request time,
    /// source IP, …). Never read from the attribute store.
    pub environment: &'a BTreeMap<String, AttributeValue>,
}

/// The outcome of resolving an attribute path.
///
/// `NotFound` is a distinct sentinel rather than an error: conditions
/// observe it (`exists`/`not_exists`) and every other operator treats it as
/// non-matching.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Value(AttributeValue),
    NotFound,
}

impl Resolved {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolved::Value(_))
    }

    pub fn value(&self) -> Option<&AttributeValue> {
        match self {
            Resolved::Value(v) => Some(v),
            Resolved::NotFound => None,
        }
    }

    pub fn into_value(self) -> Option<AttributeValue> {
        match self {
            Resolved::Value(v) => Some(v),
            Resolved::NotFound => None,
        }
    }
}

impl From<Option<AttributeValue>> for Resolved {
    fn from(value: Option<AttributeValue>) -> Self {
        match value {
            Some(v) => Resolved::Value(v),
            None => Resolved::NotFound,
        }
    }
}

/// Resolves attribute paths for one request.
pub struct AttributeResolver<'a> {
    store: &'a dyn AttributeStore,
}

impl<'a> AttributeResolver<'a> {
    pub fn new(store: &'a dyn AttributeStore) -> Self {
        Self { store }
    }

    /// Resolves a parsed path against the request context.
    pub fn resolve(
        &self,
        ctx: &RequestContext<'_>,
        path: &AttributePath,
        cancel: &CancelToken,
    ) -> Result<Resolved, StoreError> {
        match path.root() {
            PathRoot::Action => Ok(Resolved::Value(AttributeValue::from(ctx.action))),
            PathRoot::Environment => Ok(ctx.environment.get(path.key()).cloned().into()),
            PathRoot::Subject => {
                let value = self.store.get_attribute(
                    EntityType::Subject,
                    ctx.subject.as_str(),
                    path.key(),
                    cancel,
                )?;
                Ok(value.into())
            }
            PathRoot::Resource => {
                let Some(resource) = ctx.resource else {
                    return Ok(Resolved::NotFound);
                };
                let value = self.store.get_attribute(
                    EntityType::Resource,
                    resource.as_str(),
                    path.key(),
                    cancel,
                )?;
                Ok(value.into())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryAttributeStore;

    fn env_with_ip() -> BTreeMap<String, AttributeValue> {
        let mut env = BTreeMap::new();
        env.insert("source_ip".to_string(), AttributeValue::from("10.0.0.1"));
        env
    }

    #[test]
    fn test_resolve_each_root() {
        let store = InMemoryAttributeStore::new();
        store.set_attribute(EntityType::Subject, "alice", "department", "eng");
        store.set_attribute(EntityType::Resource, "db-url", "owner", "eng");

        let subject = SubjectId::from("alice");
        let resource = ResourceId::from("db-url");
        let environment = env_with_ip();
        let ctx = RequestContext {
            subject: &subject,
            resource: Some(&resource),
            action: "write",
            resource_type: "env_var",
            environment: &environment,
        };
        let resolver = AttributeResolver::new(&store);
        let cancel = CancelToken::new();

        let cases = [
            ("subject.department", Resolved::Value("eng".into())),
            ("user.department", Resolved::Value("eng".into())),
            ("resource.owner", Resolved::Value("eng".into())),
            ("action", Resolved::Value("write".into())),
            ("environment.source_ip", Resolved::Value("10.0.0.1".into())),
            ("subject.clearance", Resolved::NotFound),
            ("resource.sensitivity", Resolved::NotFound),
            ("environment.request_id", Resolved::NotFound),
        ];
        for (raw, expected) in cases {
            let path = AttributePath::parse(raw).unwrap();
            assert_eq!(
                resolver.resolve(&ctx, &path, &cancel).unwrap(),
                expected,
                "path {raw}"
            );
        }
    }

    #[test]
    fn test_resourceless_request_resolves_not_found() {
        let store = InMemoryAttributeStore::new();
        store.set_attribute(EntityType::Resource, "db-url", "owner", "eng");

        let subject = SubjectId::from("alice");
        let environment = BTreeMap::new();
        let ctx = RequestContext {
            subject: &subject,
            resource: None,
            action: "export",
            resource_type: "audit_log",
            environment: &environment,
        };
        let resolver = AttributeResolver::new(&store);

        let path = AttributePath::parse("resource.owner").unwrap();
        assert_eq!(
            resolver.resolve(&ctx, &path, &CancelToken::new()).unwrap(),
            Resolved::NotFound
        );
    }

    #[test]
    fn test_null_attribute_is_found() {
        let store = InMemoryAttributeStore::new();
        store.set_attribute(EntityType::Subject, "alice", "manager", AttributeValue::Null);

        let subject = SubjectId::from("alice");
        let environment = BTreeMap::new();
        let ctx = RequestContext {
            subject: &subject,
            resource: None,
            action: "read",
            resource_type: "env_var",
            environment: &environment,
        };
        let resolver = AttributeResolver::new(&store);

        let path = AttributePath::parse("subject.manager").unwrap();
        let resolved = resolver.resolve(&ctx, &path, &CancelToken::new()).unwrap();
        assert!(resolved.is_found());
        assert_eq!(resolved, Resolved::Value(AttributeValue::Null));
    }
}
