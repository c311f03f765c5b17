//! # warden-abac: Attribute-Based Access Control
//!
//! The conditional layer of Warden's authorization engine: prioritized
//! policies whose condition groups are evaluated against live subject,
//! resource, action, and environment attributes. Extends the RBAC baseline
//! with fine-grained, data-driven overrides.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Request Context                             │
//! │  (subject, resource, action, environment)    │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  PolicySelector                              │
//! │  ├─ Union global/subject/role/resource       │
//! │  ├─ De-duplicate by id                       │
//! │  └─ Order by (priority, id) ascending        │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  PolicyMatcher                               │
//! │  ├─ Resolve attribute paths                  │
//! │  ├─ Dereference {{template}} operands        │
//! │  ├─ Evaluate conditions (AND groups)         │
//! │  └─ Append per-condition trace entries       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use warden_abac::condition::{Condition, ConditionOperator};
//! use warden_abac::matcher::PolicyMatcher;
//! use warden_abac::policy::{Effect, Policy};
//! use warden_abac::resolver::RequestContext;
//! use warden_abac::store::InMemoryAttributeStore;
//! use warden_abac::trace::EvaluationTrace;
//! use warden_types::{CancelToken, EntityType, PolicyId, ResourceId, SubjectId};
//!
//! // Allow writes when the subject's department owns the resource.
//! let policy = Policy::conditional(PolicyId::new(1), "owner-writes", 10, Effect::Allow)
//!     .with_subject_condition(
//!         "user.department",
//!         Condition::template(ConditionOperator::Eq, "resource.owner"),
//!     );
//!
//! let attributes = InMemoryAttributeStore::new();
//! attributes.set_attribute(EntityType::Subject, "alice", "department", "eng");
//! attributes.set_attribute(EntityType::Resource, "db-url", "owner", "eng");
//!
//! let subject = SubjectId::from("alice");
//! let resource = ResourceId::from("db-url");
//! let environment = BTreeMap::new();
//! let ctx = RequestContext {
//!     subject: &subject,
//!     resource: Some(&resource),
//!     action: "write",
//!     resource_type: "env_var",
//!     environment: &environment,
//! };
//!
//! let matcher = PolicyMatcher::new(&attributes);
//! let mut trace = EvaluationTrace::new();
//! let matched = matcher.matches(&policy, &ctx, &mut trace, &CancelToken::new())?;
//! assert!(matched);
//! assert_eq!(trace.len(), 1);
//! # Ok::<(), warden_types::StoreError>(())
//! ```

pub mod condition;
pub mod evaluator;
pub mod matcher;
pub mod path;
pub mod policy;
pub mod resolver;
pub mod selector;
pub mod store;
pub mod trace;

// Re-export commonly used types
pub use condition::{Condition, ConditionOperator, Operand};
pub use evaluator::{Outcome, ResolvedOperand};
pub use matcher::PolicyMatcher;
pub use path::{AttributePath, PathError, PathRoot};
pub use policy::{
    ConditionGroup, ConditionMap, Effect, Policy, PolicyAssignment, PolicyError, PolicyKind,
    PolicyScope,
};
pub use resolver::{AttributeResolver, RequestContext, Resolved};
pub use selector::PolicySelector;
pub use store::{
    Attribute, AttributeStore, InMemoryAttributeStore, InMemoryPolicyStore, PolicyStore,
};
pub use trace::{ConditionTrace, EvaluationTrace, PolicyErrorTrace, TraceEntry};
