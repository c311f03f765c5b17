//! # warden-engine: the authorization decision engine
//!
//! Answers one question (may this subject perform this action on this
//! resource, right now?) by combining two layers:
//!
//! - **RBAC baseline** (`warden-rbac`): do the subject's roles grant the
//!   (resource type, action) permission? Attribute-blind, cached per
//!   subject.
//! - **ABAC overrides** (`warden-abac`): prioritized conditional policies
//!   evaluated against live subject/resource/action/environment attributes,
//!   first-applicable.
//!
//! ## Data flow
//!
//! ```text
//! AuthorizationRequest
//!         │
//!         ▼
//! ┌───────────────────┐   fallback verdict
//! │ BaselineChecker    │──────────────────────────┐
//! └───────┬───────────┘                           │
//!         ▼                                       │
//! ┌───────────────────┐                           │
//! │ PolicySelector     │  candidates in            │
//! └───────┬───────────┘  (priority, id) order     │
//!         ▼                                       │
//! ┌───────────────────┐  first match wins         ▼
//! │ PolicyMatcher      │───────────────▶  Decision
//! └───────────────────┘   no match ⇒ baseline
//! ```
//!
//! The decision carries an ordered trace of every condition evaluated, for
//! explainability and audit. The engine records nothing itself; audit
//! logging is the caller's concern.
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//! use warden_abac::condition::{Condition, ConditionOperator};
//! use warden_abac::policy::{Effect, Policy, PolicyAssignment};
//! use warden_abac::store::{InMemoryAttributeStore, InMemoryPolicyStore};
//! use warden_engine::{AuthorizationRequest, DecisionSource, Engine};
//! use warden_rbac::builtin;
//! use warden_rbac::store::InMemoryRoleStore;
//! use warden_types::{EntityType, PolicyId};
//!
//! // Stores (persistence itself lives outside the core).
//! let roles = Arc::new(InMemoryRoleStore::new());
//! builtin::install(&roles);
//! roles.assign_role("alice", builtin::role_id::VIEWER);
//!
//! let policies = Arc::new(InMemoryPolicyStore::new());
//! policies.insert_policy(
//!     Policy::conditional(PolicyId::new(1), "owner-writes", 10, Effect::Allow)
//!         .with_subject_condition(
//!             "user.department",
//!             Condition::template(ConditionOperator::Eq, "resource.owner"),
//!         ),
//! );
//! policies.assign(PolicyAssignment::global(PolicyId::new(1)));
//!
//! let attributes = Arc::new(InMemoryAttributeStore::new());
//! attributes.set_attribute(EntityType::Subject, "alice", "department", "eng");
//! attributes.set_attribute(EntityType::Resource, "db-url", "owner", "eng");
//!
//! let engine = Engine::new(roles.clone(), policies, attributes);
//! roles.add_listener(engine.permission_cache());
//!
//! // Viewers hold no write permission, but the ownership policy matches.
//! let request = AuthorizationRequest::new("alice", "write", "env_var").with_resource("db-url");
//! let decision = engine.authorize(&request)?;
//! assert!(decision.is_allowed());
//! assert_eq!(decision.source, DecisionSource::Abac);
//! assert_eq!(decision.matched_policy_id, Some(PolicyId::new(1)));
//! # Ok::<(), warden_engine::EngineError>(())
//! ```

pub mod decision;
pub mod engine;
pub mod error;
pub mod request;

// Re-export commonly used types
pub use decision::{Decision, DecisionSource};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use request::AuthorizationRequest;
